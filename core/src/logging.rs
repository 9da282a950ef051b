use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber. Falls back to `info` when `filter`
/// does not parse. Later calls leave the first subscriber in place.
pub fn init_logging(filter: String) {
    let env_filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("logging already initialised");
    }
}
