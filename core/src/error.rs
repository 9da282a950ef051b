use thiserror::Error;

/// Error type for the pin store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    #[error("schema migration {version} failed: {source}")]
    Migration {
        version: i64,
        source: rusqlite::Error,
    },

    #[error("store query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Error type for pin creation.
#[derive(Error, Debug)]
pub enum PinError {
    #[error("pin name must not be empty")]
    EmptyName,

    #[error("invalid coordinate: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("location services are not available")]
    CoordinatorUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error type for building the host-facing coordinator.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
