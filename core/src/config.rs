use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::location::LocationAccuracy;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub store_path: PathBuf,
    pub desired_accuracy: LocationAccuracy,
    /// Side length in metres of the region shown after the first location fix.
    pub initial_span_meters: f64,
    pub user_location_title: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("pins.sqlite"),
            desired_accuracy: LocationAccuracy::NearestTenMeters,
            initial_span_meters: 1000.0,
            user_location_title: "My Location".to_string(),
        }
    }
}

impl CoreConfig {
    pub fn with_store_path(path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: path.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
