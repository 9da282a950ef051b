pub mod config;
pub mod coordinator;
pub mod error;
pub mod ffi;
pub mod location;
pub mod location_mock;
pub mod logging;
pub mod memory_store;
pub mod migrations;
pub mod models;
pub mod presentation;
pub mod sqlite_store;
pub mod storage;

uniffi::include_scaffolding!("pinmap");

pub use config::CoreConfig;
pub use coordinator::{Coordinator, MapDelegate};
pub use error::{ConfigError, PinError, SetupError, StoreError};
pub use ffi::PinCoordinator;
pub use location::{AuthorizationStatus, LocationAccuracy, LocationService};
pub use logging::init_logging;
pub use models::{Annotation, Coordinate, CoordinateSpan, LocationFix, Pin, PinId, Region};
pub use presentation::{pin_details, DetailDialog, DialogAction, MapScreen, MapView};
pub use storage::{PinListing, PinStore};
