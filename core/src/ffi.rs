use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{error, info};

use crate::config::CoreConfig;
use crate::coordinator::{latest_coordinate, Coordinator, MapDelegate};
use crate::error::{PinError, SetupError, StoreError};
use crate::location::{AuthorizationStatus, LocationService};
use crate::models::{Annotation, Coordinate, LocationFix, Pin, PinId};
use crate::sqlite_store::SqlitePinStore;

type HostCoordinator = Coordinator<SqlitePinStore, Box<dyn LocationService>>;

/// Coordinator handed to the host app. Store and location calls are
/// serialized by a lock; delegate callbacks run after it is released.
///
/// When location services are off at construction no store is opened and
/// every later call is a no-op or fails with an unavailable error.
pub struct PinCoordinator {
    inner: Mutex<Option<HostCoordinator>>,
    delegate: Box<dyn MapDelegate>,
}

impl PinCoordinator {
    pub fn new(
        store_path: String,
        config_json: Option<String>,
        location: Box<dyn LocationService>,
        delegate: Box<dyn MapDelegate>,
    ) -> Result<Self, SetupError> {
        let mut config = match config_json {
            Some(json) => CoreConfig::from_json(&json)?,
            None => CoreConfig::default(),
        };
        config.store_path = store_path.into();

        if !location.services_enabled() {
            info!("location services are not enabled");
            return Ok(Self {
                inner: Mutex::new(None),
                delegate,
            });
        }

        let store = SqlitePinStore::open(&config.store_path)?;
        Ok(Self {
            inner: Mutex::new(Some(Coordinator::new(store, location, config))),
            delegate,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<HostCoordinator>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    pub fn fetch_pins(&self) -> Result<Vec<Pin>, StoreError> {
        let pins = match self.lock().as_ref() {
            Some(coordinator) => coordinator.load_pins()?,
            None => return Err(not_running()),
        };
        for pin in &pins {
            self.delegate.on_annotation_loaded(pin.annotation());
        }
        Ok(pins)
    }

    pub fn request_location_authorization(&self) {
        if let Some(coordinator) = self.lock().as_ref() {
            coordinator.request_location_authorization();
        }
    }

    pub fn location_updated(&self, fixes: Vec<LocationFix>) {
        if !self.is_running() {
            return;
        }
        if let Some(coordinate) = latest_coordinate(&fixes) {
            self.delegate.on_location_update(coordinate);
        }
    }

    pub fn authorization_changed(&self, status: AuthorizationStatus) {
        if let Some(coordinator) = self.lock().as_ref() {
            coordinator.on_authorization_changed(status);
        }
    }

    pub fn save_pin(&self, coordinate: Coordinate, name: String) -> Result<Pin, PinError> {
        match self.lock().as_mut() {
            Some(coordinator) => coordinator.save_pin(coordinate, &name),
            None => Err(PinError::CoordinatorUnavailable),
        }
    }

    /// Completion flag for a delete: `true` only when a record was removed.
    pub fn delete_record(&self, id: PinId) -> bool {
        match self.lock().as_mut() {
            Some(coordinator) => coordinator.delete_record(&id).unwrap_or(false),
            None => {
                error!(pin_id = %id, "delete without a running coordinator");
                false
            }
        }
    }

    pub fn select_annotation(&self, annotation: Annotation) {
        if self.is_running() {
            self.delegate.on_annotation_selected(annotation);
        }
    }

    pub fn shutdown(&self) -> Result<(), StoreError> {
        let coordinator = self.lock().take();
        match coordinator {
            Some(coordinator) => coordinator.shutdown(),
            None => Ok(()),
        }
    }
}

fn not_running() -> StoreError {
    StoreError::Unavailable("coordinator not running".to_string())
}
