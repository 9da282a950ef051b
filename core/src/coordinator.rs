//! Bridge between the device location service, the pin store and the map
//! presentation surface.
//!
//! The coordinator never talks to the map directly. It reports through a
//! [`MapDelegate`], and the map only reaches the store and the location
//! service through the coordinator.

use tracing::{debug, error, info, warn};

use crate::config::CoreConfig;
use crate::error::{PinError, StoreError};
use crate::location::{AuthorizationStatus, LocationService};
use crate::models::{Annotation, Coordinate, LocationFix, Pin, PinId};
use crate::storage::PinStore;

/// Notifications from the coordinator to the presentation surface. All of
/// them fire synchronously, on the caller's thread.
pub trait MapDelegate: Send + Sync {
    fn on_location_update(&self, coordinate: Coordinate);
    fn on_annotation_selected(&self, annotation: Annotation);
    fn on_annotation_loaded(&self, annotation: Annotation);
}

pub struct Coordinator<S, L> {
    store: S,
    location: L,
    delegate: Option<Box<dyn MapDelegate>>,
    config: CoreConfig,
}

impl<S: PinStore, L: LocationService> Coordinator<S, L> {
    pub fn new(store: S, location: L, config: CoreConfig) -> Self {
        Self {
            store,
            location,
            delegate: None,
            config,
        }
    }

    pub fn set_delegate(&mut self, delegate: Box<dyn MapDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// Loads the saved pins so the surface can draw them.
    pub fn setup(&mut self) -> Result<Vec<Pin>, StoreError> {
        self.fetch_pins()
    }

    pub fn request_location_authorization(&self) {
        let status = self.location.authorization_status();
        if matches!(
            status,
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted
        ) {
            warn!(?status, "location authorization previously refused");
        }
        self.location
            .set_desired_accuracy(self.config.desired_accuracy);
        self.location.request_when_in_use_authorization();
        self.location.start_updating_location();
        debug!(accuracy = ?self.config.desired_accuracy, "started location updates");
    }

    /// Forwards the most recent fix of a batch; older fixes are dropped.
    pub fn on_location_update(&self, fixes: &[LocationFix]) {
        let Some(coordinate) = latest_coordinate(fixes) else {
            return;
        };
        if let Some(delegate) = &self.delegate {
            delegate.on_location_update(coordinate);
        }
    }

    pub fn on_authorization_changed(&self, status: AuthorizationStatus) {
        match status {
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                warn!(?status, "location authorization not granted");
            }
            _ => info!(?status, "location authorization changed"),
        }
    }

    pub fn save_pin(&mut self, coordinate: Coordinate, name: &str) -> Result<Pin, PinError> {
        if name.is_empty() {
            return Err(PinError::EmptyName);
        }
        if !coordinate.is_valid() {
            return Err(PinError::InvalidCoordinate {
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
            });
        }

        let pin = Pin {
            id: PinId::generate(),
            coordinate,
            name: name.to_string(),
        };
        if let Err(err) = self.store.insert_pin(&pin) {
            error!(error = %err, "failed to save pin");
            return Err(err.into());
        }
        info!(pin_id = %pin.id, "saved pin");
        Ok(pin)
    }

    /// Reads every stored pin and notifies the delegate once per pin.
    pub fn fetch_pins(&mut self) -> Result<Vec<Pin>, StoreError> {
        let pins = self.load_pins()?;
        if let Some(delegate) = &self.delegate {
            for pin in &pins {
                delegate.on_annotation_loaded(pin.annotation());
            }
        }
        Ok(pins)
    }

    /// Reads every stored pin without notifying the delegate.
    pub fn load_pins(&self) -> Result<Vec<Pin>, StoreError> {
        let listing = self.store.list_pins().inspect_err(|err| {
            error!(error = %err, "failed to fetch pins");
        })?;
        if listing.skipped > 0 {
            warn!(skipped = listing.skipped, "skipped malformed pin records");
        }
        debug!(count = listing.pins.len(), "fetched pins");
        Ok(listing.pins)
    }

    /// `Ok(false)` when no record carried this id.
    pub fn delete_record(&mut self, id: &PinId) -> Result<bool, StoreError> {
        match self.store.delete_pin(id) {
            Ok(0) => {
                debug!(pin_id = %id, "no pin to delete");
                Ok(false)
            }
            Ok(removed) => {
                info!(pin_id = %id, removed, "deleted pin");
                Ok(true)
            }
            Err(err) => {
                error!(pin_id = %id, error = %err, "failed to delete pin");
                Err(err)
            }
        }
    }

    /// Callout accessory tapped on a marker.
    pub fn select_annotation(&self, annotation: Annotation) {
        if let Some(delegate) = &self.delegate {
            delegate.on_annotation_selected(annotation);
        }
    }

    pub fn shutdown(self) -> Result<(), StoreError> {
        self.location.stop_updating_location();
        self.store.close()
    }
}

pub fn latest_coordinate(fixes: &[LocationFix]) -> Option<Coordinate> {
    fixes.last().map(|fix| fix.coordinate)
}
