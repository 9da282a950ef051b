use std::sync::{Arc, Mutex};

use crate::location::{AuthorizationStatus, LocationAccuracy, LocationService};

#[derive(Clone, Debug)]
pub struct MockLocationState {
    pub enabled: bool,
    pub status: AuthorizationStatus,
    pub desired_accuracy: Option<LocationAccuracy>,
    pub authorization_requests: u32,
    pub updating: bool,
}

impl Default for MockLocationState {
    fn default() -> Self {
        Self {
            enabled: true,
            status: AuthorizationStatus::NotDetermined,
            desired_accuracy: None,
            authorization_requests: 0,
            updating: false,
        }
    }
}

/// Scripted location service. Clones share state so a test can keep a
/// handle after moving one into a coordinator.
#[derive(Clone, Debug, Default)]
pub struct MockLocationService {
    state: Arc<Mutex<MockLocationState>>,
}

impl MockLocationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        let mock = Self::default();
        mock.update(|s| s.enabled = false);
        mock
    }

    pub fn snapshot(&self) -> MockLocationState {
        self.lock().clone()
    }

    pub fn set_status(&self, status: AuthorizationStatus) {
        self.update(|s| s.status = status);
    }

    fn update(&self, f: impl FnOnce(&mut MockLocationState)) {
        f(&mut *self.lock());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockLocationState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocationService for MockLocationService {
    fn services_enabled(&self) -> bool {
        self.lock().enabled
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.lock().status
    }

    fn request_when_in_use_authorization(&self) {
        self.update(|s| {
            s.authorization_requests += 1;
            if s.status == AuthorizationStatus::NotDetermined {
                s.status = AuthorizationStatus::AuthorizedWhenInUse;
            }
        });
    }

    fn set_desired_accuracy(&self, accuracy: LocationAccuracy) {
        self.update(|s| s.desired_accuracy = Some(accuracy));
    }

    fn start_updating_location(&self) {
        self.update(|s| s.updating = true);
    }

    fn stop_updating_location(&self) {
        self.update(|s| s.updating = false);
    }
}
