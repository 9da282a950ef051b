use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAccuracy {
    Best,
    NearestTenMeters,
    HundredMeters,
    Kilometer,
    ThreeKilometers,
}

/// Device location provider. The host implements this; location and
/// authorization events are pushed back into the coordinator by the host.
pub trait LocationService: Send + Sync {
    fn services_enabled(&self) -> bool;
    fn authorization_status(&self) -> AuthorizationStatus;
    fn request_when_in_use_authorization(&self);
    fn set_desired_accuracy(&self, accuracy: LocationAccuracy);
    fn start_updating_location(&self);
    fn stop_updating_location(&self);
}

impl<T: LocationService + ?Sized> LocationService for Box<T> {
    fn services_enabled(&self) -> bool {
        (**self).services_enabled()
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        (**self).authorization_status()
    }

    fn request_when_in_use_authorization(&self) {
        (**self).request_when_in_use_authorization()
    }

    fn set_desired_accuracy(&self, accuracy: LocationAccuracy) {
        (**self).set_desired_accuracy(accuracy)
    }

    fn start_updating_location(&self) {
        (**self).start_updating_location()
    }

    fn stop_updating_location(&self) {
        (**self).stop_updating_location()
    }
}
