use uuid::Uuid;

/// Metres covered by one degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PinId(pub String);

uniffi::custom_newtype!(PinId, String);

impl PinId {
    /// Fresh random identifier for a newly created pin.
    pub fn generate() -> Self {
        PinId(Uuid::new_v4().to_string())
    }

    /// Accepts only well-formed UUIDs, normalised to lowercase hyphenated form.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw)
            .ok()
            .map(|uuid| PinId(uuid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
    pub id: PinId,
    pub coordinate: Coordinate,
    pub name: String,
}

impl Pin {
    pub fn annotation(&self) -> Annotation {
        Annotation {
            pin_id: Some(self.id.clone()),
            coordinate: self.coordinate,
            title: self.name.clone(),
        }
    }
}

/// A marker on the map. `pin_id` is `None` only for the user's own location.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub pin_id: Option<PinId>,
    pub coordinate: Coordinate,
    pub title: String,
}

impl Annotation {
    pub fn user_location(coordinate: Coordinate, title: impl Into<String>) -> Self {
        Self {
            pin_id: None,
            coordinate,
            title: title.into(),
        }
    }

    pub fn is_user_location(&self) -> bool {
        self.pin_id.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    pub horizontal_accuracy_m: f64,
    pub timestamp_unix_ms: i64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateSpan {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub center: Coordinate,
    pub span: CoordinateSpan,
}

impl Region {
    /// Region centred on `center` spanning the given distances in metres.
    pub fn from_meters(center: Coordinate, latitudinal_m: f64, longitudinal_m: f64) -> Self {
        let latitude_delta = latitudinal_m / METERS_PER_DEGREE;
        // Clamp so the span stays finite near the poles.
        let cos_lat = center.latitude.to_radians().cos().abs().max(1e-6);
        let longitude_delta = (longitudinal_m / (METERS_PER_DEGREE * cos_lat)).min(360.0);
        Self {
            center,
            span: CoordinateSpan {
                latitude_delta,
                longitude_delta,
            },
        }
    }

    pub fn world() -> Self {
        Self {
            center: Coordinate::new(0.0, 0.0),
            span: CoordinateSpan {
                latitude_delta: 180.0,
                longitude_delta: 360.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_id_generate_is_unique_uuid() {
        let a = PinId::generate();
        let b = PinId::generate();
        assert_ne!(a, b);
        assert!(PinId::parse(a.as_str()).is_some());
    }

    #[test]
    fn test_pin_id_parse_rejects_garbage() {
        assert!(PinId::parse("not-a-uuid").is_none());
        assert!(PinId::parse("").is_none());
        let parsed = PinId::parse("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        assert_eq!(parsed.as_str(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(19.4326, -99.1332).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.1).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_region_from_meters() {
        let region = Region::from_meters(Coordinate::new(0.0, 0.0), 1000.0, 1000.0);
        assert!((region.span.latitude_delta - 1000.0 / METERS_PER_DEGREE).abs() < 1e-12);
        assert!((region.span.longitude_delta - 1000.0 / METERS_PER_DEGREE).abs() < 1e-9);

        let north = Region::from_meters(Coordinate::new(60.0, 0.0), 1000.0, 1000.0);
        assert!(north.span.longitude_delta > north.span.latitude_delta * 1.9);
    }

    #[test]
    fn test_pin_annotation_carries_id() {
        let pin = Pin {
            id: PinId::generate(),
            coordinate: Coordinate::new(1.0, 2.0),
            name: "Camp".to_string(),
        };
        let annotation = pin.annotation();
        assert_eq!(annotation.pin_id, Some(pin.id.clone()));
        assert!(!annotation.is_user_location());
        assert!(Annotation::user_location(pin.coordinate, "My Location").is_user_location());
    }
}
