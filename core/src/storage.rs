use crate::error::StoreError;
use crate::models::{Coordinate, Pin, PinId};

/// Entity (table) name every pin record is stored under.
pub const PIN_ENTITY_NAME: &str = "PinsLocations";

/// A record as it sits in the store. Every field is optional because the
/// store does not enforce them; rows that cannot become a [`Pin`] are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PinRow {
    pub id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<String>,
}

impl PinRow {
    pub fn into_pin(self) -> Option<Pin> {
        let id = PinId::parse(self.id.as_deref()?)?;
        Some(Pin {
            id,
            coordinate: Coordinate::new(self.latitude?, self.longitude?),
            name: self.name?,
        })
    }
}

impl From<&Pin> for PinRow {
    fn from(pin: &Pin) -> Self {
        Self {
            id: Some(pin.id.0.clone()),
            latitude: Some(pin.coordinate.latitude),
            longitude: Some(pin.coordinate.longitude),
            name: Some(pin.name.clone()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PinListing {
    pub pins: Vec<Pin>,
    /// Rows dropped because a field was missing or malformed.
    pub skipped: usize,
}

impl PinListing {
    pub fn from_rows(rows: impl IntoIterator<Item = PinRow>) -> Self {
        let mut listing = PinListing::default();
        for row in rows {
            match row.into_pin() {
                Some(pin) => listing.pins.push(pin),
                None => listing.skipped += 1,
            }
        }
        listing
    }
}

pub trait PinStore {
    fn insert_pin(&mut self, pin: &Pin) -> Result<(), StoreError>;
    fn list_pins(&self) -> Result<PinListing, StoreError>;
    /// Removes every record with this id and returns how many were removed.
    fn delete_pin(&mut self, id: &PinId) -> Result<usize, StoreError>;
    fn close(self) -> Result<(), StoreError>
    where
        Self: Sized;
}
