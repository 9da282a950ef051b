use crate::error::StoreError;
use crate::models::{Pin, PinId};
use crate::storage::{PinListing, PinRow, PinStore};

/// In-memory pin store with switches for simulating store failures.
#[derive(Clone, Debug, Default)]
pub struct MemoryPinStore {
    pub rows: Vec<PinRow>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MemoryPinStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pins(pins: &[Pin]) -> Self {
        Self {
            rows: pins.iter().map(PinRow::from).collect(),
            ..Self::default()
        }
    }

    fn unavailable(op: &str) -> StoreError {
        StoreError::Unavailable(format!("simulated {op} failure"))
    }
}

impl PinStore for MemoryPinStore {
    fn insert_pin(&mut self, pin: &Pin) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(Self::unavailable("write"));
        }
        self.rows.push(PinRow::from(pin));
        Ok(())
    }

    fn list_pins(&self) -> Result<PinListing, StoreError> {
        if self.fail_reads {
            return Err(Self::unavailable("read"));
        }
        Ok(PinListing::from_rows(self.rows.iter().cloned()))
    }

    fn delete_pin(&mut self, id: &PinId) -> Result<usize, StoreError> {
        if self.fail_writes {
            return Err(Self::unavailable("delete"));
        }
        let before = self.rows.len();
        self.rows
            .retain(|row| row.id.as_deref() != Some(id.as_str()));
        Ok(before - self.rows.len())
    }

    fn close(self) -> Result<(), StoreError> {
        Ok(())
    }
}
