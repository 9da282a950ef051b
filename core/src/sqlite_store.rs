use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::migrations::ensure_schema;
use crate::models::{Pin, PinId};
use crate::storage::{PinListing, PinRow, PinStore};

/// SQLite-backed pin store. Opened once at startup, closed at shutdown.
pub struct SqlitePinStore {
    conn: Connection,
}

impl SqlitePinStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self, StoreError> {
        ensure_schema(&mut conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    fn insert_row(&self, row: &PinRow) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO PinsLocations (id, latitude, longitude, name) VALUES (?1, ?2, ?3, ?4)",
            params![row.id, row.latitude, row.longitude, row.name],
        )?;
        Ok(())
    }
}

impl PinStore for SqlitePinStore {
    fn insert_pin(&mut self, pin: &Pin) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO PinsLocations (id, latitude, longitude, name) VALUES (?1, ?2, ?3, ?4)",
            params![
                pin.id.as_str(),
                pin.coordinate.latitude,
                pin.coordinate.longitude,
                pin.name
            ],
        )?;
        Ok(())
    }

    fn list_pins(&self) -> Result<PinListing, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, latitude, longitude, name FROM PinsLocations ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PinRow {
                    id: row.get(0).ok(),
                    latitude: row.get(1).ok(),
                    longitude: row.get(2).ok(),
                    name: row.get(3).ok(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PinListing::from_rows(rows))
    }

    fn delete_pin(&mut self, id: &PinId) -> Result<usize, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM PinsLocations WHERE id = ?1", [id.as_str()])?;
        Ok(removed)
    }

    fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::Query(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn pin(name: &str, lat: f64, lon: f64) -> Pin {
        Pin {
            id: PinId::generate(),
            coordinate: Coordinate::new(lat, lon),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_insert_and_list() {
        let mut store = SqlitePinStore::open_in_memory().unwrap();
        let campsite = pin("Campsite", 19.4326, -99.1332);
        store.insert_pin(&campsite).unwrap();

        let listing = store.list_pins().unwrap();
        assert_eq!(listing.pins, vec![campsite]);
        assert_eq!(listing.skipped, 0);
    }

    #[test]
    fn test_delete_removes_only_matching() {
        let mut store = SqlitePinStore::open_in_memory().unwrap();
        let a = pin("A", 1.0, 1.0);
        let b = pin("B", 2.0, 2.0);
        store.insert_pin(&a).unwrap();
        store.insert_pin(&b).unwrap();

        assert_eq!(store.delete_pin(&a.id).unwrap(), 1);
        assert_eq!(store.delete_pin(&a.id).unwrap(), 0);
        assert_eq!(store.list_pins().unwrap().pins, vec![b]);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let mut store = SqlitePinStore::open_in_memory().unwrap();
        let good = pin("Good", 3.0, 4.0);
        store.insert_pin(&good).unwrap();
        store
            .insert_row(&PinRow {
                id: Some(PinId::generate().0),
                latitude: Some(1.0),
                longitude: None,
                name: Some("No longitude".to_string()),
            })
            .unwrap();
        store
            .insert_row(&PinRow {
                id: Some("not-a-uuid".to_string()),
                latitude: Some(1.0),
                longitude: Some(1.0),
                name: Some("Bad id".to_string()),
            })
            .unwrap();

        let listing = store.list_pins().unwrap();
        assert_eq!(listing.pins, vec![good]);
        assert_eq!(listing.skipped, 2);
    }

    #[test]
    fn test_pins_survive_reopen() {
        let path = std::env::temp_dir().join(format!("pinmap-{}.sqlite", PinId::generate()));
        let campsite = pin("Campsite", 19.4326, -99.1332);

        let mut store = SqlitePinStore::open(&path).unwrap();
        store.insert_pin(&campsite).unwrap();
        store.close().unwrap();

        let store = SqlitePinStore::open(&path).unwrap();
        assert_eq!(store.list_pins().unwrap().pins, vec![campsite]);
        store.close().unwrap();
        let _ = std::fs::remove_file(&path);
    }
}
