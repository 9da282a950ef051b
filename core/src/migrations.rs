use crate::error::StoreError;

/// Schema migrations in version order. Versions already recorded in
/// `schema_migrations` are skipped.
pub const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../migrations/0001_create_pins_locations.sql"),
)];

pub fn ensure_schema(conn: &mut rusqlite::Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY, applied_at INTEGER NOT NULL)",
        [],
    )?;
    let current: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    for &(version, sql) in MIGRATIONS {
        if version <= current {
            continue;
        }
        apply(conn, version, sql).map_err(|source| StoreError::Migration { version, source })?;
        tracing::debug!(version, "applied schema migration");
    }

    Ok(())
}

fn apply(conn: &mut rusqlite::Connection, version: i64, sql: &str) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO schema_migrations(version, applied_at) VALUES (?, strftime('%s','now'))",
        [version],
    )?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied_versions(conn: &rusqlite::Connection) -> Vec<i64> {
        let mut stmt = conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")
            .unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_ensure_schema_creates_pin_table() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'PinsLocations'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(applied_versions(&conn), vec![1]);
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        ensure_schema(&mut conn).unwrap();
        assert_eq!(applied_versions(&conn), vec![1]);
    }
}
