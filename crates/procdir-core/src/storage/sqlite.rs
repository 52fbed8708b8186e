use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// SQLite-backed store for the client-name list.
///
/// A single mutex guards the connection so each read-modify-write sequence
/// runs alone, even when several requests share one `Database`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                debug!("Could not create {}: {}", parent.display(), e);
            }
        }
        let conn = Connection::open(path)?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.connection().execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode)");
        Ok(())
    }

    fn migrate_schema(&self) -> Result<()> {
        self.connection().execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema initialized (version 1)");
        Ok(())
    }

    /// Exclusive access to the connection for the duration of the guard.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
