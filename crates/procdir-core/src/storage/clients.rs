use super::sqlite::Database;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use crate::error::Error;

/// Client names are stored trimmed and upper-cased.
pub fn normalize_client_name(name: &str) -> String {
    name.trim().to_uppercase()
}

impl Database {
    /// All client names in alphabetical order.
    pub fn list_clients(&self) -> Result<Vec<String>, Error> {
        let conn = self.connection();
        let mut stmt = conn.prepare("SELECT name FROM client ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        debug!("Loaded {} clients", names.len());
        Ok(names)
    }

    pub fn add_client(&self, name: &str) -> Result<String, Error> {
        let name = normalize_client_name(name);
        if name.is_empty() {
            return Err(Error::MissingField("client"));
        }

        let conn = self.connection();
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM client WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::ClientAlreadyExists(name));
        }

        conn.execute("INSERT INTO client (name) VALUES (?1)", params![name])?;
        info!("Client '{}' registered", name);
        Ok(name)
    }

    pub fn remove_client(&self, name: &str) -> Result<String, Error> {
        let name = normalize_client_name(name);
        let removed = self
            .connection()
            .execute("DELETE FROM client WHERE name = ?1", params![name])?;
        if removed == 0 {
            return Err(Error::ClientNotFound(name));
        }
        info!("Client '{}' removed", name);
        Ok(name)
    }

    pub fn has_client(&self, name: &str) -> Result<bool, Error> {
        let name = normalize_client_name(name);
        let count: i64 = self.connection().query_row(
            "SELECT COUNT(*) FROM client WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
