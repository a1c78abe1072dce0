use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "books.db";

/// Owns the single SQLite connection for the lifetime of the application.
/// Construct it once at startup and hand out references; there is no global
/// handle anywhere else in the crate.
pub struct CatalogStore {
    pub(super) conn: Connection,
}

impl CatalogStore {
    /// Open (or create) the database file at `path` and make sure the schema
    /// exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening catalog database");
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Private in-memory catalog, handy for tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create the `books` table if it is missing. Safe to call on every
    /// startup. `AUTOINCREMENT` keeps SQLite from handing out the id of a
    /// deleted row again.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                year TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Raw handle for tests that need to reshape the schema underneath the store.
    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
