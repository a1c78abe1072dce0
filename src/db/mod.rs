//! Persistence module split across logical submodules. `connection` owns the
//! store handle and schema, `books` holds the CRUD queries.

mod books;
mod connection;

pub use connection::{CatalogStore, DEFAULT_DB_PATH};
