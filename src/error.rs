//! Error kinds surfaced by the catalog store. The presentation layer matches on
//! these to decide between "ask the user to fix the input" and "show the
//! failure and carry on".

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::BookField;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A required field was blank.
    #[error("{} is required.", field.header())]
    Validation { field: BookField },

    #[error("Book with ID {id} not found.")]
    NotFound { id: i64 },

    /// Ids are assigned by the store and never edited.
    #[error("{} cannot be edited.", field.header())]
    ImmutableField { field: BookField },

    #[error("failed to export catalog to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
