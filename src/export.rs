//! CSV export of the whole catalog.
//!
//! The file is assembled in a temporary sibling of the destination and renamed
//! into place only after every row has been flushed, so a failed export never
//! leaves a truncated CSV behind (or clobbers a previous good one).

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::{info, warn};

use crate::db::CatalogStore;
use crate::error::{CatalogError, Result};
use crate::models::{Book, BookField};

impl CatalogStore {
    /// Write `ID,Title,Author,Year` followed by every book, in `list_all`
    /// order, to `destination`. Returns the number of data rows written.
    pub fn export_to_csv(&self, destination: impl AsRef<Path>) -> Result<usize> {
        let destination = destination.as_ref();
        let books = self.list_all()?;

        match write_atomically(destination, &books) {
            Ok(()) => {
                info!(path = %destination.display(), rows = books.len(), "exported catalog");
                Ok(books.len())
            }
            Err(source) => {
                warn!(path = %destination.display(), error = %source, "export failed");
                Err(CatalogError::Export {
                    path: destination.to_path_buf(),
                    source,
                })
            }
        }
    }
}

/// Serialize `books` as CSV into any writer. Quoting follows RFC 4180: fields
/// containing commas, quotes or line breaks are wrapped in double quotes.
pub fn write_csv<W: Write>(writer: W, books: &[Book]) -> io::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(BookField::ALL.map(BookField::header))?;
    for book in books {
        csv.write_record(book.values())?;
    }
    csv.flush()?;
    Ok(())
}

fn write_atomically(destination: &Path, books: &[Book]) -> io::Result<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let existing = fs::metadata(destination)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.permissions());

    let mut staging = staging_file(dir)?;
    write_csv(&mut staging, books)?;
    staging.as_file().sync_all()?;
    if let Some(permissions) = existing {
        fs::set_permissions(staging.path(), permissions)?;
    }
    staging.persist(destination)?;
    Ok(())
}

/// Temp file in `dir` created with the mode a plain `File::create` would get
/// (0o666 minus the umask) instead of tempfile's owner-only default.
#[cfg(unix)]
fn staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    Builder::new()
        .prefix(".books-export")
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    Builder::new().prefix(".books-export").tempfile_in(dir)
}
