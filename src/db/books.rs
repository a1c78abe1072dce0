use rusqlite::types::ValueRef;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::connection::CatalogStore;
use crate::error::{CatalogError, Result};
use crate::models::{Book, BookField};

const SELECT_BOOKS: &str = "SELECT id, title, author, year FROM books";

impl CatalogStore {
    /// Insert a new book and return its freshly assigned id. Every field must
    /// contain something other than whitespace; values are stored exactly as
    /// given.
    pub fn create(&self, title: &str, author: &str, year: &str) -> Result<i64> {
        for (field, value) in [
            (BookField::Title, title),
            (BookField::Author, author),
            (BookField::Year, year),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::Validation { field });
            }
        }

        self.conn.execute(
            "INSERT INTO books (title, author, year) VALUES (?1, ?2, ?3)",
            params![title, author, year],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, title, "created book");
        Ok(id)
    }

    /// Every book in insertion order. Each call reads storage again.
    pub fn list_all(&self) -> Result<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_BOOKS} ORDER BY id"))?;

        let books = stmt
            .query_map([], book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = books.len(), "listed books");
        Ok(books)
    }

    /// Books whose title contains `title_substring`, ignoring case. An empty
    /// query returns the full list. Ordering matches `list_all`.
    pub fn search(&self, title_substring: &str) -> Result<Vec<Book>> {
        let books = self.list_all()?;
        if title_substring.is_empty() {
            return Ok(books);
        }

        let needle = title_substring.to_lowercase();
        let matches: Vec<Book> = books
            .into_iter()
            .filter(|book| book.title.to_lowercase().contains(&needle))
            .collect();

        debug!(query = title_substring, count = matches.len(), "searched books");
        Ok(matches)
    }

    /// Look up a single book.
    pub fn get(&self, id: i64) -> Result<Option<Book>> {
        let book = self
            .conn
            .query_row(
                &format!("{SELECT_BOOKS} WHERE id = ?1"),
                params![id],
                book_from_row,
            )
            .optional()?;
        Ok(book)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Overwrite one column of one book. The id column is read-only and blank
    /// replacements are refused; everything else is stored verbatim.
    pub fn update_field(&self, id: i64, field: BookField, new_value: &str) -> Result<()> {
        if !field.is_editable() {
            return Err(CatalogError::ImmutableField { field });
        }
        if new_value.trim().is_empty() {
            return Err(CatalogError::Validation { field });
        }

        // `field.column()` is a fixed identifier, never user input.
        let sql = format!("UPDATE books SET {} = ?1 WHERE id = ?2", field.column());
        let updated = self.conn.execute(&sql, params![new_value, id])?;

        if updated == 0 {
            Err(CatalogError::NotFound { id })
        } else {
            info!(id, field = field.column(), "updated book");
            Ok(())
        }
    }

    /// Remove a book. Deleting an id that does not exist succeeds and
    /// returns `false`.
    pub fn delete_by_id(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])?;

        if deleted == 0 {
            debug!(id, "delete skipped, no such book");
        } else {
            info!(id, "deleted book");
        }
        Ok(deleted > 0)
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: text_column(row, 1)?,
        author: text_column(row, 2)?,
        year: text_column(row, 3)?,
    })
}

/// Read a column as text regardless of its storage class. Databases created
/// by older builds declared `year INTEGER` and allowed NULL titles, so numbers
/// are rendered and NULL becomes an empty string.
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    })
}
