//! Domain model mirroring the `books` table. `Book` stays a plain data holder;
//! `BookField` is the only way the rest of the crate names a column, so table
//! cells, CSV headers and SQL column names cannot drift apart.

use std::fmt;

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Primary key assigned by SQLite. Never reused after deletion.
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Free-form publication year. Kept as text so entries like "c. 1600" or
    /// "1965/66" survive untouched.
    pub year: String,
}

impl Book {
    /// Text shown for a single column, used by the table view and CSV rows.
    pub fn value(&self, field: BookField) -> String {
        match field {
            BookField::Id => self.id.to_string(),
            BookField::Title => self.title.clone(),
            BookField::Author => self.author.clone(),
            BookField::Year => self.year.clone(),
        }
    }

    /// All column values in display order.
    pub fn values(&self) -> [String; 4] {
        BookField::ALL.map(|field| self.value(field))
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.title, self.author, self.year)
    }
}

/// Column selector for a book record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BookField {
    Id,
    Title,
    Author,
    Year,
}

impl BookField {
    /// Every column, in table and CSV order.
    pub const ALL: [BookField; 4] = [
        BookField::Id,
        BookField::Title,
        BookField::Author,
        BookField::Year,
    ];

    /// Column name inside the `books` table.
    pub fn column(self) -> &'static str {
        match self {
            BookField::Id => "id",
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Year => "year",
        }
    }

    /// Human-facing header, shared by the table view and the CSV export.
    pub fn header(self) -> &'static str {
        match self {
            BookField::Id => "ID",
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
        }
    }

    /// Whether the store accepts edits to this column.
    pub fn is_editable(self) -> bool {
        !matches!(self, BookField::Id)
    }

    /// Position of the column in `ALL`.
    pub fn index(self) -> usize {
        match self {
            BookField::Id => 0,
            BookField::Title => 1,
            BookField::Author => 2,
            BookField::Year => 3,
        }
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}
