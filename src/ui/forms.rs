use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookField};

/// Internal representation of the "add book" form.
#[derive(Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: String::new(),
            active: BookField::Title,
            error: None,
        }
    }
}

/// Fields shown in the form, in tab order.
pub(crate) const FORM_FIELDS: [BookField; 3] =
    [BookField::Title, BookField::Author, BookField::Year];

impl BookForm {
    fn value_mut(&mut self, field: BookField) -> Option<&mut String> {
        match field {
            BookField::Title => Some(&mut self.title),
            BookField::Author => Some(&mut self.author),
            BookField::Year => Some(&mut self.year),
            BookField::Id => None,
        }
    }

    pub(crate) fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Id => "",
        }
    }

    /// Move focus forward (`1`) or backward (`-1`), wrapping around.
    pub(crate) fn cycle_field(&mut self, offset: isize) {
        let len = FORM_FIELDS.len() as isize;
        let current = FORM_FIELDS
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        self.active = FORM_FIELDS[next];
    }

    /// Append a character to the active field. Control characters are
    /// ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.value_mut(self.active) {
            Some(value) => {
                value.push(ch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.value_mut(self.active) {
            value.pop();
        }
    }

    /// Trimmed values ready for the store. Every field must be filled in.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, String)> {
        let title = self.title.trim();
        let author = self.author.trim();
        let year = self.year.trim();
        if title.is_empty() || author.is_empty() || year.is_empty() {
            return Err(anyhow!("All fields are required."));
        }
        Ok((title.to_string(), author.to_string(), year.to_string()))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.header())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }
}

/// Single-line text entry shared by the cell editor and the export prompt.
#[derive(Default, Clone)]
pub(crate) struct LineInput {
    pub(crate) value: String,
}

impl LineInput {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            false
        } else {
            self.value.push(ch);
            true
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn len(&self) -> usize {
        self.value.chars().count()
    }
}

/// State for editing one cell of the table in place.
#[derive(Clone)]
pub(crate) struct CellEdit {
    pub(crate) book_id: i64,
    pub(crate) field: BookField,
    pub(crate) original: String,
    pub(crate) input: LineInput,
    pub(crate) error: Option<String>,
}

/// What the user asked for when confirming a cell edit.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CellChange {
    Unchanged,
    Blank,
    Changed(String),
}

impl CellEdit {
    /// Prefill the prompt with the cell's current value.
    pub(crate) fn from_book(book: &Book, field: BookField) -> Self {
        let original = book.value(field);
        Self {
            book_id: book.id,
            field,
            input: LineInput::new(original.clone()),
            original,
            error: None,
        }
    }

    pub(crate) fn change(&self) -> CellChange {
        let value = self.input.value.trim();
        if value.is_empty() {
            CellChange::Blank
        } else if value == self.original {
            CellChange::Unchanged
        } else {
            CellChange::Changed(value.to_string())
        }
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

impl ConfirmDelete {
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}

/// Destination prompt for the CSV export.
#[derive(Clone)]
pub(crate) struct ExportPrompt {
    pub(crate) input: LineInput,
    pub(crate) error: Option<String>,
}

impl ExportPrompt {
    pub(crate) fn new(default_path: &str) -> Self {
        Self {
            input: LineInput::new(default_path),
            error: None,
        }
    }
}
