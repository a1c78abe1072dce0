use crate::models::{Book, BookField};

/// Table state for the catalog view: the rows last loaded from the store, the
/// highlighted cell and the active title filter.
pub(crate) struct BookTable {
    pub(crate) books: Vec<Book>,
    pub(crate) selected: usize,
    pub(crate) column: BookField,
    pub(crate) filter: String,
}

impl BookTable {
    pub(crate) fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            selected: 0,
            column: BookField::Title,
            filter: String::new(),
        }
    }

    /// Replace the rows after a reload. When `focus_id` is still present the
    /// selection follows it; otherwise the old index is clamped.
    pub(crate) fn set_books(&mut self, books: Vec<Book>, focus_id: Option<i64>) {
        self.books = books;
        if let Some(id) = focus_id {
            if let Some(idx) = self.books.iter().position(|book| book.id == id) {
                self.selected = idx;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let last = self.books.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }

    /// Step the highlighted column left or right, stopping at the edges.
    pub(crate) fn move_column(&mut self, offset: isize) {
        let last = BookField::ALL.len() as isize - 1;
        let idx = (self.column.index() as isize + offset).clamp(0, last) as usize;
        self.column = BookField::ALL[idx];
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        if self.books.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.books.len() {
            self.selected = self.books.len() - 1;
        }
    }

    /// Range of rows to draw in a viewport `height` rows tall, scrolled just
    /// enough to keep the selection visible.
    pub(crate) fn visible_range(&self, height: usize) -> std::ops::Range<usize> {
        if height == 0 || self.books.is_empty() {
            return 0..0;
        }
        let start = self.selected.saturating_sub(height - 1);
        let end = (start + height).min(self.books.len());
        start..end
    }
}
