use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::db::CatalogStore;
use crate::models::BookField;

use super::forms::{BookForm, CellChange, CellEdit, ConfirmDelete, ExportPrompt, FORM_FIELDS};
use super::helpers::{centered_rect, surface_error};
use super::screens::BookTable;

/// Title bar plus search line.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained interaction modes layered over the catalog table.
enum Mode {
    Normal,
    Adding(BookForm),
    EditingCell(CellEdit),
    ConfirmDelete(ConfirmDelete),
    Searching,
    Exporting(ExportPrompt),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Application state for the interactive catalog. Every mutation goes through
/// the store and is followed by a full reload of the visible rows.
pub struct App {
    store: CatalogStore,
    table: BookTable,
    mode: Mode,
    status: Option<StatusMessage>,
    export_default: PathBuf,
}

impl App {
    pub fn new(store: CatalogStore, export_default: PathBuf) -> Result<Self> {
        let books = store.list_all().context("failed to load books")?;
        Ok(Self {
            store,
            table: BookTable::new(books),
            mode: Mode::Normal,
            status: None,
            export_default,
        })
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add_book(code, form)?,
            Mode::EditingCell(edit) => self.handle_edit_cell(code, edit)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching => self.handle_search(code)?,
            Mode::Exporting(prompt) => self.handle_export(code, prompt)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.table.filter.is_empty() {
                    *exit = true;
                } else {
                    self.table.filter.clear();
                    self.reload(None)?;
                    self.set_status("Search cleared.", StatusKind::Info);
                }
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Left => self.table.move_column(-1),
            KeyCode::Right => self.table.move_column(1),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::Adding(BookForm::default()));
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                let column = self.table.column;
                match self.table.current_book() {
                    None => self.set_status("No book selected to edit.", StatusKind::Error),
                    Some(_) if !column.is_editable() => self.set_status(
                        "IDs are assigned automatically and cannot be edited.",
                        StatusKind::Error,
                    ),
                    Some(book) => {
                        let edit = CellEdit::from_book(book, column);
                        self.clear_status();
                        return Ok(Mode::EditingCell(edit));
                    }
                }
            }
            KeyCode::Char('-') | KeyCode::Delete => match self.table.current_book() {
                Some(book) => {
                    let confirm = ConfirmDelete::from(book);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                None => self.set_status("No book selected to delete.", StatusKind::Error),
            },
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.clear_status();
                return Ok(Mode::Searching);
            }
            KeyCode::Char('x') => {
                self.clear_status();
                let default_path = self.export_default.display().to_string();
                return Ok(Mode::Exporting(ExportPrompt::new(&default_path)));
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.cycle_field(1),
            KeyCode::BackTab | KeyCode::Up => form.cycle_field(-1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok((id, title)) => {
                    // The row exists now; leaving the form open would let a
                    // second Enter insert it again.
                    keep_open = false;
                    match self.reload(Some(id)) {
                        Ok(()) => self.set_status(
                            format!("Added \"{title}\" as book {id}."),
                            StatusKind::Info,
                        ),
                        Err(err) => self.set_status(
                            format!(
                                "Added book {id}, but the list could not be refreshed: {}",
                                surface_error(&err)
                            ),
                            StatusKind::Error,
                        ),
                    }
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Adding(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_cell(&mut self, code: KeyCode, mut edit: CellEdit) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => edit.input.backspace(),
            KeyCode::Char(ch) => {
                if edit.input.push_char(ch) {
                    edit.error = None;
                }
            }
            KeyCode::Enter => match edit.change() {
                CellChange::Unchanged => return Ok(Mode::Normal),
                CellChange::Blank => {
                    self.set_status("Blank value ignored.", StatusKind::Info);
                    return Ok(Mode::Normal);
                }
                CellChange::Changed(value) => {
                    match self.store.update_field(edit.book_id, edit.field, &value) {
                        Ok(()) => {
                            self.reload(Some(edit.book_id))?;
                            self.set_status(
                                format!("Updated {} for book {}.", edit.field, edit.book_id),
                                StatusKind::Info,
                            );
                            return Ok(Mode::Normal);
                        }
                        Err(err) => {
                            let message = err.to_string();
                            edit.error = Some(message.clone());
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                }
            },
            _ => {}
        }
        Ok(Mode::EditingCell(edit))
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.delete_by_id(confirm.id) {
                    Ok(removed) => {
                        self.reload(None)?;
                        let message = if removed {
                            format!("Deleted \"{}\".", confirm.title)
                        } else {
                            format!("Book {} was already gone.", confirm.id)
                        };
                        self.set_status(message, StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Live title search. Each keystroke re-queries the store.
    fn handle_search(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.table.filter.clear();
                self.reload(None)?;
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => {
                self.table.move_selection(-1);
                return Ok(Mode::Searching);
            }
            KeyCode::Down => {
                self.table.move_selection(1);
                return Ok(Mode::Searching);
            }
            KeyCode::Backspace => {
                self.table.filter.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.table.filter.push(ch),
            _ => return Ok(Mode::Searching),
        }

        let focus = self.table.current_book().map(|book| book.id);
        self.reload(focus)?;
        Ok(Mode::Searching)
    }

    fn handle_export(&mut self, code: KeyCode, mut prompt: ExportPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Export cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => prompt.input.backspace(),
            KeyCode::Char(ch) => {
                if prompt.input.push_char(ch) {
                    prompt.error = None;
                }
            }
            KeyCode::Enter => match self.export_to(prompt.input.value.trim()) {
                Ok(message) => {
                    self.set_status(message, StatusKind::Info);
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = err.to_string();
                    prompt.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            _ => {}
        }
        Ok(Mode::Exporting(prompt))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Adding(form) => self.draw_book_form(frame, area, form),
            Mode::EditingCell(edit) => self.draw_cell_edit(frame, area, edit),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Exporting(prompt) => self.draw_export(frame, area, prompt),
            Mode::Searching | Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Book Catalog ");
        let inner = block.inner(area);
        let searching = matches!(self.mode, Mode::Searching);

        let line = if self.table.filter.is_empty() && !searching {
            Line::from(Span::styled(
                "Search title... (press /)",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let style = if searching {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw("Search: "),
                Span::styled(self.table.filter.clone(), style),
            ])
        };

        frame.render_widget(Paragraph::new(line).block(block), area);

        if searching {
            let cursor_x =
                inner.x + "Search: ".len() as u16 + self.table.filter.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Books ({}) ", self.table.books.len()));

        if self.table.books.is_empty() {
            let message = if self.table.filter.is_empty() {
                "No books yet. Press '+' to add one.".to_string()
            } else {
                format!("No titles match \"{}\".", self.table.filter)
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        // One line of the inner area goes to the header row.
        let body_height = block.inner(area).height.saturating_sub(1) as usize;
        let range = self.table.visible_range(body_height);
        let cell_style = Style::default().fg(Color::Black).bg(Color::Yellow);
        let row_style = Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD);

        let rows: Vec<Row> = self.table.books[range.clone()]
            .iter()
            .enumerate()
            .map(|(offset, book)| {
                let selected = range.start + offset == self.table.selected;
                let cells: Vec<Cell> = BookField::ALL
                    .iter()
                    .map(|field| {
                        let cell = Cell::from(book.value(*field));
                        if selected && *field == self.table.column {
                            cell.style(cell_style)
                        } else {
                            cell
                        }
                    })
                    .collect();
                let row = Row::new(cells);
                if selected {
                    row.style(row_style)
                } else {
                    row
                }
            })
            .collect();

        let header = Row::new(BookField::ALL.map(BookField::header)).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(45),
            Constraint::Percentage(35),
            Constraint::Min(6),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::Searching => &[
                ("[type]", " Filter titles   "),
                ("[↑↓]", " Select   "),
                ("[Enter]", " Keep filter   "),
                ("[Esc]", " Clear"),
            ],
            Mode::Adding(_) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::EditingCell(_) | Mode::Exporting(_) => {
                &[("[Enter]", " Confirm   "), ("[Esc]", " Cancel")]
            }
            Mode::ConfirmDelete(_) => &[("[y]", " Delete   "), ("[n]", " Keep")],
            Mode::Normal => &[
                ("[↑↓]", " Row   "),
                ("[←→]", " Column   "),
                ("[+]", " Add   "),
                ("[e]", " Edit cell   "),
                ("[-]", " Delete   "),
                ("[/]", " Search   "),
                ("[x]", " Export CSV   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = FORM_FIELDS
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(hint_or_error(
            form.error.as_deref(),
            "Enter to save • Tab to switch • Esc to cancel",
        ));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let row = FORM_FIELDS
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.header()).len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_cell_edit(&self, frame: &mut Frame, area: Rect, edit: &CellEdit) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let title = format!("Edit {} of book {}", edit.field, edit.book_id);
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(vec![
                Span::raw("Value: "),
                Span::styled(edit.input.value.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
            hint_or_error(edit.error.as_deref(), "Enter to save • Esc to cancel"),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        frame.set_cursor_position((
            inner.x + "Value: ".len() as u16 + edit.input.len() as u16,
            inner.y,
        ));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Confirm").borders(Borders::ALL);
        let lines = vec![
            Line::from(format!("Delete book with ID {}?", confirm.id)),
            Line::from(Span::styled(
                format!("\"{}\"", confirm.title),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "[y] Yes   [n] No",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_export(&self, frame: &mut Frame, area: Rect, prompt: &ExportPrompt) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Export CSV").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(vec![
                Span::raw("Path: "),
                Span::styled(
                    prompt.input.value.clone(),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            Line::from(""),
            hint_or_error(prompt.error.as_deref(), "Enter to export • Esc to cancel"),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        frame.set_cursor_position((
            inner.x + "Path: ".len() as u16 + prompt.input.len() as u16,
            inner.y,
        ));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Validate the form and insert it. Returns the new id and title.
    fn save_new_book(&self, form: &BookForm) -> Result<(i64, String)> {
        let (title, author, year) = form.parse_inputs()?;
        let id = self
            .store
            .create(&title, &author, &year)
            .context("failed to save book")?;
        Ok((id, title))
    }

    fn export_to(&self, path: &str) -> Result<String> {
        if path.is_empty() {
            return Err(anyhow!("Choose a file to export to."));
        }
        let rows = self.store.export_to_csv(Path::new(path))?;
        Ok(format!("Exported {rows} books to {path}."))
    }

    /// Re-read the visible rows from the store, honouring the active filter.
    fn reload(&mut self, focus_id: Option<i64>) -> Result<()> {
        let books = if self.table.filter.is_empty() {
            self.store.list_all()
        } else {
            self.store.search(&self.table.filter)
        }
        .context("failed to reload books")?;
        debug!(rows = books.len(), filter = %self.table.filter, "reloaded table");
        self.table.set_books(books, focus_id);
        Ok(())
    }
}

/// Either the validation error in red or a muted usage hint.
fn hint_or_error(error: Option<&str>, hint: &'static str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn app_with(books: &[(&str, &str, &str)]) -> App {
        let store = CatalogStore::open_in_memory().unwrap();
        for (title, author, year) in books {
            store.create(title, author, year).unwrap();
        }
        App::new(store, PathBuf::from("books.csv")).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        assert!(!app.handle_key(code).unwrap());
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn status_text(app: &App) -> String {
        app.status
            .as_ref()
            .map(|status| status.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn add_form_saves_and_selects_new_book() {
        let mut app = app_with(&[("1984", "George Orwell", "1949")]);
        press(&mut app, KeyCode::Char('+'));
        type_text(&mut app, "Dune");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Frank Herbert");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1965");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.count().unwrap(), 2);
        assert_eq!(app.table.current_book().unwrap().title, "Dune");
        assert_eq!(status_text(&app), "Added \"Dune\" as book 2.");
    }

    #[test]
    fn add_form_closes_even_when_refresh_fails() {
        let mut app = app_with(&[]);
        // Route reads of `books` through a view that errors once a row exists,
        // while inserts still reach the real table.
        app.store
            .connection()
            .execute_batch(
                "CREATE TEMP VIEW books AS
                     SELECT id, title, author, year FROM main.books
                     WHERE json(title) IS NOT NULL;
                 CREATE TEMP TRIGGER books_insert INSTEAD OF INSERT ON books
                 BEGIN
                     INSERT INTO main.books (title, author, year)
                     VALUES (NEW.title, NEW.author, NEW.year);
                 END;",
            )
            .unwrap();

        press(&mut app, KeyCode::Char('+'));
        type_text(&mut app, "Dune");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Frank Herbert");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1965");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert!(status_text(&app).contains("could not be refreshed"));
        assert!(matches!(
            app.status.as_ref().map(|status| &status.kind),
            Some(StatusKind::Error)
        ));

        // A second Enter must not save the same book twice.
        let _ = app.handle_key(KeyCode::Enter);
        let stored: i64 = app
            .store
            .connection()
            .query_row("SELECT COUNT(*) FROM main.books", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[test]
    fn incomplete_form_stays_open() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Dune");
        press(&mut app, KeyCode::Enter);

        match &app.mode {
            Mode::Adding(form) => {
                assert_eq!(form.error.as_deref(), Some("All fields are required."))
            }
            _ => panic!("form should still be open"),
        }
        assert_eq!(app.store.count().unwrap(), 0);
    }

    #[test]
    fn search_requeries_on_every_keystroke() {
        let mut app = app_with(&[
            ("Dune", "Frank Herbert", "1965"),
            ("1984", "George Orwell", "1949"),
        ]);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "DU");
        assert_eq!(app.table.books.len(), 1);
        assert_eq!(app.table.books[0].title, "Dune");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.table.filter, "DU");

        press(&mut app, KeyCode::Esc);
        assert!(app.table.filter.is_empty());
        assert_eq!(app.table.books.len(), 2);
    }

    #[test]
    fn editing_a_cell_updates_only_that_field() {
        let mut app = app_with(&[("Dune", "Frank Herbert", "1965")]);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        for _ in 0.."Frank Herbert".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "X");
        press(&mut app, KeyCode::Enter);

        let book = app.store.get(1).unwrap().unwrap();
        assert_eq!(book.author, "X");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.year, "1965");
        assert_eq!(app.table.books[0].author, "X");
    }

    #[test]
    fn id_column_is_not_editable() {
        let mut app = app_with(&[("Dune", "Frank Herbert", "1965")]);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        assert!(status_text(&app).contains("cannot be edited"));
    }

    #[test]
    fn blank_cell_edit_is_ignored() {
        let mut app = app_with(&[("Dune", "Frank Herbert", "1965")]);
        press(&mut app, KeyCode::Char('e'));
        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.get(1).unwrap().unwrap().title, "Dune");
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with(&[("Dune", "Frank Herbert", "1965")]);
        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.count().unwrap(), 1);

        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store.count().unwrap(), 0);
        assert!(app.table.books.is_empty());
    }

    #[test]
    fn export_prompt_writes_csv() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("catalog.csv");
        let store = CatalogStore::open_in_memory().unwrap();
        store.create("Dune", "Frank Herbert", "1965").unwrap();
        let mut app = App::new(store, target.clone()).unwrap();

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        let contents = fs::read_to_string(&target).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(status_text(&app).starts_with("Exported 1 books"));
    }

    #[test]
    fn failed_export_keeps_prompt_open() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("catalog.csv");
        let store = CatalogStore::open_in_memory().unwrap();
        let mut app = App::new(store, target).unwrap();

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        match &app.mode {
            Mode::Exporting(prompt) => assert!(prompt.error.is_some()),
            _ => panic!("export prompt should stay open"),
        }
    }

    #[test]
    fn q_quits() {
        let mut app = app_with(&[]);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
