//! Ratatui front-end for the catalog. `app` holds the state machine and
//! drawing, `forms` and `screens` the per-mode state, `terminal` the event
//! loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
