//! Core library surface for the book catalog.
//!
//! `CatalogStore` is the only way to reach the `books` table; the terminal UI
//! and the command-line subcommands in `main.rs` both go through it.
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod ui;

/// The persistence handle and its error type.
pub use db::CatalogStore;
pub use error::{CatalogError, Result};

pub use models::{Book, BookField};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
