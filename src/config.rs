//! Command-line configuration. Everything the binary needs to know before the
//! store opens lives here so `main.rs` reads as a straight pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use directories::{ProjectDirs, UserDirs};

use crate::db::DEFAULT_DB_PATH;

/// File name offered for CSV exports.
pub const DEFAULT_EXPORT_NAME: &str = "books.csv";
/// Log file name used when `--log-file` is not given.
const LOG_FILE_NAME: &str = "book-catalog.log";

#[derive(Debug, Parser)]
#[command(name = "book-catalog", version, about = "Personal book catalog")]
pub struct Cli {
    /// SQLite database holding the catalog.
    #[arg(long, env = "BOOK_CATALOG_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Where the interactive UI writes its log. Subcommands log to stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the catalog as a table.
    List {
        /// Only show books whose title contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a book and print its id.
    Add {
        title: String,
        author: String,
        year: String,
    },
    /// Write the catalog to a CSV file.
    Export { path: PathBuf },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Resolve the log destination for the interactive UI: the explicit flag,
    /// then the platform data directory, then the working directory.
    pub fn resolved_log_file(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        ProjectDirs::from("", "", "book-catalog")
            .map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
    }
}

/// Destination pre-filled in the export prompt.
pub fn default_export_path() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|dir| dir.join(DEFAULT_EXPORT_NAME)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME))
}
