use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Build the filter from the CLI level, then layer any `RUST_LOG` directives
/// on top of it.
fn build_filter(level: LogLevel) -> EnvFilter {
    let mut filter = EnvFilter::new(level.to_filter_directive());
    if let Ok(extra) = std::env::var("RUST_LOG") {
        for directive in extra.split(',').filter(|d| !d.trim().is_empty()) {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
    }
    filter
}

/// Log to stderr. Used by the non-interactive subcommands.
pub fn init_stderr(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Log to an append-only file. The interactive UI owns the terminal, so
/// anything written to stderr would tear the alternate screen.
pub fn init_file(level: LogLevel, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
