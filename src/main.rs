//! Binary entry point. Parse the command line, bring up logging and the
//! SQLite-backed store, then either run one subcommand or hand the store to
//! the Ratatui event loop until the user exits.
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use book_catalog::config::{default_export_path, Cli, Command};
use book_catalog::{logging, run_app, App, Book, BookField, CatalogStore};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => logging::init_file(cli.log_level, &cli.resolved_log_file())?,
        Some(_) => logging::init_stderr(cli.log_level),
    }

    let store = CatalogStore::open(&cli.db)
        .with_context(|| format!("failed to open catalog database {}", cli.db.display()))?;
    info!(db = %cli.db.display(), "catalog ready");

    match cli.command {
        None => {
            let mut app = App::new(store, default_export_path())?;
            run_app(&mut app)
        }
        Some(Command::List { search }) => {
            let books = match search {
                Some(query) => store.search(&query)?,
                None => store.list_all()?,
            };
            print!("{}", render_table(&books));
            Ok(())
        }
        Some(Command::Add {
            title,
            author,
            year,
        }) => {
            let id = store.create(&title, &author, &year)?;
            println!("{id}");
            Ok(())
        }
        Some(Command::Export { path }) => {
            let rows = store.export_to_csv(&path)?;
            println!("Exported {rows} books to {}", path.display());
            Ok(())
        }
    }
}

/// Plain-text table with columns padded to their widest value.
fn render_table(books: &[Book]) -> String {
    let mut widths = BookField::ALL.map(|field| field.header().chars().count());
    for book in books {
        for (width, value) in widths.iter_mut().zip(book.values()) {
            *width = (*width).max(value.chars().count());
        }
    }

    let format_row = |values: [String; 4]| -> String {
        let cells: Vec<String> = values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect();
        format!("{}\n", cells.join("  ").trim_end())
    };

    let mut out = format_row(BookField::ALL.map(|field| field.header().to_string()));
    for book in books {
        out.push_str(&format_row(book.values()));
    }
    out
}
