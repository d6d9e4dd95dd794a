//! Command-line front end for the quote book.
//!
//! # Responsibility
//! - Parse arguments, open the store, and dispatch to `QuoteService`.
//! - Print user-facing status lines; diagnostics go to the log file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use quotesync_core::db::open_db;
use quotesync_core::{
    default_log_level, init_logging, JsonFileRemoteSource, Quote, QuoteService, SqliteQuoteStore,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quotesync", version, about = "Quote book with server-wins sync")]
struct Args {
    /// SQLite database holding the quote book.
    #[arg(long, default_value = "quotesync.sqlite3", global = true)]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error); needs `--log-dir`.
    #[arg(long, global = true, requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill an empty quote book with the starter quotes.
    Init,
    /// Add a new local quote.
    Add {
        text: String,
        #[arg(long, short)]
        category: String,
    },
    /// List quotes, optionally filtered by category.
    List {
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Show a random quote.
    Random {
        #[arg(long, short)]
        category: Option<String>,
    },
    /// List known categories.
    Categories,
    /// Show the last quote displayed by `random`.
    Last,
    /// Export all quotes as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import quotes from a JSON file.
    Import { file: PathBuf },
    /// Run one sync cycle against a remote snapshot file.
    Sync {
        #[arg(long)]
        remote: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&args.db)
        .with_context(|| format!("failed to open database `{}`", args.db.display()))?;
    let store = SqliteQuoteStore::try_new(&conn)?;
    let mut service = QuoteService::new(store);

    info!(
        "event=cli_command module=cli status=start command={} db={}",
        args.command.name(),
        args.db.display()
    );

    match args.command {
        Commands::Init => match service.seed_defaults()? {
            0 => println!("Quote book already has quotes; nothing seeded."),
            added => println!("Seeded {added} starter quote(s)."),
        },
        Commands::Add { text, category } => {
            let quote = service.add_quote(text, category)?;
            println!("Added {}", quote.id);
        }
        Commands::List { category } => {
            for quote in service.list_quotes(category.as_deref())? {
                print_quote(&quote);
            }
        }
        Commands::Random { category } => {
            let quote = service.random_quote(category.as_deref(), &mut rand::thread_rng())?;
            print_quote(&quote);
        }
        Commands::Categories => {
            for category in service.categories()? {
                println!("{category}");
            }
        }
        Commands::Last => match service.last_viewed()? {
            Some(quote) => print_quote(&quote),
            None => println!("No quote viewed yet."),
        },
        Commands::Export { output } => {
            let json = service.export_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("failed to write `{}`", path.display()))?,
                None => println!("{json}"),
            }
        }
        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read `{}`", file.display()))?;
            let summary = service.import_json(&raw)?;
            println!(
                "Imported {} quote(s), skipped {}.",
                summary.added, summary.skipped
            );
        }
        Commands::Sync { remote } => {
            let source = JsonFileRemoteSource::new(remote);
            info!(
                "event=cli_sync module=cli status=start remote={}",
                source.path().display()
            );
            let report = service.sync(&source)?;
            for conflict in &report.conflicts {
                println!("conflict: {conflict}");
            }
            println!("{}", report.status_message());
        }
    }

    Ok(())
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Add { .. } => "add",
            Self::List { .. } => "list",
            Self::Random { .. } => "random",
            Self::Categories => "categories",
            Self::Last => "last",
            Self::Export { .. } => "export",
            Self::Import { .. } => "import",
            Self::Sync { .. } => "sync",
        }
    }
}

fn print_quote(quote: &Quote) {
    let marker = if quote.dirty { "*" } else { " " };
    println!("{marker} \u{201c}{}\u{201d} [{}] ({})", quote.text, quote.category, quote.id);
}
