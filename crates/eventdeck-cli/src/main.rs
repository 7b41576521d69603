//! eventdeck - browse local cultural events from the terminal.
//!
//! Events come from the bundled dataset or the live listing, are cached for
//! offline use, and can be filtered and starred.

mod app;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Directory for daily log files; unset means stderr only
const ENV_LOG_DIR: &str = "EVENTDECK_LOG_DIR";

#[derive(Parser)]
#[command(name = "eventdeck")]
#[command(about = "Browse, filter and favorite local cultural events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events
    List {
        /// Event type (film, wystawa, spektakl, teatr, koncert, inne)
        #[arg(short = 't', long = "type")]
        event_type: Option<String>,

        /// Date window: today, tomorrow or week
        #[arg(short, long)]
        date: Option<String>,

        /// Text to search for in name, location and type
        #[arg(short, long)]
        query: Option<String>,

        /// Ignore the cache and fetch again
        #[arg(short, long)]
        refresh: bool,
    },
    /// List favorite events
    Favorites,
    /// Add or remove a favorite by event id
    Fav { id: String },
    /// Show events grouped by venue
    Venues,
    /// Inspect or clear the event cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    Status,
    Clear,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(ENV_LOG_DIR) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "eventdeck.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = init_tracing();
    info!("eventdeck starting");

    let mut app = App::new()?;

    match cli.command {
        Commands::List {
            event_type,
            date,
            query,
            refresh,
        } => {
            app.set_filters(event_type.as_deref(), date.as_deref(), query.as_deref());
            app.load(refresh).await;
            app.print_events();
        }
        Commands::Favorites => {
            app.load(false).await;
            app.print_favorites();
        }
        Commands::Fav { id } => {
            app.toggle_favorite(&id);
        }
        Commands::Venues => {
            app.load(false).await;
            app.print_venues();
        }
        Commands::Cache { action } => match action {
            CacheAction::Status => app.print_cache_status(),
            CacheAction::Clear => app.clear_cache(),
        },
    }

    Ok(())
}
