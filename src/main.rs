//! Quote Sync - a local quote collection reconciled with a remote source.
//!
//! Quotes live in a small `SQLite` key-value store. A sync pulls the remote
//! list and replaces local quotes with it (remote wins).
//!
//!   quote-sync show                    # Random quote from the current filter
//!   quote-sync add "text" Category     # Add a quote (--push to post it)
//!   quote-sync filter Programming      # Select a category
//!   quote-sync export -o quotes.json   # Save all quotes
//!   quote-sync daemon                  # Sync every 30 seconds

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    export_to_file, format_categories, format_outcome, format_quote, format_quotes_json,
    format_quotes_table, format_quotes_text, import_from_file, OutputFormat, QuoteStore,
    SyncCoordinator,
};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError, QuoteRecord, SYNC_INTERVAL_SECS};
use infrastructure::{ensure_config_exists, load_config, HttpRemote, SqliteKvStore, SESSION_SCOPE};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|e| AppError::Config { message: e })?;

    let config_path = cli.config.clone();
    let config = load_config(config_path.as_deref())?;

    match cli.command {
        Commands::Init => cmd_init(config_path)?,
        Commands::Paths => cmd_paths(&config, config_path),
        Commands::Show { resume } => cmd_show(&open_store(&config)?, resume, format)?,
        Commands::Add {
            text,
            category,
            push,
        } => {
            let mut store = open_store(&config)?;
            cmd_add(&config, &mut store, &text, &category, push).await?;
        }
        Commands::List { category } => {
            cmd_list(&open_store(&config)?, category.as_deref(), format)?;
        }
        Commands::Categories => cmd_categories(&open_store(&config)?, format)?,
        Commands::Filter { category } => {
            cmd_filter(&mut open_store(&config)?, category.as_deref())?;
        }
        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| config.export_path());
            let count = export_to_file(&open_store(&config)?, &path)?;
            println!(
                "{} Exported {} quotes to {}",
                "✓".green().bold(),
                count,
                path.display()
            );
        }
        Commands::Import { file } => {
            let count = import_from_file(&mut open_store(&config)?, &file)?;
            println!("{} Quotes imported successfully! ({count})", "✓".green().bold());
        }
        Commands::Sync => cmd_sync(&config, &mut open_store(&config)?).await?,
        Commands::Daemon => cmd_daemon(&config, open_store(&config)?).await?,
    }

    Ok(())
}

/// Open the storage database and load quotes from it.
fn open_store(config: &AppConfig) -> domain::Result<QuoteStore> {
    let local = SqliteKvStore::open(&config.storage_db_path())?;
    let session = local.scoped(SESSION_SCOPE);
    Ok(QuoteStore::open(Arc::new(local), Arc::new(session)))
}

/// Show a random quote, or the last viewed one.
fn cmd_show(store: &QuoteStore, resume: bool, format: OutputFormat) -> domain::Result<()> {
    let quote = if resume {
        match store.last_viewed() {
            Some(quote) => quote,
            None => {
                println!("No quote viewed yet. Run 'quote-sync show' first.");
                return Ok(());
            }
        }
    } else {
        store.show_random(&mut rand::thread_rng())?
    };

    print_quotes(&[&quote], format)
}

/// Add a quote, optionally posting it to the remote.
async fn cmd_add(
    config: &AppConfig,
    store: &mut QuoteStore,
    text: &str,
    category: &str,
    push: bool,
) -> domain::Result<()> {
    let quote = store.add(text, category)?;
    println!("{} Added quote #{}", "✓".green().bold(), quote.id);
    println!("{}", format_quote(&quote));

    if push {
        let coordinator = SyncCoordinator::new(HttpRemote::new(&config.remote)?);
        if coordinator.push(&quote).await {
            println!("{} Quote posted to server", "✓".green());
        } else {
            println!("{} Could not post quote to server", "!".yellow().bold());
        }
    }

    Ok(())
}

/// List quotes in a category (current filter by default).
fn cmd_list(store: &QuoteStore, category: Option<&str>, format: OutputFormat) -> domain::Result<()> {
    let category = category.unwrap_or_else(|| store.index().current_filter());
    if !store.index().contains(category) {
        return Err(AppError::validation(format!("Unknown category: {category}")));
    }

    let quotes = store.repository().by_category(category);
    if quotes.is_empty() {
        println!("No quotes in category: {category}");
        return Ok(());
    }

    print_quotes(&quotes, format)
}

fn cmd_categories(store: &QuoteStore, format: OutputFormat) -> domain::Result<()> {
    let categories = store.index().categories();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&categories).map_err(AppError::json_parse)?;
            println!("{json}");
        }
        OutputFormat::Text | OutputFormat::Table => {
            println!(
                "{}",
                format_categories(&categories, store.index().current_filter())
            );
        }
    }

    Ok(())
}

/// Print or change the category filter.
fn cmd_filter(store: &mut QuoteStore, category: Option<&str>) -> domain::Result<()> {
    if let Some(name) = category {
        store.set_filter(name)?;
    }

    let current = store.index().current_filter();
    println!(
        "Filter: {} ({} quotes)",
        current.cyan().bold(),
        store.filtered().len()
    );

    Ok(())
}

/// One-shot sync.
async fn cmd_sync(config: &AppConfig, store: &mut QuoteStore) -> domain::Result<()> {
    ensure_remote_enabled(config)?;

    let mut coordinator = SyncCoordinator::new(HttpRemote::new(&config.remote)?);
    let outcome = coordinator.sync(store).await;
    println!("{}", format_outcome(&outcome));

    Ok(())
}

/// Sync on startup and then every `SYNC_INTERVAL_SECS` until Ctrl-C.
async fn cmd_daemon(config: &AppConfig, mut store: QuoteStore) -> domain::Result<()> {
    ensure_remote_enabled(config)?;

    let remote = HttpRemote::new(&config.remote)?;
    tracing::info!(url = remote.url(), interval_secs = SYNC_INTERVAL_SECS, "Sync daemon started");

    let mut coordinator = SyncCoordinator::new(remote);

    // Status reporter: prints each outcome once
    let mut outcomes = coordinator.subscribe();
    let reporter = tokio::spawn(async move {
        loop {
            match outcomes.recv().await {
                Ok(outcome) => println!("{}", format_outcome(&outcome)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Status reporter fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut interval = tokio::time::interval(Duration::from_secs(SYNC_INTERVAL_SECS));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down sync daemon");
                break;
            }
        }

        // Pick up writes from other processes before the remote replaces them
        store.reload();

        // Local state is only replaced after the fetch completes, so dropping
        // the sync here leaves storage untouched.
        tokio::select! {
            _ = coordinator.sync(&mut store) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Sync interrupted, shutting down sync daemon");
                break;
            }
        }
    }

    if let Some(last) = coordinator.last_outcome() {
        tracing::info!(
            succeeded = last.succeeded,
            at = %last.timestamp,
            "Last sync before shutdown"
        );
    }

    drop(coordinator);
    if let Err(e) = reporter.await {
        tracing::debug!(error = %e, "Status reporter ended abnormally");
    }

    Ok(())
}

fn ensure_remote_enabled(config: &AppConfig) -> domain::Result<()> {
    if config.remote.enabled {
        Ok(())
    } else {
        Err(AppError::Config {
            message: "Remote sync is disabled ([remote] enabled = false)".into(),
        })
    }
}

/// Write the default configuration file.
fn cmd_init(config_path: Option<PathBuf>) -> domain::Result<()> {
    let path = config_path.unwrap_or_else(AppConfig::default_config_path);

    if ensure_config_exists(&path)? {
        println!("{} Created {}", "✓".green().bold(), path.display());
    } else {
        println!("Configuration already exists: {}", path.display());
    }

    Ok(())
}

/// Show configuration and storage paths.
fn cmd_paths(config: &AppConfig, config_path: Option<PathBuf>) {
    let config_path = config_path.unwrap_or_else(AppConfig::default_config_path);

    println!("{}", "📂 Quote Sync Paths".bold());
    println!();
    print_path("config", &config_path);
    print_path("data", &config.data_dir());
    print_path("storage", &config.storage_db_path());
    print_path("export", &config.export_path());
    println!();
    println!("Remote: {}", config.remote.url);
}

fn print_path(label: &str, path: &Path) {
    let marker = if path.exists() {
        "✓".green()
    } else {
        "-".dimmed()
    };
    println!("  {marker} {:<8} {}", label, path.display());
}

fn print_quotes(quotes: &[&QuoteRecord], format: OutputFormat) -> domain::Result<()> {
    let output = match format {
        OutputFormat::Text => format_quotes_text(quotes),
        OutputFormat::Json => format_quotes_json(quotes).map_err(AppError::json_parse)?,
        OutputFormat::Table => format_quotes_table(quotes),
    };

    println!("{output}");
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
