//! quote-sync - Keep a list of quotes locally and sync it with a remote server.
//!
//! Quotes live in a local `SQLite` key-value store. A sync fetches the remote
//! quote set, appends anything new, and posts the merged list back.
//!
//! QUICK START:
//!   quote-sync show                       # Random quote from the saved filter
//!   quote-sync add "Stay hungry" -C Life  # Add a quote
//!   quote-sync filter Motivation          # Only show one category
//!   quote-sync sync                       # Sync once
//!   quote-sync watch                      # Sync every 30 seconds

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_notification, format_outcome, format_quote, format_quotes_json, format_quotes_table,
    format_quotes_text, format_sync_state, OutputFormat, QuoteStore, SyncEngine,
};
use cli::{Cli, Commands};
use application::quote_store::SharedStore;
use domain::{AppConfig, AppError, CategoryFilter, Notification, NotificationKind, Quote};
use infrastructure::{
    config_file_path, ensure_config_exists, load_config, HttpRemoteMirror, LocalStorage,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli
        .output_format()
        .map_err(|message| AppError::Config { message })?;

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Show { category } => {
            cmd_show(open_store(&config)?, category.as_deref(), format)?;
        }
        Commands::List { category } => {
            cmd_list(&open_store(&config)?, category.as_deref(), format)?;
        }
        Commands::Add { text, category } => {
            cmd_add(open_store(&config)?, &Quote::new(text, category))?;
        }
        Commands::Categories => {
            cmd_categories(&open_store(&config)?, format)?;
        }
        Commands::Filter { category } => {
            cmd_filter(&open_store(&config)?, &category)?;
        }
        Commands::Sync => {
            cmd_sync(open_store(&config)?, &config).await?;
        }
        Commands::Watch { interval } => {
            cmd_watch(open_store(&config)?, &config, interval).await?;
        }
        Commands::Export { output } => {
            cmd_export(&open_store(&config)?, output.as_deref())?;
        }
        Commands::Import { file } => {
            cmd_import(open_store(&config)?, &file)?;
        }
        Commands::Status => {
            cmd_status(&open_store(&config)?, format)?;
        }
        Commands::Config { init } => {
            let path = cli.config.unwrap_or_else(config_file_path);
            cmd_config(&path, &config, init)?;
        }
    }

    Ok(())
}

/// Open storage and load the quote collection.
fn open_store(config: &AppConfig) -> anyhow::Result<QuoteStore> {
    let db_path = config.storage_db_path();
    let storage = LocalStorage::open(&db_path)
        .with_context(|| format!("Failed to open quote storage at {}", db_path.display()))?;
    Ok(QuoteStore::open(storage)?)
}

/// Explicit category wins over the saved filter.
fn resolve_filter(store: &QuoteStore, category: Option<&str>) -> CategoryFilter {
    category.map_or_else(
        || store.selected_filter(),
        |c| c.parse::<CategoryFilter>().unwrap_or_default(),
    )
}

/// Show a random quote.
fn cmd_show(
    mut store: QuoteStore,
    category: Option<&str>,
    format: OutputFormat,
) -> domain::Result<()> {
    let filter = resolve_filter(&store, category);

    let Some(quote) = store.random_quote(&filter) else {
        println!("No quotes available in category '{filter}'.");
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&quote).map_err(AppError::json_parse)?
            );
        }
        OutputFormat::Text | OutputFormat::Table => println!("{}", format_quote(&quote)),
    }

    Ok(())
}

/// List quotes passing the filter.
fn cmd_list(store: &QuoteStore, category: Option<&str>, format: OutputFormat) -> domain::Result<()> {
    let filter = resolve_filter(store, category);
    let quotes = store.filtered(&filter);

    let output = match format {
        OutputFormat::Text => format_quotes_text(&quotes),
        OutputFormat::Json => format_quotes_json(&quotes).map_err(AppError::json_parse)?,
        OutputFormat::Table => format_quotes_table(&quotes),
    };

    println!("{output}");
    Ok(())
}

/// Add a quote.
fn cmd_add(mut store: QuoteStore, quote: &Quote) -> domain::Result<()> {
    store.add_quote(quote)?;
    println!("{} Quote added successfully!", "✓".green().bold());
    Ok(())
}

/// List categories, marking the saved filter.
fn cmd_categories(store: &QuoteStore, format: OutputFormat) -> domain::Result<()> {
    let categories = store.categories();

    if matches!(format, OutputFormat::Json) {
        println!(
            "{}",
            serde_json::to_string_pretty(&categories).map_err(AppError::json_parse)?
        );
        return Ok(());
    }

    let selected = store.selected_filter();
    let all_marker = if selected == CategoryFilter::All { "*" } else { " " };
    println!("{all_marker} {}", "all".dimmed());

    for category in categories {
        let marker = if selected == CategoryFilter::Category(category.to_string()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {category}");
    }

    Ok(())
}

/// Persist the category filter.
fn cmd_filter(store: &QuoteStore, category: &str) -> domain::Result<()> {
    let filter = category.parse::<CategoryFilter>().unwrap_or_default();

    if let CategoryFilter::Category(ref name) = filter {
        if !store.categories().contains(&name.as_str()) {
            tracing::warn!(category = %name, "No quotes in this category yet");
        }
    }

    store.set_selected_filter(&filter)?;
    println!("{} Filter set to '{}'", "✓".green().bold(), filter);
    Ok(())
}

/// Build a sync engine over the HTTP remote.
async fn build_engine(
    store: QuoteStore,
    config: &AppConfig,
) -> domain::Result<(SyncEngine, mpsc::UnboundedReceiver<Notification>, SharedStore)> {
    let remote = HttpRemoteMirror::new(config.remote.clone(), config.request_timeout())?;
    let (tx, rx) = mpsc::unbounded_channel();
    let store = store.into_shared();
    let engine = SyncEngine::new(Arc::clone(&store), Arc::new(remote), tx).await?;
    Ok((engine, rx, store))
}

/// Sync once.
async fn cmd_sync(store: QuoteStore, config: &AppConfig) -> domain::Result<()> {
    let (engine, mut notifications, _store) = build_engine(store, config).await?;

    let outcome = engine.run_sync().await;
    let state = engine.state().await;
    tracing::info!(last_sync = ?state.last_sync, quotes = state.quote_count, "Sync state");

    while let Ok(notification) = notifications.try_recv() {
        println!("{}", format_notification(&notification));
    }
    println!("{}", format_outcome(&outcome));

    Ok(())
}

/// Sync periodically until Ctrl-C.
async fn cmd_watch(
    store: QuoteStore,
    config: &AppConfig,
    interval: Option<u64>,
) -> domain::Result<()> {
    if !config.sync.enabled {
        return Err(AppError::Config {
            message: "Periodic sync is disabled (sync.enabled = false)".into(),
        });
    }

    let period = interval.map_or_else(|| config.sync_interval(), Duration::from_secs);
    let (engine, mut notifications, store) = build_engine(store, config).await?;

    // Refresh the displayed quote whenever a sync brings in new content.
    let display = Arc::clone(&store);
    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            println!("{}", format_notification(&notification));
            if notification.kind == NotificationKind::Merged {
                let mut store = display.lock().await;
                let filter = store.selected_filter();
                if let Some(quote) = store.random_quote(&filter) {
                    println!("{}", format_quote(&quote));
                }
            }
        }
    });

    println!(
        "🔄 Syncing every {}s. Press Ctrl-C to stop.",
        period.as_secs().to_string().cyan()
    );

    Arc::new(engine)
        .run_periodic(period, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await;

    printer.abort();

    if let Some(quote) = store.lock().await.last_quote() {
        println!("{} {}", "Last quote:".dimmed(), format_quote(quote));
    }
    Ok(())
}

/// Export quotes as JSON.
fn cmd_export(store: &QuoteStore, output: Option<&Path>) -> domain::Result<()> {
    let json = store.export_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;
            println!(
                "{} Exported {} quotes to {}",
                "✓".green().bold(),
                store.quotes().len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Import quotes from a JSON file.
fn cmd_import(mut store: QuoteStore, file: &Path) -> domain::Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| AppError::io(format!("Failed to read {}", file.display()), e))?;

    let summary = store.import_json(&content)?;

    println!(
        "{} Imported {} quotes",
        "✓".green().bold(),
        summary.imported.to_string().cyan()
    );
    if summary.skipped > 0 {
        println!(
            "{} Skipped {} entries with empty text or category",
            "!".yellow().bold(),
            summary.skipped
        );
    }

    Ok(())
}

/// Show sync status.
fn cmd_status(store: &QuoteStore, format: OutputFormat) -> domain::Result<()> {
    let state = store.storage().get_sync_state()?;

    if matches!(format, OutputFormat::Json) {
        println!(
            "{}",
            serde_json::to_string_pretty(&state).map_err(AppError::json_parse)?
        );
    } else {
        println!("{}", format_sync_state(&state, store.quotes().len()));
    }

    Ok(())
}

/// Show or create the configuration file.
fn cmd_config(path: &Path, config: &AppConfig, init: bool) -> domain::Result<()> {
    if init {
        if ensure_config_exists(path)? {
            println!("{} Created {}", "✓".green().bold(), path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
        return Ok(());
    }

    let effective = toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })?;

    println!("{} {}", "📄 Config file:".bold(), path.display());
    println!();
    println!("{effective}");

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
