//! Output formatting for quotes and sync state.
//!
//! Supports plain text, JSON, and table output.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{Notification, NotificationKind, Quote, SyncOutcome, SyncState};

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON format for programmatic use.
    Json,
    /// Compact table listing.
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => Err(format!("Unknown format: {s}. Use: text, json, table")),
        }
    }
}

/// Formats a single quote the way the quote display shows it.
pub fn format_quote(quote: &Quote) -> String {
    format!(
        "{} \"{}\"",
        format!("{}:", quote.category).bold(),
        quote.text
    )
}

/// Formats quotes as a numbered text list.
pub fn format_quotes_text(quotes: &[&Quote]) -> String {
    if quotes.is_empty() {
        return "No quotes in this category.".dimmed().to_string();
    }

    quotes
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{:3}. {}", i + 1, format_quote(q)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats quotes as pretty JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_quotes_json(quotes: &[&Quote]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quotes)
}

/// Formats a table listing of quotes.
pub fn format_quotes_table(quotes: &[&Quote]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Category", "Quote"]);

    for (i, quote) in quotes.iter().enumerate() {
        table.add_row(vec![
            &(i + 1).to_string(),
            &quote.category,
            &truncate(&quote.text, 60),
        ]);
    }

    table.to_string()
}

/// Formats a sync notification for the terminal.
pub fn format_notification(notification: &Notification) -> String {
    match notification.kind {
        NotificationKind::Merged => format!("{} {}", "✓".green().bold(), notification.message),
        NotificationKind::Failed => format!("{} {}", "✗".red().bold(), notification.message),
    }
}

/// One-line summary of a sync outcome.
pub fn format_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Skipped => "Sync already in progress".yellow().to_string(),
        SyncOutcome::Unchanged => "Already up to date".green().to_string(),
        SyncOutcome::Merged { added } => format!("Merged {} new quote(s)", added.to_string().cyan()),
        SyncOutcome::Failed { message } => format!("{} {message}", "Sync failed:".red()),
    }
}

/// Formats sync state for display.
pub fn format_sync_state(state: &SyncState, quote_count: usize) -> String {
    let last_sync = state.last_sync.map_or_else(
        || "never".dimmed().to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    let mut out = format!(
        "{}\n  Last sync: {}\n  Last merge added: {}\n  Local quotes: {}",
        "🔄 Sync status".bold(),
        last_sync,
        state.last_merged.to_string().cyan(),
        quote_count.to_string().cyan(),
    );

    if let Some(ref err) = state.last_error {
        out.push_str(&format!("\n  Last error: {}", err.red()));
    }

    out
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
