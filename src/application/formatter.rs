//! Output formatting for quotes and sync status.
//!
//! Supports multiple output formats: plain text, JSON, and table view.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{QuoteRecord, SyncOutcome};

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

/// Formats one quote the way it is displayed after `show`.
pub fn format_quote(quote: &QuoteRecord) -> String {
    format!(
        "\"{}\"\n  {} {}",
        quote.text.bold(),
        "Category:".dimmed(),
        quote.category.cyan()
    )
}

/// Formats quotes one per paragraph.
pub fn format_quotes_text(quotes: &[&QuoteRecord]) -> String {
    quotes
        .iter()
        .map(|q| format_quote(q))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Formats quotes as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_quotes_json(quotes: &[&QuoteRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quotes)
}

/// Formats a table listing of quotes.
pub fn format_quotes_table(quotes: &[&QuoteRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Category", "Quote"]);

    for quote in quotes {
        table.add_row(vec![
            quote.id.to_string(),
            quote.category.clone(),
            truncate(&quote.text, 60),
        ]);
    }

    table.to_string()
}

/// Formats category options, marking the selected one.
pub fn format_categories(categories: &[&str], selected: &str) -> String {
    categories
        .iter()
        .map(|c| {
            if *c == selected {
                format!("{} {}", "●".green(), c.green().bold())
            } else {
                format!("  {c}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a sync outcome as a one-line status message.
pub fn format_outcome(outcome: &SyncOutcome) -> String {
    if outcome.succeeded {
        format!("{} {}", "✓".green().bold(), outcome.status_message())
    } else {
        format!("{} {}", "✗".red().bold(), outcome.status_message())
    }
}

/// Truncates a string to max length (in chars) with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
