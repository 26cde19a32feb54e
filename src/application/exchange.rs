//! JSON file export and import.
//!
//! Import parses and validates the whole file before touching the store,
//! so a bad file leaves the repository as it was.

use std::fs;
use std::path::Path;

use crate::domain::{resolve_ids, AppError, QuoteRecord, Result, StoredQuote};

use super::quote_store::QuoteStore;

/// Serialize quotes as a pretty JSON array.
///
/// # Errors
/// Returns error if serialization fails.
pub fn quotes_to_json(quotes: &[QuoteRecord]) -> Result<String> {
    serde_json::to_string_pretty(quotes).map_err(AppError::json_parse)
}

/// Write every quote in the store to `path`.
///
/// # Errors
/// Returns error if the file cannot be written.
pub fn export_to_file(store: &QuoteStore, path: &Path) -> Result<usize> {
    let quotes = store.repository().all();
    let json = quotes_to_json(quotes)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create {}", parent.display()), e))?;
    }

    fs::write(path, json)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

    tracing::info!(path = %path.display(), count = quotes.len(), "Exported quotes");
    Ok(quotes.len())
}

/// Parse an import payload. Entries without `id` get ids above `floor`.
///
/// # Errors
/// Returns `AppError::ImportParse` if the payload is not an array of quotes
/// or any entry has a blank text or category.
pub fn parse_import(json: &str, floor: i64) -> Result<Vec<QuoteRecord>> {
    let stored: Vec<StoredQuote> = serde_json::from_str(json).map_err(AppError::import_parse)?;

    resolve_ids(stored, floor).map_err(|e| AppError::ImportParse {
        message: e.to_string(),
        source: None,
    })
}

/// Append the quotes in `path` to the store.
///
/// # Errors
/// Returns error if the file cannot be read or parsed; the store is unchanged then.
pub fn import_from_file(store: &mut QuoteStore, path: &Path) -> Result<usize> {
    let json = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;

    let quotes = parse_import(&json, store.repository().max_id())?;
    let count = quotes.len();
    store.import_many(quotes);

    Ok(count)
}
