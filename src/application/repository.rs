//! Quote repository.
//!
//! Owns the ordered list of quotes and writes it back to storage after
//! every mutation. Reads fail open: unusable persisted data falls back to
//! the built-in quotes.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    default_quotes, next_id_after, resolve_ids, AppError, QuoteRecord, Result, StoredQuote,
};
use crate::infrastructure::KeyValueStore;

/// Storage key holding the serialized quote list.
pub const QUOTES_KEY: &str = "quotes";

/// In-memory quote list mirrored to a key-value store.
pub struct QuoteRepository {
    storage: Arc<dyn KeyValueStore>,
    quotes: Vec<QuoteRecord>,
}

impl QuoteRepository {
    /// Load the repository from storage, seeding defaults if nothing usable is stored.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let quotes = read_quotes(storage.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring stored quotes");
            None
        });

        let quotes = quotes.unwrap_or_else(|| {
            tracing::debug!("Seeding default quotes");
            default_quotes()
        });

        Self { storage, quotes }
    }

    /// Re-read state from storage, discarding in-memory state.
    pub fn reload(&mut self) {
        *self = Self::load(Arc::clone(&self.storage));
    }

    /// All quotes in insertion order.
    #[must_use]
    pub fn all(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    /// Quotes in `category` ("all" matches every quote), original order kept.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&QuoteRecord> {
        self.quotes.iter().filter(|q| q.matches(category)).collect()
    }

    /// Look up a quote by id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&QuoteRecord> {
        self.quotes.iter().find(|q| q.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Largest id in use, 0 when empty.
    #[must_use]
    pub fn max_id(&self) -> i64 {
        self.quotes.iter().map(|q| q.id).max().unwrap_or(0)
    }

    /// Add a quote after validation.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if text or category is blank, or if no id
    /// is left above the current maximum; nothing changes.
    pub fn add(&mut self, text: &str, category: &str) -> Result<QuoteRecord> {
        let id = next_id_after(self.max_id())?.max(Utc::now().timestamp_millis());
        let quote = QuoteRecord::new(id, text, category)?;

        self.quotes.push(quote.clone());
        self.save();

        tracing::info!(id, category = %quote.category, "Added quote");
        Ok(quote)
    }

    /// Discard current state and install `quotes` (remote wins).
    pub fn replace_all(&mut self, quotes: Vec<QuoteRecord>) {
        let dropped = self.quotes.len();
        self.quotes = quotes;
        self.save();

        tracing::debug!(dropped, installed = self.quotes.len(), "Replaced all quotes");
    }

    /// Append `quotes` as-is. Duplicates by id or content are kept.
    pub fn import_many(&mut self, quotes: Vec<QuoteRecord>) {
        let count = quotes.len();
        self.quotes.extend(quotes);
        self.save();

        tracing::info!(count, total = self.quotes.len(), "Imported quotes");
    }

    /// Persist current state. Failures are logged, never returned.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            tracing::warn!(error = %e, "Failed to persist quotes");
        }
    }

    fn try_save(&self) -> Result<()> {
        let stored: Vec<StoredQuote> = self.quotes.iter().cloned().map(Into::into).collect();
        let json = serde_json::to_string(&stored).map_err(AppError::json_parse)?;
        self.storage.set(QUOTES_KEY, &json)
    }
}

/// Read and decode the stored list. `Ok(None)` means nothing is stored.
fn read_quotes(storage: &dyn KeyValueStore) -> Result<Option<Vec<QuoteRecord>>> {
    let Some(json) = storage.get(QUOTES_KEY)? else {
        return Ok(None);
    };

    let invalid = |message: String| AppError::PersistenceRead {
        key: QUOTES_KEY.to_string(),
        message,
    };

    let stored: Vec<StoredQuote> = serde_json::from_str(&json).map_err(|e| invalid(e.to_string()))?;
    let quotes = resolve_ids(stored, 0).map_err(|e| invalid(e.to_string()))?;

    Ok(Some(quotes))
}
