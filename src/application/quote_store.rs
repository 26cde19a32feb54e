//! Owning context for quotes and the category filter.
//!
//! Every mutation goes through here so the category index is recomputed
//! right after the repository changes.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{AppError, QuoteRecord, Result};
use crate::infrastructure::KeyValueStore;

use super::category_index::CategoryIndex;
use super::repository::QuoteRepository;

/// Session storage key for the last displayed quote.
pub const LAST_VIEWED_KEY: &str = "lastViewedQuote";

/// Quotes, their category index, and transient display state.
pub struct QuoteStore {
    repository: QuoteRepository,
    index: CategoryIndex,
    session: Arc<dyn KeyValueStore>,
}

impl QuoteStore {
    /// Load quotes and filter from `local`; display state lives in `session`.
    #[must_use]
    pub fn open(local: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        let repository = QuoteRepository::load(Arc::clone(&local));
        let index = CategoryIndex::load(local, repository.all());

        Self {
            repository,
            index,
            session,
        }
    }

    /// Re-read quotes and filter from storage.
    pub fn reload(&mut self) {
        self.repository.reload();
        self.index.refresh(self.repository.all());
    }

    #[must_use]
    pub const fn repository(&self) -> &QuoteRepository {
        &self.repository
    }

    #[must_use]
    pub const fn index(&self) -> &CategoryIndex {
        &self.index
    }

    /// Add a quote and refresh categories.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if text or category is blank.
    pub fn add(&mut self, text: &str, category: &str) -> Result<QuoteRecord> {
        let quote = self.repository.add(text, category)?;
        self.index.refresh(self.repository.all());
        Ok(quote)
    }

    /// Replace every quote (remote wins) and refresh categories.
    pub fn replace_all(&mut self, quotes: Vec<QuoteRecord>) {
        self.repository.replace_all(quotes);
        self.index.refresh(self.repository.all());
    }

    /// Append quotes and refresh categories.
    pub fn import_many(&mut self, quotes: Vec<QuoteRecord>) {
        self.repository.import_many(quotes);
        self.index.refresh(self.repository.all());
    }

    /// Select a category filter.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for an unknown category.
    pub fn set_filter(&mut self, name: &str) -> Result<()> {
        self.index.set_filter(name)
    }

    /// Quotes matching the current filter.
    #[must_use]
    pub fn filtered(&self) -> Vec<&QuoteRecord> {
        self.repository.by_category(self.index.current_filter())
    }

    /// Pick a random quote under the current filter and remember it as last viewed.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if no quote matches the filter.
    pub fn show_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<QuoteRecord> {
        let quote = self
            .filtered()
            .choose(rng)
            .map(|q| (*q).clone())
            .ok_or_else(|| {
                AppError::validation(format!(
                    "No quotes available in category: {}",
                    self.index.current_filter()
                ))
            })?;

        self.remember_viewed(&quote);
        Ok(quote)
    }

    fn remember_viewed(&self, quote: &QuoteRecord) {
        let result = serde_json::to_string(quote)
            .map_err(AppError::json_parse)
            .and_then(|json| self.session.set(LAST_VIEWED_KEY, &json));

        if let Err(e) = result {
            tracing::debug!(error = %e, "Could not remember last viewed quote");
        }
    }

    /// The last displayed quote, if one was recorded and is still readable.
    ///
    /// An unreadable entry is cleared so later lookups start clean.
    #[must_use]
    pub fn last_viewed(&self) -> Option<QuoteRecord> {
        let json = self.session.get(LAST_VIEWED_KEY).ok().flatten()?;
        match serde_json::from_str(&json) {
            Ok(quote) => Some(quote),
            Err(e) => {
                tracing::debug!(error = %e, "Clearing unreadable last viewed quote");
                if let Err(e) = self.session.remove(LAST_VIEWED_KEY) {
                    tracing::debug!(error = %e, "Could not clear last viewed quote");
                }
                None
            }
        }
    }
}
