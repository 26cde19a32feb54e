//! Category index and filter selection.
//!
//! Derives the distinct categories from the repository and keeps the active
//! filter valid: a selection whose category disappeared falls back to "all".

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{AppError, QuoteRecord, Result, ALL_CATEGORIES};
use crate::infrastructure::KeyValueStore;

/// Storage key holding the selected filter.
pub const FILTER_KEY: &str = "selectedCategory";

/// Distinct categories in first-seen order.
///
/// A category literally named "all" is left out since the filter already offers it.
#[must_use]
pub fn distinct_categories(quotes: &[QuoteRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    quotes
        .iter()
        .map(|q| q.category.as_str())
        .filter(|c| *c != ALL_CATEGORIES && seen.insert(*c))
        .map(str::to_string)
        .collect()
}

/// Read-only view of the repository's categories plus the persisted filter.
pub struct CategoryIndex {
    storage: Arc<dyn KeyValueStore>,
    categories: Vec<String>,
    selected: String,
}

impl CategoryIndex {
    /// Build the index and restore the persisted filter.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>, quotes: &[QuoteRecord]) -> Self {
        let selected = read_filter(storage.as_ref()).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Ignoring stored filter");
            ALL_CATEGORIES.to_string()
        });

        let mut index = Self {
            storage,
            categories: Vec::new(),
            selected,
        };
        index.refresh(quotes);
        index
    }

    /// Filter options: "all" followed by each category once.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        std::iter::once(ALL_CATEGORIES)
            .chain(self.categories.iter().map(String::as_str))
            .collect()
    }

    /// Whether `name` is a valid filter value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        name == ALL_CATEGORIES || self.categories.iter().any(|c| c == name)
    }

    #[must_use]
    pub fn current_filter(&self) -> &str {
        &self.selected
    }

    /// Select a filter and persist it.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `name` is neither "all" nor a known category.
    pub fn set_filter(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if !self.contains(name) {
            return Err(AppError::validation(format!("Unknown category: {name}")));
        }

        self.selected = name.to_string();
        self.save();
        tracing::debug!(filter = %self.selected, "Filter selected");
        Ok(())
    }

    /// Recompute categories after the repository changed.
    pub fn refresh(&mut self, quotes: &[QuoteRecord]) {
        self.categories = distinct_categories(quotes);

        if !self.contains(&self.selected) {
            tracing::info!(
                previous = %self.selected,
                "Selected category no longer exists, showing all"
            );
            self.selected = ALL_CATEGORIES.to_string();
            self.save();
        }
    }

    fn save(&self) {
        let result = serde_json::to_string(&self.selected)
            .map_err(AppError::json_parse)
            .and_then(|json| self.storage.set(FILTER_KEY, &json));

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist filter");
        }
    }
}

/// Read the stored filter. Plain unquoted strings from older data are accepted.
fn read_filter(storage: &dyn KeyValueStore) -> Result<String> {
    let raw = storage.get(FILTER_KEY)?;
    let value = raw
        .map(|raw| serde_json::from_str::<String>(&raw).unwrap_or(raw))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    Ok(value.unwrap_or_else(|| ALL_CATEGORIES.to_string()))
}
