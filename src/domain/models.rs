//! Domain models for quote records.
//!
//! `QuoteRecord` is the validated in-memory shape; `StoredQuote` is the
//! looser shape accepted from storage and import files, where older data
//! may lack an `id`.

use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// Filter value that selects every category.
pub const ALL_CATEGORIES: &str = "all";

/// A single quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Unique within the repository once assigned.
    pub id: i64,
    /// Quote text, never empty.
    pub text: String,
    /// Category label, never empty.
    pub category: String,
}

impl QuoteRecord {
    /// Create a record from raw input, trimming both fields.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if text or category is empty after trimming.
    pub fn new(id: i64, text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() || category.is_empty() {
            return Err(AppError::validation(
                "Please enter both a quote and a category.",
            ));
        }

        Ok(Self {
            id,
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Check whether this record belongs to the given filter value.
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        filter == ALL_CATEGORIES || self.category == filter
    }
}

/// Quote as found in storage or import files; `id` is optional for legacy data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub text: String,
    pub category: String,
}

impl From<QuoteRecord> for StoredQuote {
    fn from(record: QuoteRecord) -> Self {
        Self {
            id: Some(record.id),
            text: record.text,
            category: record.category,
        }
    }
}

/// Id that follows `id`.
///
/// # Errors
/// Returns `AppError::Validation` if `id` is already `i64::MAX`.
pub fn next_id_after(id: i64) -> Result<i64> {
    id.checked_add(1)
        .ok_or_else(|| AppError::validation(format!("No quote id available after {id}")))
}

/// Assign ids to stored quotes that lack one.
///
/// Missing ids are numbered sequentially after `floor` and after the largest
/// explicit id in `stored`, in order, so the same input always yields the same ids.
///
/// # Errors
/// Returns `AppError::Validation` if any entry has an empty text or category,
/// or if a missing id would have to be numbered past `i64::MAX`.
pub fn resolve_ids(stored: Vec<StoredQuote>, floor: i64) -> Result<Vec<QuoteRecord>> {
    let mut last_id = stored
        .iter()
        .filter_map(|q| q.id)
        .max()
        .unwrap_or(0)
        .max(floor);

    stored
        .into_iter()
        .map(|q| {
            let id = match q.id {
                Some(id) => id,
                None => {
                    last_id = next_id_after(last_id)?;
                    last_id
                }
            };
            QuoteRecord::new(id, &q.text, &q.category)
        })
        .collect()
}

/// Built-in quotes used when storage holds nothing usable.
#[must_use]
pub fn default_quotes() -> Vec<QuoteRecord> {
    [
        (1, "Success is not final, failure is not fatal.", "Motivation"),
        (
            2,
            "Code is like humor. When you have to explain it, it’s bad.",
            "Programming",
        ),
        (3, "Education is the most powerful weapon.", "Education"),
    ]
    .into_iter()
    .map(|(id, text, category)| QuoteRecord {
        id,
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}
