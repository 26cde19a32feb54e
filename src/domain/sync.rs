//! Sync-related domain models.
//!
//! Contains the remote record shape, the mapping onto local quotes,
//! and the outcome value emitted after each reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::SyncError;
use super::models::QuoteRecord;

/// Seconds between scheduled syncs.
pub const SYNC_INTERVAL_SECS: u64 = 30;

/// Only the first few remote entries are consumed.
pub const REMOTE_FETCH_LIMIT: usize = 5;

/// Category assigned to every record that came from the remote.
pub const SERVER_CATEGORY: &str = "Server";

/// Record shape returned by the remote endpoint. Other fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: i64,
    pub title: String,
}

/// Map remote posts onto local quotes.
///
/// Takes the first `REMOTE_FETCH_LIMIT` posts. Every result is filed under
/// `SERVER_CATEGORY`; whatever category the remote had is discarded.
///
/// # Errors
/// Returns `SyncError::Malformed` if a consumed post has an empty title.
pub fn map_remote_posts(posts: Vec<RemotePost>) -> Result<Vec<QuoteRecord>, SyncError> {
    posts
        .into_iter()
        .take(REMOTE_FETCH_LIMIT)
        .map(|post| {
            QuoteRecord::new(post.id, &post.title, SERVER_CATEGORY)
                .map_err(|_| SyncError::Malformed(format!("post {} has an empty title", post.id)))
        })
        .collect()
}

/// Phase of the sync state machine. Failure returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
}

/// Result of one sync attempt. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub succeeded: bool,
    pub timestamp: DateTime<Utc>,
    /// Records installed by the remote replace (0 on failure).
    pub applied_count: usize,
    /// Failure reason, if any.
    pub error: Option<String>,
}

impl SyncOutcome {
    #[must_use]
    pub fn success(applied_count: usize) -> Self {
        Self {
            succeeded: true,
            timestamp: Utc::now(),
            applied_count,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: &SyncError) -> Self {
        Self {
            succeeded: false,
            timestamp: Utc::now(),
            applied_count: 0,
            error: Some(error.to_string()),
        }
    }

    /// Short status line for the UI.
    #[must_use]
    pub fn status_message(&self) -> String {
        if self.succeeded {
            format!(
                "Quotes synced with server! ({} applied at {})",
                self.applied_count,
                self.timestamp.format("%H:%M:%S")
            )
        } else {
            format!(
                "Sync failed at {}: {}",
                self.timestamp.format("%H:%M:%S"),
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
