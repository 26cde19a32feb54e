//! Domain layer - core business types.
//!
//! This layer contains pure domain models and error types
//! without any I/O (storage, network, terminal).

pub mod config;
pub mod error;
pub mod models;
pub mod sync;

pub use config::{AppConfig, RemoteConfig};
pub use error::{AppError, Result, SyncError};
pub use models::{
    default_quotes, next_id_after, resolve_ids, QuoteRecord, StoredQuote, ALL_CATEGORIES,
};
pub use sync::{map_remote_posts, RemotePost, SyncOutcome, SyncPhase, SYNC_INTERVAL_SECS};
