//! Application layer - use cases and orchestration.
//!
//! This layer holds the quote repository, the category index, the owning
//! store that ties them together, and remote reconciliation.

pub mod category_index;
pub mod exchange;
pub mod formatter;
pub mod quote_store;
pub mod repository;
pub mod sync_service;

pub use exchange::{export_to_file, import_from_file};
pub use formatter::{
    format_categories, format_outcome, format_quote, format_quotes_json, format_quotes_table,
    format_quotes_text, OutputFormat,
};
pub use quote_store::QuoteStore;
pub use sync_service::SyncCoordinator;
