//! Infrastructure layer - external adapters (storage, network, config files).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod kv_store;
pub mod remote;

pub use config::{ensure_config_exists, load_config};
#[cfg(test)]
pub use kv_store::MemoryKvStore;
pub use kv_store::{KeyValueStore, SqliteKvStore, SESSION_SCOPE};
pub use remote::{HttpRemote, RemoteSource};
