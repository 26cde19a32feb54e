//! Key-value persistence on `SQLite`.
//!
//! Mirrors browser-style local/session storage: string values under string
//! keys, partitioned by scope, written synchronously, last write wins.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{AppError, Result};

/// Scope for data that survives across runs.
pub const LOCAL_SCOPE: &str = "local";

/// Scope for transient display state.
pub const SESSION_SCOPE: &str = "session";

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, if any.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key` if present.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

/// `SQLite`-backed store bound to one scope.
///
/// Scoped views created with [`SqliteKvStore::scoped`] share the connection.
#[derive(Clone)]
pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
    scope: String,
}

impl SqliteKvStore {
    /// Opens or creates the storage database in the local scope.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;

        // WAL lets the daemon and one-shot commands share the file
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(AppError::database)?;

        Self::init_schema(&conn)?;

        tracing::debug!(path = %path.display(), "Opened quote storage");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            scope: LOCAL_SCOPE.to_string(),
        })
    }

    /// Opens a throwaway in-memory database.
    ///
    /// # Errors
    /// Returns error if schema creation fails.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            scope: LOCAL_SCOPE.to_string(),
        })
    }

    /// Initialize database schema.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
                scope TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (scope, key)
            );
            ",
        )
        .map_err(AppError::database)
    }

    /// View of the same database under another scope.
    #[must_use]
    pub fn scoped(&self, scope: &str) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            scope: scope.to_string(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| AppError::Database {
            message: "storage connection lock poisoned".into(),
            source: None,
        })
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.lock()?
            .query_row(
                "SELECT value FROM kv WHERE scope = ?1 AND key = ?2",
                params![&self.scope, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(AppError::database)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?
            .execute(
                r"
            INSERT INTO kv (scope, key, value) VALUES (?1, ?2, ?3)
            ON CONFLICT(scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            ",
                params![&self.scope, key, value],
            )
            .map_err(AppError::database)?;

        tracing::trace!(scope = %self.scope, key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?
            .execute(
                "DELETE FROM kv WHERE scope = ?1 AND key = ?2",
                params![&self.scope, key],
            )
            .map_err(AppError::database)?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryKvStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::KeyValueStore;
    use crate::domain::{AppError, Result};

    /// In-memory store for unit tests. Can be switched to fail every write.
    #[derive(Default)]
    pub struct MemoryKvStore {
        values: Mutex<HashMap<String, String>>,
        fail_writes: Mutex<bool>,
    }

    impl MemoryKvStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        fn check_writable(&self) -> Result<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(AppError::Database {
                    message: "write rejected".into(),
                    source: None,
                });
            }
            Ok(())
        }
    }

    impl KeyValueStore for MemoryKvStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.check_writable()?;
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.check_writable()?;
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }
}
