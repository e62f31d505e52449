//! Flat key-value primitive consumed by the entity store.
//!
//! # Responsibility
//! - Define the single-key `get`/`put`/`delete` contract.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - Each call touches exactly one key. There is no multi-key atomicity and
//!   no compare-and-swap; callers must order their writes themselves.
//! - `delete` on a missing key succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
pub mod schema;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type KvResult<T> = Result<T, KvError>;

/// Failure raised by a key-value backend.
#[derive(Debug)]
pub enum KvError {
    /// SQLite transport failure.
    Sqlite(rusqlite::Error),
    /// Database was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was never initialized with the `kv_entries` table.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Backend-specific failure without a richer error type.
    Backend(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "key-value schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "key-value store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::Backend(message) => write!(f, "{message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::UninitializedConnection { .. }
            | Self::Backend(_) => None,
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Single-key string storage.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn put(&self, key: &str, value: String) -> KvResult<()>;
    fn delete(&self, key: &str) -> KvResult<()>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: String) -> KvResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        (**self).delete(key)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: String) -> KvResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        (**self).delete(key)
    }
}
