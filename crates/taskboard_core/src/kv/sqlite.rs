//! SQLite-backed key-value store.
//!
//! # Invariants
//! - All traffic goes through the `kv_entries` table (see `schema`).
//! - `put` is an upsert; `delete` of a missing key changes nothing.
//! - One connection per store, serialized behind a mutex.
//! - Every open attempt emits one `kv_open` start event and one outcome event.

use super::schema::{check_schema, ensure_schema};
use super::{KvError, KvResult, KvStore};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Opens a database file, creating the file and table when missing.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Self::open_with("file", || Connection::open(path))
    }

    pub fn open_in_memory() -> KvResult<Self> {
        Self::open_with("memory", Connection::open_in_memory)
    }

    /// Wraps an existing connection without touching its schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `kv_entries` was never created.
    /// - `UnsupportedSchemaVersion` when the database is newer than this binary.
    pub fn try_new(conn: Connection) -> KvResult<Self> {
        check_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_with(
        mode: &'static str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> KvResult<Self> {
        let started_at = Instant::now();
        info!("event=kv_open module=kv status=start mode={mode}");

        let result = connect().map_err(KvError::from).and_then(|mut conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            ensure_schema(&mut conn)?;
            Ok(conn)
        });

        match result {
            Ok(conn) => {
                info!(
                    "event=kv_open module=kv status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    conn: Mutex::new(conn),
                })
            }
            Err(err) => {
                error!(
                    "event=kv_open module=kv status=error mode={mode} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn lock(&self) -> KvResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| KvError::Backend("sqlite connection lock poisoned".to_string()))
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: String) -> KvResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
