//! `kv_entries` table schema.
//!
//! The schema version lives in `PRAGMA user_version`. A fresh database (version
//! 0) is created at `SCHEMA_VERSION`; a database stamped with a newer version
//! is refused so an older binary never writes into a layout it does not know.

use super::{KvError, KvResult};
use rusqlite::Connection;

/// Version stamped on databases created by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_KV_ENTRIES: &str = include_str!("schema/kv_entries.sql");

/// Creates the table on a fresh database, or checks an existing one.
pub(crate) fn ensure_schema(conn: &mut Connection) -> KvResult<()> {
    match schema_version(conn)? {
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(CREATE_KV_ENTRIES)?;
            tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
            tx.commit()?;
            Ok(())
        }
        _ => check_schema(conn),
    }
}

/// Accepts only connections already at `SCHEMA_VERSION`.
pub(crate) fn check_schema(conn: &Connection) -> KvResult<()> {
    let version = schema_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(KvError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if version < SCHEMA_VERSION {
        return Err(KvError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version: version,
        });
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> KvResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
