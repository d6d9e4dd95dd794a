//! Schema steps for the quote database.
//!
//! Step `n` (1-based) upgrades a database from `user_version = n - 1` to `n`.
//! All pending steps run in one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCHEMA_STEPS: &[&str] = &[include_str!("0001_kv_store.sql")];

/// Schema version produced by running every known step.
pub fn supported_schema_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Upgrades `conn` to [`supported_schema_version`].
pub fn migrate(conn: &mut Connection) -> DbResult<()> {
    let found = stored_schema_version(conn)?;
    let supported = supported_schema_version();

    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (index, sql) in SCHEMA_STEPS.iter().enumerate().skip(found as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", index as u32 + 1)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        found, supported
    );
    Ok(())
}

/// Schema version recorded in the database file.
pub fn stored_schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
