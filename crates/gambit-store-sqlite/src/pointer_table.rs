//! The strategy pointer table: one row per strategy naming its active
//! revision, plus bookkeeping counters.

use rusqlite::{Connection, OptionalExtension as _, Transaction, params};

use crate::encode::{POINTER_COLUMNS, RawPointer};

/// Create the pointer on the first save, otherwise advance it and bump the
/// revision counter.
pub fn upsert_on_save(
  tx: &Transaction<'_>,
  strategy_id: &str,
  revision_id: &str,
  at_ms: i64,
) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT INTO strategy_pointers (
       strategy_id, current_revision_id, created_at_ms, updated_at_ms, total_revisions
     ) VALUES (?1, ?2, ?3, ?3, 1)
     ON CONFLICT (strategy_id) DO UPDATE SET
       current_revision_id = excluded.current_revision_id,
       updated_at_ms       = excluded.updated_at_ms,
       total_revisions     = total_revisions + 1",
    params![strategy_id, revision_id, at_ms],
  )?;
  Ok(())
}

/// Point the strategy at an existing revision. Leaves `total_revisions`
/// alone. Returns the number of pointer rows changed (0 or 1).
pub fn set_current(
  tx: &Transaction<'_>,
  strategy_id: &str,
  revision_id: &str,
  at_ms: i64,
) -> rusqlite::Result<usize> {
  tx.execute(
    "UPDATE strategy_pointers
     SET current_revision_id = ?2, updated_at_ms = ?3
     WHERE strategy_id = ?1",
    params![strategy_id, revision_id, at_ms],
  )
}

pub fn get(conn: &Connection, strategy_id: &str) -> rusqlite::Result<Option<RawPointer>> {
  conn
    .query_row(
      &format!("SELECT {POINTER_COLUMNS} FROM strategy_pointers WHERE strategy_id = ?1"),
      params![strategy_id],
      RawPointer::from_row,
    )
    .optional()
}

/// The "ever created" counter, or 0 for a strategy without a pointer.
pub fn total_revisions(conn: &Connection, strategy_id: &str) -> rusqlite::Result<i64> {
  Ok(
    conn
      .query_row(
        "SELECT total_revisions FROM strategy_pointers WHERE strategy_id = ?1",
        params![strategy_id],
        |r| r.get(0),
      )
      .optional()?
      .unwrap_or(0),
  )
}

/// All pointers, most recently updated first.
pub fn list(conn: &Connection) -> rusqlite::Result<Vec<RawPointer>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {POINTER_COLUMNS} FROM strategy_pointers
     ORDER BY updated_at_ms DESC, strategy_id"
  ))?;
  stmt.query_map([], RawPointer::from_row)?.collect()
}

/// Remove the pointer row. Idempotent.
pub fn delete(tx: &Transaction<'_>, strategy_id: &str) -> rusqlite::Result<usize> {
  tx.execute(
    "DELETE FROM strategy_pointers WHERE strategy_id = ?1",
    params![strategy_id],
  )
}
