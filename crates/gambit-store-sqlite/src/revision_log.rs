//! The revision log: an append-only table of immutable snapshots.
//!
//! Writes take a [`Transaction`] so they can only run inside a unit of work
//! composed by [`crate::SqliteStore`]. Reads accept any connection.

use rusqlite::{Connection, OptionalExtension as _, Transaction, params};

use crate::encode::{REVISION_COLUMNS, RawRevision};

/// Column values for a new `revisions` row.
pub struct NewRow<'a> {
  pub strategy_id:        &'a str,
  pub revision_id:        &'a str,
  pub timestamp_ms:       i64,
  pub data_json:          &'a str,
  pub change_description: Option<&'a str>,
  pub user_id:            Option<&'a str>,
}

/// Insert one revision and return its local sequence number.
pub fn append(tx: &Transaction<'_>, row: &NewRow<'_>) -> rusqlite::Result<i64> {
  tx.execute(
    "INSERT INTO revisions (
       strategy_id, revision_id, timestamp_ms, data_json, change_description, user_id
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      row.strategy_id,
      row.revision_id,
      row.timestamp_ms,
      row.data_json,
      row.change_description,
      row.user_id,
    ],
  )?;
  Ok(tx.last_insert_rowid())
}

/// Every revision of a strategy, newest first; `seq` breaks timestamp ties.
pub fn history(conn: &Connection, strategy_id: &str) -> rusqlite::Result<Vec<RawRevision>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {REVISION_COLUMNS} FROM revisions
     WHERE strategy_id = ?1
     ORDER BY timestamp_ms DESC, seq DESC"
  ))?;
  stmt
    .query_map(params![strategy_id], RawRevision::from_row)?
    .collect()
}

pub fn get(
  conn: &Connection,
  strategy_id: &str,
  revision_id: &str,
) -> rusqlite::Result<Option<RawRevision>> {
  conn
    .query_row(
      &format!(
        "SELECT {REVISION_COLUMNS} FROM revisions
         WHERE strategy_id = ?1 AND revision_id = ?2"
      ),
      params![strategy_id, revision_id],
      RawRevision::from_row,
    )
    .optional()
}

pub fn exists(conn: &Connection, strategy_id: &str, revision_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM revisions WHERE strategy_id = ?1 AND revision_id = ?2",
        params![strategy_id, revision_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// Number of revision rows currently retained for a strategy.
pub fn count(conn: &Connection, strategy_id: &str) -> rusqlite::Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM revisions WHERE strategy_id = ?1",
    params![strategy_id],
    |r| r.get(0),
  )
}

/// Delete every revision of a strategy. Purging an unknown strategy is a
/// no-op.
pub fn purge(tx: &Transaction<'_>, strategy_id: &str) -> rusqlite::Result<usize> {
  tx.execute("DELETE FROM revisions WHERE strategy_id = ?1", params![strategy_id])
}
