//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as integer milliseconds since the epoch so that the
//! history index sorts numerically. Snapshots are stored as compact JSON. Ids
//! are stored as their string form.

use chrono::{DateTime, Utc};
use gambit_core::{
  revision::{Revision, StrategyPointer, from_millis},
  strategy::StrategySnapshot,
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_ts(ms: i64) -> Result<DateTime<Utc>> { Ok(from_millis(ms)?) }

// ─── Counters ────────────────────────────────────────────────────────────────

pub fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::CorruptRow(format!("negative count: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawRevision::from_row`].
pub const REVISION_COLUMNS: &str =
  "seq, strategy_id, revision_id, timestamp_ms, data_json, change_description, user_id";

/// Raw values read directly from a `revisions` row.
pub struct RawRevision {
  pub seq:                i64,
  pub strategy_id:        String,
  pub revision_id:        String,
  pub timestamp_ms:       i64,
  pub data_json:          String,
  pub change_description: Option<String>,
  pub user_id:            Option<String>,
}

impl RawRevision {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      seq:                row.get(0)?,
      strategy_id:        row.get(1)?,
      revision_id:        row.get(2)?,
      timestamp_ms:       row.get(3)?,
      data_json:          row.get(4)?,
      change_description: row.get(5)?,
      user_id:            row.get(6)?,
    })
  }

  pub fn into_revision(self) -> Result<Revision> {
    Ok(Revision {
      seq:                self.seq,
      strategy_id:        self.strategy_id.into(),
      revision_id:        self.revision_id.into(),
      timestamp:          decode_ts(self.timestamp_ms)?,
      data:               StrategySnapshot::from_json(&self.data_json)?,
      change_description: self.change_description,
      user_id:            self.user_id,
    })
  }
}

/// Column list matching [`RawPointer::from_row`].
pub const POINTER_COLUMNS: &str =
  "strategy_id, current_revision_id, created_at_ms, updated_at_ms, total_revisions";

/// Raw values read directly from a `strategy_pointers` row.
pub struct RawPointer {
  pub strategy_id:         String,
  pub current_revision_id: String,
  pub created_at_ms:       i64,
  pub updated_at_ms:       i64,
  pub total_revisions:     i64,
}

impl RawPointer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      strategy_id:         row.get(0)?,
      current_revision_id: row.get(1)?,
      created_at_ms:       row.get(2)?,
      updated_at_ms:       row.get(3)?,
      total_revisions:     row.get(4)?,
    })
  }

  pub fn into_pointer(self) -> Result<StrategyPointer> {
    Ok(StrategyPointer {
      strategy_id:         self.strategy_id.into(),
      current_revision_id: self.current_revision_id.into(),
      created_at:          decode_ts(self.created_at_ms)?,
      updated_at:          decode_ts(self.updated_at_ms)?,
      total_revisions:     decode_count(self.total_revisions)?,
    })
  }
}
