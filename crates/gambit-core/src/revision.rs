//! Revision and pointer types.
//!
//! A revision is an immutable stored copy of a snapshot. Revisions are never
//! updated; the only way one disappears is whole-strategy deletion. The
//! per-strategy pointer names which revision is currently active.

use std::fmt;

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  strategy::{StrategyId, StrategySnapshot},
};

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// The current instant, truncated to the millisecond precision the store
/// persists.
pub fn now_millis() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

pub fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms).ok_or(Error::TimestampOutOfRange(ms))
}

// ─── RevisionId ──────────────────────────────────────────────────────────────

/// Opaque revision token.
///
/// Minted as `<millis>-<ordinal>-<suffix>`: fixed-width hex milliseconds so
/// tokens sort by creation instant, the per-strategy ordinal so tokens are
/// unique within a strategy even inside one millisecond, and eight hex digits
/// of a v4 UUID so tokens from different strategies do not collide in
/// practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
  /// Mint the token for the `ordinal`-th revision (1-based) of a strategy.
  pub fn mint(at: DateTime<Utc>, ordinal: u64) -> Self {
    let suffix = Uuid::new_v4().simple().to_string();
    Self(format!(
      "{:012x}-{:06x}-{}",
      at.timestamp_millis().max(0),
      ordinal,
      &suffix[..8]
    ))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RevisionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for RevisionId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for RevisionId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Revision ────────────────────────────────────────────────────────────────

/// An immutable, timestamped, uniquely-identified stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
  /// Storage-assigned local sequence number; increasing, never reused.
  pub seq:                i64,
  pub strategy_id:        StrategyId,
  pub revision_id:        RevisionId,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp:          DateTime<Utc>,
  pub data:               StrategySnapshot,
  pub change_description: Option<String>,
  /// Reserved for multi-user deployments; carried but never interpreted.
  pub user_id:            Option<String>,
}

// ─── NewRevision ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::RevisionStore::save_revision`].
///
/// The snapshot is taken by value: once handed over, the caller's copy and the
/// stored copy are independent. `revision_id` and `timestamp` are always
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRevision {
  pub strategy_id:        StrategyId,
  pub data:               StrategySnapshot,
  pub change_description: Option<String>,
  pub user_id:            Option<String>,
}

impl NewRevision {
  pub fn new(strategy_id: impl Into<StrategyId>, data: StrategySnapshot) -> Self {
    Self {
      strategy_id: strategy_id.into(),
      data,
      change_description: None,
      user_id: None,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.change_description = Some(description.into());
    self
  }
}

// ─── Pointer ─────────────────────────────────────────────────────────────────

/// The per-strategy record naming the active revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPointer {
  pub strategy_id:         StrategyId,
  pub current_revision_id: RevisionId,
  /// Timestamp of the strategy's first revision.
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub created_at:          DateTime<Utc>,
  /// Timestamp of the most recent save or restore.
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub updated_at:          DateTime<Utc>,
  /// Revisions ever created for this strategy. Restores do not change it;
  /// only deleting the strategy resets it.
  pub total_revisions:     u64,
}

impl StrategyPointer {
  pub fn stats(&self) -> StrategyStats {
    StrategyStats {
      total_revisions: self.total_revisions,
      first_created:   self.created_at,
      last_modified:   self.updated_at,
    }
  }
}

/// Bookkeeping summary for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStats {
  pub total_revisions: u64,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub first_created:   DateTime<Utc>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_modified:   DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minted_ids_sort_by_instant_then_ordinal() {
    let t0 = from_millis(1_700_000_000_000).unwrap();
    let t1 = from_millis(1_700_000_000_001).unwrap();

    let a = RevisionId::mint(t0, 1);
    let b = RevisionId::mint(t0, 2);
    let c = RevisionId::mint(t1, 3);

    assert!(a < b);
    assert!(b < c);
    assert_ne!(RevisionId::mint(t0, 1), RevisionId::mint(t0, 1));
  }

  #[test]
  fn now_millis_has_no_sub_millisecond_part() {
    let now = now_millis();
    assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    assert_eq!(from_millis(now.timestamp_millis()).unwrap(), now);
  }

  #[test]
  fn from_millis_rejects_out_of_range() {
    assert!(matches!(
      from_millis(i64::MAX),
      Err(Error::TimestampOutOfRange(_))
    ));
  }
}
