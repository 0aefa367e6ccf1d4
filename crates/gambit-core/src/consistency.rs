//! Cross-table consistency checks.
//!
//! Saves, restores and deletes each run as one unit of work, so a healthy
//! store never trips these checks. They exist to surface damage done outside
//! the store (manual edits, restored backups) without repairing it.

use serde::{Deserialize, Serialize};

use crate::{
  revision::{RevisionId, StrategyPointer},
  strategy::StrategyId,
};

/// One detected disagreement between the revision log and the pointer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConsistencyIssue {
  /// The pointer names a revision that is not in the log.
  DanglingPointer { revision_id: RevisionId },
  /// More revisions are retained than the pointer claims were ever created.
  CounterBelowRetained { total_revisions: u64, retained: u64 },
  /// Revisions exist but there is no pointer row for the strategy.
  MissingPointer { retained: u64 },
}

/// Result of [`crate::store::RevisionStore::check_consistency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
  pub strategy_id: StrategyId,
  /// Revision rows currently in the log for this strategy.
  pub retained:    u64,
  pub pointer:     Option<StrategyPointer>,
  pub issues:      Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
  /// Evaluate the observed state of both tables.
  ///
  /// `target_exists` says whether the pointer's `current_revision_id` was
  /// found in the log; it is ignored when there is no pointer.
  pub fn evaluate(
    strategy_id: StrategyId,
    pointer: Option<StrategyPointer>,
    retained: u64,
    target_exists: bool,
  ) -> Self {
    let mut issues = Vec::new();

    match &pointer {
      Some(p) => {
        if !target_exists {
          issues.push(ConsistencyIssue::DanglingPointer {
            revision_id: p.current_revision_id.clone(),
          });
        }
        if p.total_revisions < retained {
          issues.push(ConsistencyIssue::CounterBelowRetained {
            total_revisions: p.total_revisions,
            retained,
          });
        }
      }
      None if retained > 0 => {
        issues.push(ConsistencyIssue::MissingPointer { retained });
      }
      None => {}
    }

    Self { strategy_id, retained, pointer, issues }
  }

  pub fn is_consistent(&self) -> bool { self.issues.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::revision::from_millis;

  fn pointer(total: u64) -> StrategyPointer {
    let at = from_millis(1_700_000_000_000).unwrap();
    StrategyPointer {
      strategy_id:         "s".into(),
      current_revision_id: RevisionId::mint(at, total),
      created_at:          at,
      updated_at:          at,
      total_revisions:     total,
    }
  }

  #[test]
  fn unknown_strategy_is_consistent() {
    let report = ConsistencyReport::evaluate("s".into(), None, 0, false);
    assert!(report.is_consistent());
  }

  #[test]
  fn healthy_strategy_is_consistent() {
    let report = ConsistencyReport::evaluate("s".into(), Some(pointer(3)), 3, true);
    assert!(report.is_consistent());
  }

  #[test]
  fn detects_dangling_pointer_and_low_counter() {
    let report = ConsistencyReport::evaluate("s".into(), Some(pointer(1)), 2, false);
    assert_eq!(report.issues.len(), 2);
    assert!(matches!(report.issues[0], ConsistencyIssue::DanglingPointer { .. }));
    assert_eq!(report.issues[1], ConsistencyIssue::CounterBelowRetained {
      total_revisions: 1,
      retained:        2,
    });
  }

  #[test]
  fn detects_missing_pointer() {
    let report = ConsistencyReport::evaluate("s".into(), None, 4, false);
    assert_eq!(report.issues, vec![ConsistencyIssue::MissingPointer { retained: 4 }]);
  }
}
