//! Structural diff between two strategy snapshots.
//!
//! Conditions are matched by their stable `id`, never by position, so
//! reordering alone produces no changes. The output order is fixed: the name
//! change first, then additions (in the new snapshot's order), removals (in
//! the old snapshot's order), and modifications (in the new snapshot's order).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::strategy::{Condition, ConditionId, StrategySnapshot};

/// Which part of the snapshot a [`Change`] touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeField {
  Name,
  Conditions,
}

/// One structural difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Change {
  NameChanged {
    field:     ChangeField,
    old_value: String,
    new_value: String,
  },
  Added {
    field:     ChangeField,
    new_value: Condition,
  },
  Removed {
    field:     ChangeField,
    old_value: Condition,
  },
  Modified {
    field:     ChangeField,
    old_value: Condition,
    new_value: Condition,
  },
}

impl Change {
  /// The tag string, e.g. `"name_changed"`.
  pub fn kind(&self) -> &'static str { self.into() }

  pub fn field(&self) -> ChangeField {
    match self {
      Self::NameChanged { field, .. }
      | Self::Added { field, .. }
      | Self::Removed { field, .. }
      | Self::Modified { field, .. } => *field,
    }
  }

  /// One-line human-readable description, suitable for a history view.
  pub fn summary(&self) -> String {
    match self {
      Self::NameChanged { old_value, new_value, .. } => {
        format!("renamed {old_value:?} to {new_value:?}")
      }
      Self::Added { new_value: c, .. } => {
        format!("added condition {} ({}): {:?}", c.id, c.importance, c.text)
      }
      Self::Removed { old_value: c, .. } => {
        format!("removed condition {} ({}): {:?}", c.id, c.importance, c.text)
      }
      Self::Modified { old_value: o, new_value: n, .. } => {
        let mut parts = Vec::new();
        if o.text != n.text {
          parts.push(format!("text {:?} -> {:?}", o.text, n.text));
        }
        if o.importance != n.importance {
          parts.push(format!("importance {} -> {}", o.importance, n.importance));
        }
        format!("modified condition {}: {}", n.id, parts.join(", "))
      }
    }
  }
}

/// Conditions keyed by id, iterable in first-appearance order.
///
/// If an id repeats, the later condition wins but keeps the position of the
/// first occurrence.
struct ConditionIndex<'a> {
  order: Vec<ConditionId>,
  by_id: HashMap<ConditionId, &'a Condition>,
}

impl<'a> ConditionIndex<'a> {
  fn build(conditions: &'a [Condition]) -> Self {
    let mut order = Vec::with_capacity(conditions.len());
    let mut by_id = HashMap::with_capacity(conditions.len());
    for c in conditions {
      if by_id.insert(c.id, c).is_none() {
        order.push(c.id);
      }
    }
    Self { order, by_id }
  }

  fn get(&self, id: ConditionId) -> Option<&'a Condition> {
    self.by_id.get(&id).copied()
  }

  fn iter(&self) -> impl Iterator<Item = &'a Condition> + '_ {
    self.order.iter().map(|id| self.by_id[id])
  }
}

/// Compare two snapshots. Pure and deterministic: the same inputs always give
/// the same sequence, and `generate_diff(a, a)` is empty.
pub fn generate_diff(old: &StrategySnapshot, new: &StrategySnapshot) -> Vec<Change> {
  let mut changes = Vec::new();

  if old.name != new.name {
    changes.push(Change::NameChanged {
      field:     ChangeField::Name,
      old_value: old.name.clone(),
      new_value: new.name.clone(),
    });
  }

  let old_idx = ConditionIndex::build(&old.conditions);
  let new_idx = ConditionIndex::build(&new.conditions);

  for c in new_idx.iter() {
    if old_idx.get(c.id).is_none() {
      changes.push(Change::Added {
        field:     ChangeField::Conditions,
        new_value: c.clone(),
      });
    }
  }

  for c in old_idx.iter() {
    if new_idx.get(c.id).is_none() {
      changes.push(Change::Removed {
        field:     ChangeField::Conditions,
        old_value: c.clone(),
      });
    }
  }

  for c in new_idx.iter() {
    if let Some(prev) = old_idx.get(c.id)
      && prev.content_differs(c)
    {
      changes.push(Change::Modified {
        field:     ChangeField::Conditions,
        old_value: prev.clone(),
        new_value: c.clone(),
      });
    }
  }

  changes
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::strategy::Importance::{self, High, Low, Medium};

  fn cond(id: ConditionId, text: &str, importance: Importance) -> Condition {
    Condition::new(id, text, importance)
  }

  #[test]
  fn identical_snapshots_have_no_changes() {
    let a = StrategySnapshot::new(
      "Breakout",
      vec![cond(1, "volume spike", High), cond(2, "above 200d MA", Medium)],
    );
    assert!(generate_diff(&a, &a).is_empty());
    assert!(generate_diff(&StrategySnapshot::default(), &StrategySnapshot::default()).is_empty());
  }

  #[test]
  fn rename_add_and_modify_in_order() {
    let a = StrategySnapshot::new("X", vec![cond(1, "a", High)]);
    let b = StrategySnapshot::new("Y", vec![cond(1, "a", Low), cond(2, "b", Medium)]);

    let changes = generate_diff(&a, &b);
    assert_eq!(changes, vec![
      Change::NameChanged {
        field:     ChangeField::Name,
        old_value: "X".into(),
        new_value: "Y".into(),
      },
      Change::Added {
        field:     ChangeField::Conditions,
        new_value: cond(2, "b", Medium),
      },
      Change::Modified {
        field:     ChangeField::Conditions,
        old_value: cond(1, "a", High),
        new_value: cond(1, "a", Low),
      },
    ]);
  }

  #[test]
  fn removals_follow_old_order() {
    let a = StrategySnapshot::new("S", vec![
      cond(3, "c", Low),
      cond(1, "a", High),
      cond(2, "b", Medium),
    ]);
    let b = StrategySnapshot::new("S", vec![cond(2, "b", Medium)]);

    let removed: Vec<ConditionId> = generate_diff(&a, &b)
      .into_iter()
      .map(|c| match c {
        Change::Removed { old_value, .. } => old_value.id,
        other => panic!("unexpected change: {other:?}"),
      })
      .collect();
    assert_eq!(removed, vec![3, 1]);
  }

  #[test]
  fn additions_come_before_removals_before_modifications() {
    let a = StrategySnapshot::new("S", vec![cond(1, "a", High), cond(2, "b", High)]);
    let b = StrategySnapshot::new("S", vec![cond(2, "b!", High), cond(9, "z", Low)]);

    let kinds: Vec<&str> = generate_diff(&a, &b).iter().map(Change::kind).collect();
    assert_eq!(kinds, vec!["added", "removed", "modified"]);
  }

  #[test]
  fn reordering_alone_is_not_a_change() {
    let a = StrategySnapshot::new("S", vec![cond(1, "a", High), cond(2, "b", Low)]);
    let b = StrategySnapshot::new("S", vec![cond(2, "b", Low), cond(1, "a", High)]);
    assert!(generate_diff(&a, &b).is_empty());
  }

  #[test]
  fn duplicate_ids_are_reported_once() {
    let a = StrategySnapshot::new("S", vec![]);
    let b = StrategySnapshot::new("S", vec![cond(1, "first", High), cond(1, "second", Low)]);

    let changes = generate_diff(&a, &b);
    assert_eq!(changes.len(), 1);
    assert!(matches!(
      &changes[0],
      Change::Added { new_value, .. } if new_value.text == "second"
    ));
  }

  #[test]
  fn change_serialises_with_type_tag() {
    let change = Change::Added {
      field:     ChangeField::Conditions,
      new_value: cond(2, "b", Medium),
    };
    let json = serde_json::to_value(&change).unwrap();
    assert_eq!(json["type"], "added");
    assert_eq!(json["field"], "conditions");
    assert_eq!(json["new_value"]["importance"], "medium");
  }

  #[test]
  fn summary_mentions_each_modified_part() {
    let change = Change::Modified {
      field:     ChangeField::Conditions,
      old_value: cond(4, "rsi < 30", High),
      new_value: cond(4, "rsi < 25", Low),
    };
    let line = change.summary();
    assert!(line.contains("text"), "{line}");
    assert!(line.contains("importance high -> low"), "{line}");
  }
}
