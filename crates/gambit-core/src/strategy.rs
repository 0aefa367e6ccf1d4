//! Strategy types: the payload that gets versioned.
//!
//! A strategy is a named, ordered list of weighted conditions. The store never
//! interprets the conditions beyond what the diff needs; it only snapshots
//! them.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::Result;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Caller-supplied identity of a strategy. The store trusts it as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyId(String);

impl StrategyId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for StrategyId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for StrategyId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for StrategyId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Conditions ──────────────────────────────────────────────────────────────

/// How much weight a condition carries within its strategy.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Importance {
  High,
  #[default]
  Medium,
  Low,
}

/// Caller-assigned condition identifier; stable across revisions of the same
/// strategy and used as the matching key by the diff.
pub type ConditionId = i64;

/// One entry of a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
  pub id:         ConditionId,
  pub text:       String,
  pub importance: Importance,
}

impl Condition {
  pub fn new(id: ConditionId, text: impl Into<String>, importance: Importance) -> Self {
    Self { id, text: text.into(), importance }
  }

  /// True if the user-visible content differs. `id` is the matching key and
  /// is not compared.
  pub fn content_differs(&self, other: &Condition) -> bool {
    self.text != other.text || self.importance != other.importance
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The named, ordered condition list captured at one point in time.
///
/// Ids are expected to be unique within one snapshot; this is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrategySnapshot {
  pub name:       String,
  #[serde(default)]
  pub conditions: Vec<Condition>,
}

impl StrategySnapshot {
  pub fn new(name: impl Into<String>, conditions: Vec<Condition>) -> Self {
    Self { name: name.into(), conditions }
  }

  /// Serialise for the `data_json` database column.
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  /// Decode a snapshot previously written by [`Self::to_json`].
  pub fn from_json(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }
}
