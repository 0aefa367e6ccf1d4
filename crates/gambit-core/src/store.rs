//! The `RevisionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `gambit-store-sqlite`).
//! Higher layers (`gambit-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  consistency::ConsistencyReport,
  diff::{Change, generate_diff},
  revision::{NewRevision, Revision, RevisionId, StrategyPointer, StrategyStats},
  strategy::{StrategyId, StrategySnapshot},
};

/// Abstraction over a Gambit revision store backend.
///
/// The revision log is append-only: a revision, once written, is never
/// modified, and only [`RevisionStore::delete_strategy`] removes rows. Every
/// operation that touches both the log and the pointer table must do so
/// atomically.
///
/// Absence is reported as `Ok(None)`, never as an error. Errors are storage
/// faults and are returned unmodified; implementations do not retry.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RevisionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Append a new revision and advance the strategy's pointer to it.
  ///
  /// Creates the pointer on the first save for a strategy. Returns the newly
  /// minted revision id.
  fn save_revision(
    &self,
    input: NewRevision,
  ) -> impl Future<Output = Result<RevisionId, Self::Error>> + Send + '_;

  /// Move the pointer back to an existing revision and return its snapshot.
  ///
  /// Returns `None` without touching the pointer if the revision does not
  /// exist. No new revision is written and `total_revisions` is unchanged.
  fn restore_revision<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
    revision_id: &'a RevisionId,
  ) -> impl Future<Output = Result<Option<StrategySnapshot>, Self::Error>> + Send + 'a;

  /// Purge every revision and the pointer for a strategy. Idempotent.
  fn delete_strategy<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All revisions of a strategy, newest first. Revisions sharing a
  /// timestamp are ordered by local sequence number, newest first.
  fn get_revision_history<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
  ) -> impl Future<Output = Result<Vec<Revision>, Self::Error>> + Send + 'a;

  /// Exact lookup by `(strategy_id, revision_id)`.
  fn get_revision<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
    revision_id: &'a RevisionId,
  ) -> impl Future<Output = Result<Option<Revision>, Self::Error>> + Send + 'a;

  /// The revision the strategy's pointer currently names.
  fn get_current_revision<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
  ) -> impl Future<Output = Result<Option<Revision>, Self::Error>> + Send + 'a;

  /// The pointer row for a strategy.
  fn get_pointer<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
  ) -> impl Future<Output = Result<Option<StrategyPointer>, Self::Error>> + Send + 'a;

  /// Every strategy with a pointer, most recently updated first.
  fn list_strategies(
    &self,
  ) -> impl Future<Output = Result<Vec<StrategyPointer>, Self::Error>> + Send + '_;

  /// Compare the revision log against the pointer table for one strategy.
  fn check_consistency<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
  ) -> impl Future<Output = Result<ConsistencyReport, Self::Error>> + Send + 'a;

  // ── Provided ──────────────────────────────────────────────────────────

  /// Bookkeeping counters for a strategy, projected from its pointer.
  fn get_strategy_stats<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
  ) -> impl Future<Output = Result<Option<StrategyStats>, Self::Error>> + Send + 'a {
    async move {
      Ok(
        self
          .get_pointer(strategy_id)
          .await?
          .map(|p| p.stats()),
      )
    }
  }

  /// Diff two stored revisions of the same strategy, `from` as the old side.
  ///
  /// Returns `None` if either revision does not exist.
  fn diff_revisions<'a>(
    &'a self,
    strategy_id: &'a StrategyId,
    from: &'a RevisionId,
    to: &'a RevisionId,
  ) -> impl Future<Output = Result<Option<Vec<Change>>, Self::Error>> + Send + 'a {
    async move {
      let Some(old) = self.get_revision(strategy_id, from).await? else {
        return Ok(None);
      };
      let Some(new) = self.get_revision(strategy_id, to).await? else {
        return Ok(None);
      };
      Ok(Some(generate_diff(&old.data, &new.data)))
    }
  }
}
