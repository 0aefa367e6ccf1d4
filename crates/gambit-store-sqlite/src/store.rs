//! [`SqliteStore`], the SQLite implementation of [`RevisionStore`].

use std::path::Path;

use gambit_core::{
  consistency::ConsistencyReport,
  revision::{NewRevision, Revision, RevisionId, StrategyPointer, now_millis},
  store::RevisionStore,
  strategy::{StrategyId, StrategySnapshot},
};

use crate::{
  Error, Result,
  encode::{RawPointer, RawRevision, decode_count, encode_ts},
  pointer_table, revision_log,
  revision_log::NewRow,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gambit revision store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All access
/// goes through one connection thread, so operations never overlap.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RevisionStore impl ──────────────────────────────────────────────────────

impl RevisionStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn save_revision(&self, input: NewRevision) -> Result<RevisionId> {
    let data_json = input.data.to_json()?;
    let at        = now_millis();
    let at_ms     = encode_ts(at);
    let NewRevision { strategy_id, change_description, user_id, .. } = input;
    let sid       = strategy_id.as_str().to_owned();

    let revision_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // The ordinal comes from the pointer counter read inside the same
        // transaction, so two saves cannot mint the same token.
        let ordinal = u64::try_from(pointer_table::total_revisions(&tx, &sid)?)
          .unwrap_or(0)
          + 1;
        let revision_id = RevisionId::mint(at, ordinal);

        revision_log::append(&tx, &NewRow {
          strategy_id:        &sid,
          revision_id:        revision_id.as_str(),
          timestamp_ms:       at_ms,
          data_json:          &data_json,
          change_description: change_description.as_deref(),
          user_id:            user_id.as_deref(),
        })?;
        pointer_table::upsert_on_save(&tx, &sid, revision_id.as_str(), at_ms)?;

        tx.commit()?;
        Ok(revision_id)
      })
      .await?;

    tracing::info!(%strategy_id, %revision_id, "saved revision");
    Ok(revision_id)
  }

  async fn restore_revision(
    &self,
    strategy_id: &StrategyId,
    revision_id: &RevisionId,
  ) -> Result<Option<StrategySnapshot>> {
    let sid   = strategy_id.as_str().to_owned();
    let rid   = revision_id.as_str().to_owned();
    let at_ms = encode_ts(now_millis());

    let restored: Option<(StrategySnapshot, usize)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = revision_log::get(&tx, &sid, &rid)? else {
          return Ok(None);
        };
        // Decode before moving the pointer so an unreadable revision never
        // becomes the active one.
        let snapshot = StrategySnapshot::from_json(&raw.data_json)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        let moved = pointer_table::set_current(&tx, &sid, &rid, at_ms)?;

        tx.commit()?;
        Ok(Some((snapshot, moved)))
      })
      .await?;

    let Some((snapshot, moved)) = restored else {
      tracing::debug!(%strategy_id, %revision_id, "restore target not found");
      return Ok(None);
    };
    if moved == 0 {
      tracing::warn!(%strategy_id, %revision_id, "restored revision has no pointer row");
    }
    tracing::info!(%strategy_id, %revision_id, "restored revision");
    Ok(Some(snapshot))
  }

  async fn delete_strategy(&self, strategy_id: &StrategyId) -> Result<()> {
    let sid = strategy_id.as_str().to_owned();

    let (revisions, pointers) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let revisions = revision_log::purge(&tx, &sid)?;
        let pointers  = pointer_table::delete(&tx, &sid)?;
        tx.commit()?;
        Ok((revisions, pointers))
      })
      .await?;

    tracing::info!(%strategy_id, revisions, pointers, "deleted strategy");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_revision_history(&self, strategy_id: &StrategyId) -> Result<Vec<Revision>> {
    let sid = strategy_id.as_str().to_owned();

    let raws: Vec<RawRevision> = self
      .conn
      .call(move |conn| Ok(revision_log::history(conn, &sid)?))
      .await?;

    tracing::debug!(%strategy_id, count = raws.len(), "loaded revision history");
    raws.into_iter().map(RawRevision::into_revision).collect()
  }

  async fn get_revision(
    &self,
    strategy_id: &StrategyId,
    revision_id: &RevisionId,
  ) -> Result<Option<Revision>> {
    let sid = strategy_id.as_str().to_owned();
    let rid = revision_id.as_str().to_owned();

    let raw: Option<RawRevision> = self
      .conn
      .call(move |conn| Ok(revision_log::get(conn, &sid, &rid)?))
      .await?;

    raw.map(RawRevision::into_revision).transpose()
  }

  async fn get_current_revision(&self, strategy_id: &StrategyId) -> Result<Option<Revision>> {
    let sid = strategy_id.as_str().to_owned();

    let raw: Option<RawRevision> = self
      .conn
      .call(move |conn| {
        let Some(pointer) = pointer_table::get(conn, &sid)? else {
          return Ok(None);
        };
        Ok(revision_log::get(conn, &sid, &pointer.current_revision_id)?)
      })
      .await?;

    raw.map(RawRevision::into_revision).transpose()
  }

  async fn get_pointer(&self, strategy_id: &StrategyId) -> Result<Option<StrategyPointer>> {
    let sid = strategy_id.as_str().to_owned();

    let raw: Option<RawPointer> = self
      .conn
      .call(move |conn| Ok(pointer_table::get(conn, &sid)?))
      .await?;

    raw.map(RawPointer::into_pointer).transpose()
  }

  async fn list_strategies(&self) -> Result<Vec<StrategyPointer>> {
    let raws: Vec<RawPointer> = self
      .conn
      .call(|conn| Ok(pointer_table::list(conn)?))
      .await?;

    raws.into_iter().map(RawPointer::into_pointer).collect()
  }

  async fn check_consistency(&self, strategy_id: &StrategyId) -> Result<ConsistencyReport> {
    let sid = strategy_id.as_str().to_owned();

    let (raw, retained, target_exists): (Option<RawPointer>, i64, bool) = self
      .conn
      .call(move |conn| {
        let tx       = conn.transaction()?;
        let pointer  = pointer_table::get(&tx, &sid)?;
        let retained = revision_log::count(&tx, &sid)?;
        let exists   = match &pointer {
          Some(p) => revision_log::exists(&tx, &sid, &p.current_revision_id)?,
          None    => false,
        };
        tx.commit()?;
        Ok((pointer, retained, exists))
      })
      .await?;

    let report = ConsistencyReport::evaluate(
      strategy_id.clone(),
      raw.map(RawPointer::into_pointer).transpose()?,
      decode_count(retained)?,
      target_exists,
    );
    if !report.is_consistent() {
      tracing::warn!(%strategy_id, issues = ?report.issues, "strategy tables disagree");
    }
    Ok(report)
  }
}
