//! Diff endpoints.
//!
//! `GET /strategies/:id/diff?from=<rev>&to=<rev>` compares two stored
//! revisions; `POST /diff` compares two snapshots supplied inline, e.g. the
//! unsaved editor state against a stored revision.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use gambit_core::{
  diff::{Change, generate_diff},
  revision::RevisionId,
  store::RevisionStore,
  strategy::{StrategyId, StrategySnapshot},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct BetweenParams {
  /// The old side of the comparison.
  pub from: String,
  /// The new side of the comparison.
  pub to:   String,
}

/// `GET /strategies/:id/diff?from=<rev>&to=<rev>`
pub async fn between<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(params): Query<BetweenParams>,
) -> Result<Json<Vec<Change>>, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  let from = RevisionId::from(params.from);
  let to = RevisionId::from(params.to);
  let changes = store
    .diff_revisions(&id, &from, &to)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("revision {from} or {to} of {id} not found")))?;
  Ok(Json(changes))
}

/// JSON body accepted by `POST /diff`.
#[derive(Debug, Deserialize)]
pub struct InlineBody {
  pub old: StrategySnapshot,
  pub new: StrategySnapshot,
}

/// `POST /diff`
pub async fn inline(Json(body): Json<InlineBody>) -> Json<Vec<Change>> {
  Json(generate_diff(&body.old, &body.new))
}
