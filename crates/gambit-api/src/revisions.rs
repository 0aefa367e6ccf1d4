//! Handlers for `/strategies/:id/revisions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/strategies/:id/revisions` | Newest first; empty list for unknown strategies |
//! | `POST` | `/strategies/:id/revisions` | Body: [`SaveBody`]; returns 201 + `{"revision_id": ...}` |
//! | `GET`  | `/strategies/:id/revisions/current` | The revision the pointer names |
//! | `GET`  | `/strategies/:id/revisions/:rev` | Single revision |
//! | `POST` | `/strategies/:id/revisions/:rev/restore` | Moves the pointer; returns the snapshot |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use gambit_core::{
  revision::{NewRevision, Revision, RevisionId},
  store::RevisionStore,
  strategy::{StrategyId, StrategySnapshot},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /strategies/:id/revisions`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Revision>>, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  let revisions = store.get_revision_history(&id).await.map_err(ApiError::store)?;
  Ok(Json(revisions))
}

// ─── Save ─────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /strategies/:id/revisions`.
#[derive(Debug, Deserialize)]
pub struct SaveBody {
  pub data:               StrategySnapshot,
  pub change_description: Option<String>,
  pub user_id:            Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Saved {
  pub revision_id: RevisionId,
}

/// `POST /strategies/:id/revisions`; returns 201 + the new revision id.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<SaveBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RevisionStore,
{
  let input = NewRevision {
    strategy_id:        StrategyId::from(id),
    data:               body.data,
    change_description: body.change_description,
    user_id:            body.user_id,
  };
  let revision_id = store.save_revision(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(Saved { revision_id })))
}

// ─── Get ──────────────────────────────────────────────────────────────────────

/// `GET /strategies/:id/revisions/current`
pub async fn current<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Revision>, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  let revision = store
    .get_current_revision(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("strategy {id} has no current revision")))?;
  Ok(Json(revision))
}

/// `GET /strategies/:id/revisions/:rev`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((id, rev)): Path<(String, String)>,
) -> Result<Json<Revision>, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  let rev = RevisionId::from(rev);
  let revision = store
    .get_revision(&id, &rev)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("revision {rev} of {id} not found")))?;
  Ok(Json(revision))
}

// ─── Restore ──────────────────────────────────────────────────────────────────

/// `POST /strategies/:id/revisions/:rev/restore`
///
/// No history is written; only the pointer moves. Returns the restored
/// snapshot so the caller can load it into the editor.
pub async fn restore<S>(
  State(store): State<Arc<S>>,
  Path((id, rev)): Path<(String, String)>,
) -> Result<Json<StrategySnapshot>, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  let rev = RevisionId::from(rev);
  let snapshot = store
    .restore_revision(&id, &rev)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("revision {rev} of {id} not found")))?;
  Ok(Json(snapshot))
}
