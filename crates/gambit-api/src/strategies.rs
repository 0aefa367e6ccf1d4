//! Handlers for strategy-level endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/strategies` | Every pointer, most recently updated first |
//! | `DELETE` | `/strategies/:id` | Purges history and pointer; 204 even if unknown |
//! | `GET`    | `/strategies/:id/stats` | 404 if the strategy has no pointer |
//! | `GET`    | `/strategies/:id/consistency` | Cross-table check report |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use gambit_core::{
  consistency::ConsistencyReport,
  revision::{StrategyPointer, StrategyStats},
  store::RevisionStore,
  strategy::StrategyId,
};

use crate::error::ApiError;

/// `GET /strategies`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<StrategyPointer>>, ApiError>
where
  S: RevisionStore,
{
  let pointers = store.list_strategies().await.map_err(ApiError::store)?;
  Ok(Json(pointers))
}

/// `DELETE /strategies/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  store.delete_strategy(&id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /strategies/:id/stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<StrategyStats>, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  let stats = store
    .get_strategy_stats(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("strategy {id} not found")))?;
  Ok(Json(stats))
}

/// `GET /strategies/:id/consistency`
pub async fn consistency<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<ConsistencyReport>, ApiError>
where
  S: RevisionStore,
{
  let id = StrategyId::from(id);
  let report = store.check_consistency(&id).await.map_err(ApiError::store)?;
  Ok(Json(report))
}
