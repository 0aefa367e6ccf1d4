//! JSON REST API for Gambit.
//!
//! Exposes an axum [`Router`] backed by any
//! [`gambit_core::store::RevisionStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gambit_api::api_router(store.clone()))
//! ```

pub mod diff;
pub mod error;
pub mod revisions;
pub mod strategies;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use gambit_core::store::RevisionStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RevisionStore + 'static,
{
  Router::new()
    // Strategies
    .route("/strategies", get(strategies::list::<S>))
    .route("/strategies/{id}", delete(strategies::delete_one::<S>))
    .route("/strategies/{id}/stats", get(strategies::stats::<S>))
    .route("/strategies/{id}/consistency", get(strategies::consistency::<S>))
    // Revisions
    .route(
      "/strategies/{id}/revisions",
      get(revisions::history::<S>).post(revisions::create::<S>),
    )
    .route("/strategies/{id}/revisions/current", get(revisions::current::<S>))
    .route("/strategies/{id}/revisions/{rev}", get(revisions::get_one::<S>))
    .route("/strategies/{id}/revisions/{rev}/restore", post(revisions::restore::<S>))
    // Diff
    .route("/strategies/{id}/diff", get(diff::between::<S>))
    .route("/diff", post(diff::inline))
    .with_state(store)
}

#[cfg(test)]
mod tests;
