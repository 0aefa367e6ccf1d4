//! HTTP server wiring for Gambit.
//!
//! Loads [`ServerConfig`] and builds the top-level [`Router`]: the JSON API
//! from `gambit-api` mounted under `/api`, a `/health` probe, and request
//! tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use gambit_core::store::RevisionStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GAMBIT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl ServerConfig {
  /// Layer defaults, the optional file at `path`, and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 5240_i64)?
      .set_default("store_path", "gambit.db")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("GAMBIT"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~/` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: RevisionStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", gambit_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use gambit_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  #[test]
  fn missing_config_file_uses_defaults() {
    let cfg = ServerConfig::load(Path::new("definitely-not-here.toml")).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:5240");
    assert_eq!(cfg.store_path, PathBuf::from("gambit.db"));
  }

  #[test]
  fn relative_store_path_is_left_alone() {
    let cfg = ServerConfig {
      host:       "127.0.0.1".into(),
      port:       5240,
      store_path: PathBuf::from("data/gambit.db"),
    };
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("data/gambit.db"));
  }

  #[tokio::test]
  async fn health_and_api_are_mounted() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let app = app(store);

    let resp = app
      .clone()
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
      .oneshot(Request::builder().uri("/api/strategies").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
