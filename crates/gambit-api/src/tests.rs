//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use gambit_core::{revision::Revision, strategy::StrategySnapshot};
use gambit_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{api_router, revisions::Saved};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn snapshot_json(name: &str, importance: &str) -> Value {
  json!({
    "name": name,
    "conditions": [
      { "id": 1, "text": "a", "importance": importance },
    ],
  })
}

async fn save(app: &Router, strategy: &str, data: Value) -> String {
  let (status, body) = send(
    app,
    "POST",
    &format!("/strategies/{strategy}/revisions"),
    Some(json!({ "data": data, "change_description": "edit" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  let saved: Saved = serde_json::from_value(body).unwrap();
  saved.revision_id.to_string()
}

// ── Save / read ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_read_back() {
  let app = app().await;
  let rev = save(&app, "s1", snapshot_json("X", "high")).await;

  let (status, body) = send(&app, "GET", &format!("/strategies/s1/revisions/{rev}"), None).await;
  assert_eq!(status, StatusCode::OK);
  let revision: Revision = serde_json::from_value(body).unwrap();
  assert_eq!(revision.revision_id.as_str(), rev);
  assert_eq!(revision.change_description.as_deref(), Some("edit"));
  assert_eq!(revision.data.name, "X");

  let (status, body) = send(&app, "GET", "/strategies/s1/revisions/current", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["revision_id"], rev.as_str());

  let (status, body) = send(&app, "GET", "/strategies/s1/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total_revisions"], 1);
  assert!(body["first_created"].is_i64());
}

#[tokio::test]
async fn unknown_ids_return_404() {
  let app = app().await;

  let (status, body) = send(&app, "GET", "/strategies/none/stats", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());

  let (status, _) = send(&app, "GET", "/strategies/none/revisions/current", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&app, "POST", "/strategies/none/revisions/abc/restore", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, body) = send(&app, "GET", "/strategies/none/revisions", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([]));
}

// ── Restore ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn restore_returns_snapshot_and_keeps_history() {
  let app = app().await;
  let first = save(&app, "s1", snapshot_json("X", "high")).await;
  save(&app, "s1", snapshot_json("Y", "low")).await;

  let (status, body) =
    send(&app, "POST", &format!("/strategies/s1/revisions/{first}/restore"), None).await;
  assert_eq!(status, StatusCode::OK);
  let snapshot: StrategySnapshot = serde_json::from_value(body).unwrap();
  assert_eq!(snapshot.name, "X");

  let (_, history) = send(&app, "GET", "/strategies/s1/revisions", None).await;
  assert_eq!(history.as_array().unwrap().len(), 2);

  let (_, stats) = send(&app, "GET", "/strategies/s1/stats", None).await;
  assert_eq!(stats["total_revisions"], 2);

  let (_, current) = send(&app, "GET", "/strategies/s1/revisions/current", None).await;
  assert_eq!(current["revision_id"], first.as_str());
}

// ── Delete / list ────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_purges_strategy() {
  let app = app().await;
  save(&app, "s1", snapshot_json("X", "high")).await;
  save(&app, "s2", snapshot_json("X", "high")).await;

  let (status, _) = send(&app, "DELETE", "/strategies/s1", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "DELETE", "/strategies/s1", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, "GET", "/strategies/s1/stats", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, list) = send(&app, "GET", "/strategies", None).await;
  let ids: Vec<&str> = list
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["strategy_id"].as_str().unwrap())
    .collect();
  assert_eq!(ids, vec!["s2"]);

  let (_, report) = send(&app, "GET", "/strategies/s1/consistency", None).await;
  assert_eq!(report["issues"], json!([]));
  assert_eq!(report["retained"], 0);
}

// ── Diff ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn diff_between_stored_revisions() {
  let app = app().await;
  let a = save(&app, "s1", snapshot_json("X", "high")).await;
  let b = save(&app, "s1", snapshot_json("Y", "low")).await;

  let (status, body) =
    send(&app, "GET", &format!("/strategies/s1/diff?from={a}&to={b}"), None).await;
  assert_eq!(status, StatusCode::OK);
  let types: Vec<&str> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["type"].as_str().unwrap())
    .collect();
  assert_eq!(types, vec!["name_changed", "modified"]);

  let (status, _) =
    send(&app, "GET", &format!("/strategies/s1/diff?from={a}&to=missing"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inline_diff_matches_documented_example() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/diff",
    Some(json!({
      "old": { "name": "X", "conditions": [{ "id": 1, "text": "a", "importance": "high" }] },
      "new": { "name": "Y", "conditions": [
        { "id": 1, "text": "a", "importance": "low" },
        { "id": 2, "text": "b", "importance": "medium" },
      ] },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([
    { "type": "name_changed", "field": "name", "old_value": "X", "new_value": "Y" },
    {
      "type": "added",
      "field": "conditions",
      "new_value": { "id": 2, "text": "b", "importance": "medium" },
    },
    {
      "type": "modified",
      "field": "conditions",
      "old_value": { "id": 1, "text": "a", "importance": "high" },
      "new_value": { "id": 1, "text": "a", "importance": "low" },
    },
  ]));
}
