//! Traffic simulator control API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bookstore_metrics::{config::Config, server, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_app() -> (Router, Arc<AppState>) {
    let config: Config = "[simulator]\nmax_users = 4\nmax_duration_secs = 5\n"
        .parse()
        .unwrap();
    let state = Arc::new(AppState::new(config));
    (server::create_router(state.clone()), state)
}

async fn call(app: &Router, method: &str, uri: &str, json: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match json {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_owned())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn rejects_out_of_range_requests() {
    let (app, _) = test_app();

    let (status, body) = call(&app, "POST", "/api/simulate/start", Some(r#"{"users":0}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("users"));

    let (status, _) = call(
        &app,
        "POST",
        "/api/simulate/start",
        Some(r#"{"users":2,"duration_secs":600}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn idle_status_and_stop_without_run() {
    let (app, _) = test_app();

    let (status, body) = call(&app, "GET", "/api/simulate/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], false);

    let (_, body) = call(&app, "POST", "/api/simulate/stop", None).await;
    assert_eq!(body["running"], false);
    assert_eq!(body["message"], "No simulation is running");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn simulated_shoppers_feed_the_registry() {
    let (app, state) = test_app();

    let (status, body) = call(
        &app,
        "POST",
        "/api/simulate/start",
        Some(r#"{"users":2,"duration_secs":5}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], true);

    let (status, _) = call(
        &app,
        "POST",
        "/api/simulate/start",
        Some(r#"{"users":1,"duration_secs":1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let (_, body) = call(&app, "POST", "/api/simulate/stop", None).await;
    assert_eq!(body["running"], false);

    let snap = state.metrics.snapshot();
    let home = snap.route("/").expect("shoppers start on the home page");
    assert!(home.count >= 2);
    assert!(snap.route("/category/Fiction").is_none());
}
