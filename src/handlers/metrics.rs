use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    Json,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::metrics::{dashboard, MetricsReport};
use crate::AppState;

use super::AppError;

// ─── GET /metrics ────────────────────────────────────────────────
/// One JSON report. The snapshot is taken first and the lock released
/// before anything is serialized.

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let snapshot = state.metrics.snapshot();
    let report = MetricsReport::from(&snapshot);

    let body = serde_json::to_vec(&report)
        .map_err(|e| AppError::Internal(format!("failed to serialize metrics: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

// ─── GET /metrics/stream ─────────────────────────────────────────
/// Server-Sent Events: pushes the `/metrics` document every
/// `metrics.stream_interval_ms`.

pub async fn metrics_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let period = Duration::from_millis(state.config.metrics.stream_interval_ms);
    let interval = tokio::time::interval(period);

    let stream = IntervalStream::new(interval).map(move |_| {
        let report = MetricsReport::from(&state.metrics.snapshot());
        let event = Event::default().json_data(&report).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize metrics event");
            Event::default().event("error").data("metrics serialization failed")
        });
        Ok(event)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// ─── GET /dashboard ──────────────────────────────────────────────

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let snapshot = state.metrics.snapshot();
    Html(dashboard::render(
        &snapshot,
        state.config.metrics.dashboard_refresh_secs,
    ))
}

// ─── POST /metrics/reset ─────────────────────────────────────────
/// Administrative wipe of all counters. Never triggered by page traffic.

pub async fn reset_metrics(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.metrics.reset();
    tracing::info!("metrics reset by administrative request");
    Json(serde_json::json!({ "status": "reset" }))
}
