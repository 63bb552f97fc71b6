//! Liveness endpoint for monitors and load balancers.

use axum::{extract::State, Json};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// ISO-8601 UTC
    pub timestamp: String,
    pub uptime_seconds: f64,
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: iso8601(Utc::now()),
        uptime_seconds: state.metrics.uptime().as_secs_f64(),
    })
}

fn iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_are_utc_iso8601() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(iso8601(at), "2026-03-01T12:30:05.000Z");
    }

    #[tokio::test]
    async fn reports_ok() {
        let state = Arc::new(AppState::new(crate::config::Config::default()));
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert!(DateTime::parse_from_rfc3339(&body.timestamp).is_ok());
        assert!(body.uptime_seconds >= 0.0);
    }
}
