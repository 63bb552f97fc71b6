use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::metrics::{MetricsRegistry, Sample};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const RESPONSE_TIME_HEADER: &str = "x-response-time-us";

/// Everything the timing middleware needs: a shared handle to the registry
/// and the name of the bucket for unmatched paths. Cheap to clone.
#[derive(Clone)]
pub struct Interceptor {
    registry: Arc<MetricsRegistry>,
    unmatched_route: Arc<str>,
}

impl Interceptor {
    pub fn new(registry: Arc<MetricsRegistry>, unmatched_route: impl Into<Arc<str>>) -> Self {
        Self {
            registry,
            unmatched_route: unmatched_route.into(),
        }
    }

    /// Route key for a request: the matched pattern (`/category/:name`,
    /// never `/category/Fiction`), or the unmatched bucket.
    pub fn route_key(&self, matched: Option<&MatchedPath>) -> String {
        match matched {
            Some(path) => path.as_str().to_owned(),
            None => self.unmatched_route.to_string(),
        }
    }

    /// Hand the sample to the registry. Metrics are best effort: a failure
    /// here is logged and swallowed, the response goes out regardless.
    pub fn submit(&self, sample: &Sample) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.registry.record_sample(sample);
        }));
        if result.is_err() {
            tracing::error!(
                route = %sample.route,
                status = sample.status_code,
                "failed to record request metrics; sample dropped"
            );
        }
    }
}

/// Axum middleware wrapping every request, matched or not.
///
/// Captures `t0` on entry, runs the rest of the stack, then records
/// `(route, method, status, elapsed)`. Panics inside handlers are turned
/// into 500s by the catch-panic layer below this one, so they arrive here
/// as ordinary responses and are counted too.
///
/// Also adds three response headers:
///
///   X-Request-Id      : UUID v4 for log correlation
///   X-Response-Time-Us: total handler wall time in microseconds
///   Server-Timing     : same value in the standard Server-Timing format
pub async fn record_timing(
    State(interceptor): State<Interceptor>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let route = interceptor.route_key(req.extensions().get::<MatchedPath>());
    let request_id = Uuid::new_v4();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    let status = response.status().as_u16();

    let sample = Sample {
        route,
        method,
        status_code: status,
        elapsed_ms,
    };
    interceptor.submit(&sample);

    // ── Inject response headers ─────────────────────────────────
    let headers = response.headers_mut();
    if let Ok(val) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, val);
    }
    if let Ok(val) = HeaderValue::from_str(&elapsed.as_micros().to_string()) {
        headers.insert(RESPONSE_TIME_HEADER, val);
    }
    if let Ok(val) = HeaderValue::from_str(&format!("total;dur={elapsed_ms:.3}")) {
        headers.insert("server-timing", val);
    }

    tracing::info!(
        request_id = %request_id,
        method = %sample.method,
        route = %sample.route,
        path = %path,
        status,
        elapsed_ms,
        "request completed"
    );

    response
}
