pub mod dashboard;
pub mod global_stats;
pub mod percentiles;
pub mod registry;
pub mod report;
pub mod route_stats;
pub mod snapshot;

pub use global_stats::GlobalStats;
pub use registry::MetricsRegistry;
pub use report::{MetricsReport, RouteReport};
pub use route_stats::RouteStats;
pub use snapshot::{GlobalSnapshot, MetricsSnapshot, RouteSnapshot};

/// Bucket for requests that matched no registered route.
pub const DEFAULT_UNMATCHED_ROUTE: &str = "<unmatched>";

/// A single completed request, produced by the timing middleware.
/// Consumed immediately by the registry and never stored.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Matched route pattern, e.g. "/category/:name"
    pub route: String,
    pub method: String,
    pub status_code: u16,
    /// Handler wall time in milliseconds
    pub elapsed_ms: f64,
}

/// Status codes counted as errors by the accumulators.
pub(crate) fn is_error_status(status_code: u16) -> bool {
    status_code >= 400
}

/// Negative or non-finite durations collapse to zero so they can
/// never drag `min` below zero or poison the running total.
pub(crate) fn clamp_elapsed(elapsed_ms: f64) -> f64 {
    if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
        elapsed_ms
    } else {
        0.0
    }
}
