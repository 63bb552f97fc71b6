use serde::Serialize;

use super::percentiles::PercentileSet;
use super::snapshot::{MetricsSnapshot, RouteSnapshot};

/// JSON document served by `GET /metrics` and pushed on `/metrics/stream`.
/// Every derived field is computed here, at read time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub total_requests: u64,
    pub total_errors: u64,
    pub average_response_time_ms: f64,
    #[serde(flatten)]
    pub percentiles: PercentileSet,
    pub uptime_seconds: f64,
    /// Busiest first
    pub routes: Vec<RouteReport>,
}

/// One per-route entry of the report.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub route: String,
    pub count: u64,
    pub errors: u64,
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    #[serde(flatten)]
    pub percentiles: PercentileSet,
}

impl From<&RouteSnapshot> for RouteReport {
    fn from(r: &RouteSnapshot) -> Self {
        Self {
            route: r.route.clone(),
            count: r.count,
            errors: r.errors,
            average_ms: r.average_ms(),
            min_ms: r.min_ms,
            max_ms: r.max_ms,
            percentiles: r.percentiles,
        }
    }
}

impl From<&MetricsSnapshot> for MetricsReport {
    fn from(snap: &MetricsSnapshot) -> Self {
        Self {
            total_requests: snap.global.total_requests,
            total_errors: snap.global.errors,
            average_response_time_ms: snap.global.average_response_time_ms(),
            percentiles: snap.global.percentiles,
            uptime_seconds: snap.uptime.as_secs_f64(),
            routes: snap
                .busiest_first()
                .into_iter()
                .filter(|r| r.count > 0)
                .map(RouteReport::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsRegistry;

    #[test]
    fn empty_report_has_zero_average_and_no_routes() {
        let report = MetricsReport::from(&MetricsRegistry::new().snapshot());
        let json = serde_json::to_value(&report).expect("serializes");

        assert_eq!(json["total_requests"], 0);
        assert_eq!(json["average_response_time_ms"], 0.0);
        assert_eq!(json["routes"], serde_json::json!([]));
        assert!(json["uptime_seconds"].is_f64());
    }

    #[test]
    fn route_entries_carry_derived_fields() {
        let registry = MetricsRegistry::new();
        registry.record("/", "GET", 200, 10.0);
        registry.record("/", "GET", 200, 20.0);
        registry.record("/cart", "GET", 200, 5.0);

        let json = serde_json::to_value(MetricsReport::from(&registry.snapshot()))
            .expect("serializes");

        assert_eq!(json["total_requests"], 3);
        let routes = json["routes"].as_array().expect("routes array");
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0]["route"], "/");
        assert_eq!(routes[0]["count"], 2);
        assert_eq!(routes[0]["average_ms"], 15.0);
        assert_eq!(routes[0]["min_ms"], 10.0);
        assert_eq!(routes[0]["max_ms"], 20.0);
        assert!(routes[0]["p95_ms"].is_f64());
        assert_eq!(routes[1]["route"], "/cart");
        assert_eq!(routes[1]["average_ms"], 5.0);
    }
}
