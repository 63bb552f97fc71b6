use std::cmp::Ordering;
use std::time::Duration;

use super::percentiles::PercentileSet;

/// Point-in-time copy of one route's aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSnapshot {
    pub route: String,
    pub count: u64,
    pub errors: u64,
    pub total_time_ms: f64,
    /// 0 when `count == 0`
    pub min_ms: f64,
    pub max_ms: f64,
    pub percentiles: PercentileSet,
}

impl RouteSnapshot {
    /// Mean response time, 0 for an empty entry.
    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        // Summation rounding can push the quotient a hair outside the
        // observed range (e.g. three samples of 0.1).
        (self.total_time_ms / self.count as f64).clamp(self.min_ms, self.max_ms)
    }
}

/// Point-in-time copy of the process-wide counters.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSnapshot {
    pub total_requests: u64,
    pub errors: u64,
    pub total_time_ms: f64,
    pub percentiles: PercentileSet,
}

impl GlobalSnapshot {
    pub fn average_response_time_ms(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_time_ms / self.total_requests as f64
        }
    }
}

/// Everything the reporting endpoints need, copied out of the registry
/// in one locked section. Mutating it never touches the registry.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub global: GlobalSnapshot,
    /// Sorted by route name so two snapshots of the same state compare equal.
    pub routes: Vec<RouteSnapshot>,
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// True until the first request has been recorded.
    pub fn is_empty(&self) -> bool {
        self.global.total_requests == 0 && self.routes.iter().all(|r| r.count == 0)
    }

    pub fn route(&self, route: &str) -> Option<&RouteSnapshot> {
        self.routes
            .binary_search_by(|r| r.route.as_str().cmp(route))
            .ok()
            .map(|i| &self.routes[i])
    }

    /// Routes ordered by request count descending, ties by name ascending.
    pub fn busiest_first(&self) -> Vec<&RouteSnapshot> {
        let mut routes: Vec<&RouteSnapshot> = self.routes.iter().collect();
        routes.sort_by(|a, b| busiest_first(a, b));
        routes
    }
}

fn busiest_first(a: &RouteSnapshot, b: &RouteSnapshot) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route))
}
