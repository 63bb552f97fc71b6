use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::global_stats::GlobalStats;
use super::route_stats::RouteStats;
use super::snapshot::MetricsSnapshot;
use super::{clamp_elapsed, Sample};

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe metrics engine.
/// The timing middleware calls `record()`, reporting endpoints call `snapshot()`.
///
/// One coarse lock guards the global counters and the route map together.
/// Every operation under it is in-memory arithmetic or a copy, so request
/// threads never wait behind I/O or formatting.
pub struct MetricsRegistry {
    inner: Mutex<Inner>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    global: GlobalStats,
    routes: HashMap<String, RouteStats>,
}

// ─── MetricsRegistry impl ────────────────────────────────────────

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                global: GlobalStats::new(Instant::now()),
                routes: HashMap::new(),
            }),
        }
    }

    /// Record one completed request.
    ///
    /// The route entry is created on first sight. Lookup, creation, and both
    /// accumulator updates happen under a single lock acquisition, so
    /// concurrent first requests to the same route end up in one entry and no
    /// reader ever sees a half-applied sample.
    pub fn record(&self, route: &str, method: &str, status_code: u16, elapsed_ms: f64) {
        let clamped = clamp_elapsed(elapsed_ms);
        if clamped.to_bits() != elapsed_ms.to_bits() && elapsed_ms != 0.0 {
            tracing::warn!(
                route,
                method,
                elapsed_ms,
                "clamped invalid request duration to 0"
            );
        }

        let mut inner = self.inner.lock();
        let Inner { global, routes } = &mut *inner;

        match routes.get_mut(route) {
            Some(stats) => stats.record(clamped, status_code),
            None => {
                let mut stats = RouteStats::new();
                stats.record(clamped, status_code);
                routes.insert(route.to_owned(), stats);
            }
        }
        global.record(clamped, status_code);
    }

    /// Convenience wrapper for callers holding a full `Sample`.
    pub fn record_sample(&self, sample: &Sample) {
        self.record(
            &sample.route,
            &sample.method,
            sample.status_code,
            sample.elapsed_ms,
        );
    }

    /// Copy every aggregate out under the lock; callers format afterwards.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock();

        let mut routes: Vec<_> = inner
            .routes
            .iter()
            .map(|(route, stats)| stats.snapshot(route))
            .collect();
        let global = inner.global.snapshot();
        let uptime = inner.global.uptime();
        drop(inner);

        routes.sort_by(|a, b| a.route.cmp(&b.route));

        MetricsSnapshot {
            global,
            routes,
            uptime,
        }
    }

    /// Wipe all counters. Administrative only; uptime keeps counting from
    /// process start.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let started_at = inner.global.started_at();
        inner.global = GlobalStats::new(started_at);
        inner.routes.clear();
    }

    pub fn uptime(&self) -> Duration {
        self.inner.lock().global.uptime()
    }

    /// Number of distinct route entries currently held.
    pub fn route_count(&self) -> usize {
        self.inner.lock().routes.len()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
