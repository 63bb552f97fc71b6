use std::time::{Duration, Instant};

use hdrhistogram::Histogram;

use super::percentiles::{self, PercentileSet};
use super::snapshot::GlobalSnapshot;
use super::{clamp_elapsed, is_error_status};

/// Process-wide request counters.
///
/// `started_at` is fixed when the registry is built and survives resets,
/// so uptime always means process uptime.
pub struct GlobalStats {
    total_requests: u64,
    errors: u64,
    total_time_ms: f64,
    min_time_ms: f64,
    max_time_ms: f64,
    latency: Histogram<u64>,
    started_at: Instant,
}

impl GlobalStats {
    pub fn new(started_at: Instant) -> Self {
        Self {
            total_requests: 0,
            errors: 0,
            total_time_ms: 0.0,
            min_time_ms: f64::INFINITY,
            max_time_ms: f64::NEG_INFINITY,
            latency: percentiles::new_histogram(),
            started_at,
        }
    }

    pub fn record(&mut self, elapsed_ms: f64, status_code: u16) {
        let elapsed_ms = clamp_elapsed(elapsed_ms);

        self.total_requests += 1;
        self.total_time_ms += elapsed_ms;
        self.min_time_ms = self.min_time_ms.min(elapsed_ms);
        self.max_time_ms = self.max_time_ms.max(elapsed_ms);
        if is_error_status(status_code) {
            self.errors += 1;
        }
        percentiles::record_ms(&mut self.latency, elapsed_ms);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ms
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn snapshot(&self) -> GlobalSnapshot {
        let (min_ms, max_ms) = if self.total_requests > 0 {
            (self.min_time_ms, self.max_time_ms)
        } else {
            (0.0, 0.0)
        };

        GlobalSnapshot {
            total_requests: self.total_requests,
            errors: self.errors,
            total_time_ms: self.total_time_ms,
            percentiles: PercentileSet::from_histogram(&self.latency).clamped(min_ms, max_ms),
        }
    }
}
