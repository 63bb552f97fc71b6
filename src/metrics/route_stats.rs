use hdrhistogram::Histogram;

use super::percentiles::{self, PercentileSet};
use super::snapshot::RouteSnapshot;
use super::{clamp_elapsed, is_error_status};

/// Running statistics for one route pattern.
///
/// Only the registry holds these, always behind its lock, so `record`
/// is a plain `&mut self` update. The average is never stored; it is
/// derived from `total_time_ms / count` when a snapshot is taken.
pub struct RouteStats {
    count: u64,
    errors: u64,
    total_time_ms: f64,
    // Sentinels until the first sample arrives.
    min_time_ms: f64,
    max_time_ms: f64,
    latency: Histogram<u64>,
}

impl RouteStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            errors: 0,
            total_time_ms: 0.0,
            min_time_ms: f64::INFINITY,
            max_time_ms: f64::NEG_INFINITY,
            latency: percentiles::new_histogram(),
        }
    }

    /// Fold one sample into the aggregate.
    pub fn record(&mut self, elapsed_ms: f64, status_code: u16) {
        let elapsed_ms = clamp_elapsed(elapsed_ms);

        self.count += 1;
        self.total_time_ms += elapsed_ms;
        self.min_time_ms = self.min_time_ms.min(elapsed_ms);
        self.max_time_ms = self.max_time_ms.max(elapsed_ms);
        if is_error_status(status_code) {
            self.errors += 1;
        }
        percentiles::record_ms(&mut self.latency, elapsed_ms);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ms
    }

    /// `None` until at least one sample has been recorded.
    pub fn min_time_ms(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min_time_ms)
    }

    pub fn max_time_ms(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max_time_ms)
    }

    /// Copy the current values out as an immutable snapshot entry.
    pub fn snapshot(&self, route: &str) -> RouteSnapshot {
        let (min_ms, max_ms) = match (self.min_time_ms(), self.max_time_ms()) {
            (Some(min), Some(max)) => (min, max),
            _ => (0.0, 0.0),
        };

        RouteSnapshot {
            route: route.to_owned(),
            count: self.count,
            errors: self.errors,
            total_time_ms: self.total_time_ms,
            min_ms,
            max_ms,
            percentiles: PercentileSet::from_histogram(&self.latency).clamped(min_ms, max_ms),
        }
    }
}

impl Default for RouteStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_has_no_min_or_max() {
        let stats = RouteStats::new();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.min_time_ms(), None);
        assert_eq!(stats.max_time_ms(), None);
    }

    #[test]
    fn first_sample_sets_both_min_and_max() {
        let mut stats = RouteStats::new();
        stats.record(7.5, 200);
        assert_eq!(stats.min_time_ms(), Some(7.5));
        assert_eq!(stats.max_time_ms(), Some(7.5));
    }

    #[test]
    fn tracks_count_total_min_max() {
        let mut stats = RouteStats::new();
        for ms in [10.0, 20.0, 5.0] {
            stats.record(ms, 200);
        }
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.total_time_ms(), 35.0);
        assert_eq!(stats.min_time_ms(), Some(5.0));
        assert_eq!(stats.max_time_ms(), Some(20.0));
    }

    #[test]
    fn negative_duration_is_recorded_as_zero() {
        let mut stats = RouteStats::new();
        stats.record(4.0, 200);
        stats.record(-5.0, 200);
        assert_eq!(stats.count(), 2);
        assert_eq!(stats.total_time_ms(), 4.0);
        assert_eq!(stats.min_time_ms(), Some(0.0));
    }

    #[test]
    fn nan_does_not_poison_the_aggregate() {
        let mut stats = RouteStats::new();
        stats.record(f64::NAN, 200);
        stats.record(3.0, 200);
        assert_eq!(stats.total_time_ms(), 3.0);
        assert_eq!(stats.min_time_ms(), Some(0.0));
        assert_eq!(stats.max_time_ms(), Some(3.0));
    }

    #[test]
    fn error_statuses_are_counted() {
        let mut stats = RouteStats::new();
        stats.record(1.0, 200);
        stats.record(1.0, 404);
        stats.record(1.0, 500);
        assert_eq!(stats.snapshot("/").errors, 2);
    }

    #[test]
    fn snapshot_is_detached_from_the_accumulator() {
        let mut stats = RouteStats::new();
        stats.record(2.0, 200);
        let mut snap = stats.snapshot("/cart");
        snap.count = 99;
        assert_eq!(stats.count(), 1);
        assert_eq!(snap.route, "/cart");
    }
}
