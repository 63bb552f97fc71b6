use hdrhistogram::Histogram;
use serde::Serialize;

/// HdrHistogram range: 1 μs → 60 s, 2 significant figures.
/// Anything slower saturates into the top bucket.
const HIST_LOW_US: u64 = 1;
const HIST_HIGH_US: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 2;

/// Fresh latency histogram with the bounds every accumulator shares.
pub(crate) fn new_histogram() -> Histogram<u64> {
    Histogram::<u64>::new_with_bounds(HIST_LOW_US, HIST_HIGH_US, HIST_SIGFIG)
        .expect("histogram creation")
}

/// Record an already-clamped millisecond duration (clamped to ≥ 1 μs).
pub(crate) fn record_ms(hist: &mut Histogram<u64>, elapsed_ms: f64) {
    let us = (elapsed_ms * 1000.0).round() as u64;
    hist.saturating_record(us.max(HIST_LOW_US));
}

/// Tail-latency breakdown for one accumulator, in milliseconds.
/// Flattened straight into the JSON report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileSet {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl PercentileSet {
    /// Extract the percentile set from a microsecond histogram.
    /// Returns zeroed values if the histogram is empty.
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::empty();
        }

        Self {
            p50_ms: hist.value_at_quantile(0.50) as f64 / 1000.0,
            p95_ms: hist.value_at_quantile(0.95) as f64 / 1000.0,
            p99_ms: hist.value_at_quantile(0.99) as f64 / 1000.0,
        }
    }

    /// All-zero placeholder used before any samples are recorded.
    pub fn empty() -> Self {
        Self {
            p50_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
        }
    }

    /// Pull bucket-quantized values back inside the exact observed range.
    pub fn clamped(self, min_ms: f64, max_ms: f64) -> Self {
        Self {
            p50_ms: self.p50_ms.clamp(min_ms, max_ms),
            p95_ms: self.p95_ms.clamp(min_ms, max_ms),
            p99_ms: self.p99_ms.clamp(min_ms, max_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_yields_zeroes() {
        let hist = new_histogram();
        assert_eq!(PercentileSet::from_histogram(&hist), PercentileSet::empty());
    }

    #[test]
    fn percentiles_are_ordered_and_near_recorded_values() {
        let mut hist = new_histogram();
        for ms in 1..=100 {
            record_ms(&mut hist, ms as f64);
        }
        let p = PercentileSet::from_histogram(&hist);
        assert!(p.p50_ms <= p.p95_ms && p.p95_ms <= p.p99_ms);
        assert!((p.p50_ms - 50.0).abs() < 1.0, "p50 was {}", p.p50_ms);
        assert!((p.p99_ms - 99.0).abs() < 1.5, "p99 was {}", p.p99_ms);
    }

    #[test]
    fn oversized_samples_saturate_instead_of_failing() {
        let mut hist = new_histogram();
        record_ms(&mut hist, 10.0 * 60_000.0);
        assert_eq!(hist.len(), 1);
    }

    #[test]
    fn clamped_stays_within_observed_range() {
        let p = PercentileSet {
            p50_ms: 0.001,
            p95_ms: 10.04,
            p99_ms: 10.04,
        }
        .clamped(0.0, 10.0);
        assert_eq!(p.p50_ms, 0.001);
        assert_eq!(p.p95_ms, 10.0);
        assert_eq!(p.p99_ms, 10.0);
    }
}
