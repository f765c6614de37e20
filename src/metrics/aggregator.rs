use std::collections::VecDeque;
use std::fmt::Write;

use parking_lot::Mutex;
use serde::Serialize;

use super::percentiles::{nearest_rank, LatencySummary};
use super::Observation;

// ─── Configuration ───────────────────────────────────────────────

/// Sliding window of latency samples kept for percentile math.
/// Oldest sample is evicted one at a time once the cap is reached.
const WINDOW_CAPACITY: usize = 10_000;

/// The route whose successful ingestions count as "events processed".
const EVENT_INGEST_PATH: &str = "/api/events";

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe metrics engine.
/// The timing middleware calls `record()` once per finished request;
/// the scrape and JSON endpoints call `render()` / `report()`.
pub struct MetricsAggregator {
    inner: Mutex<Inner>,
}

/// Counters plus percentile figures, shipped as the JSON metrics body
/// and on every SSE tick.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub total_requests: u64,
    pub total_errors: u64,
    pub events_processed: u64,
    #[serde(flatten)]
    pub latency_ms: LatencySummary,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    /// Millisecond latencies in insertion order, at most `WINDOW_CAPACITY`.
    latencies: VecDeque<f64>,

    // Monotonic counters — never reset for the process lifetime
    total_requests: u64,
    total_errors: u64,
    events_processed: u64,
}

// ─── MetricsAggregator impl ──────────────────────────────────────

impl MetricsAggregator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Record one completed request. Called from the timing middleware
    /// for every request regardless of outcome. Never fails; latencies
    /// are stored exactly as given, without validation.
    pub fn record(&self, obs: Observation) {
        self.inner.lock().record(obs);
    }

    /// Percentile summary over the current window (nearest-rank).
    /// All zeroes before the first sample arrives.
    pub fn snapshot(&self) -> LatencySummary {
        self.inner.lock().summary()
    }

    /// Counters and percentiles as one consistent view.
    pub fn report(&self) -> MetricsReport {
        let inner = self.inner.lock();
        MetricsReport {
            total_requests: inner.total_requests,
            total_errors: inner.total_errors,
            events_processed: inner.events_processed,
            latency_ms: inner.summary(),
        }
    }

    /// Prometheus-style text exposition of all four metrics.
    /// Counters first, then the latency summary block. The whole body
    /// is built under one lock so scrapes never see a torn update.
    pub fn render(&self) -> String {
        let inner = self.inner.lock();
        let summary = inner.summary();

        let mut out = String::with_capacity(512);
        let _ = writeln!(
            out,
            "# HELP http_requests_total Total number of HTTP requests"
        );
        let _ = writeln!(out, "# TYPE http_requests_total counter");
        let _ = writeln!(out, "http_requests_total {}", inner.total_requests);
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "# HELP http_errors_total Total number of HTTP errors"
        );
        let _ = writeln!(out, "# TYPE http_errors_total counter");
        let _ = writeln!(out, "http_errors_total {}", inner.total_errors);
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "# HELP events_processed_total Total number of events processed"
        );
        let _ = writeln!(out, "# TYPE events_processed_total counter");
        let _ = writeln!(
            out,
            "events_processed_total {}",
            inner.events_processed
        );
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "# HELP http_request_duration_ms HTTP request latency in milliseconds"
        );
        let _ = writeln!(out, "# TYPE http_request_duration_ms summary");
        let _ = writeln!(
            out,
            "http_request_duration_ms{{quantile=\"0.5\"}} {}",
            summary.p50
        );
        let _ = writeln!(
            out,
            "http_request_duration_ms{{quantile=\"0.95\"}} {}",
            summary.p95
        );
        let _ = writeln!(
            out,
            "http_request_duration_ms{{quantile=\"0.99\"}} {}",
            summary.p99
        );

        out
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new() -> Self {
        Self {
            latencies: VecDeque::with_capacity(WINDOW_CAPACITY + 1),
            total_requests: 0,
            total_errors: 0,
            events_processed: 0,
        }
    }

    fn record(&mut self, obs: Observation) {
        // ── Window ──────────────────────────────────────────────
        self.latencies.push_back(obs.latency_ms);
        if self.latencies.len() > WINDOW_CAPACITY {
            self.latencies.pop_front();
        }

        // ── Counters ────────────────────────────────────────────
        self.total_requests += 1;
        if obs.status >= 500 {
            self.total_errors += 1;
        }
        if obs.method == "POST"
            && obs.path == EVENT_INGEST_PATH
            && obs.status == 202
        {
            self.events_processed += 1;
        }
    }

    fn summary(&self) -> LatencySummary {
        if self.latencies.is_empty() {
            return LatencySummary::empty();
        }

        let mut sorted: Vec<f64> = self.latencies.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        LatencySummary {
            p50: nearest_rank(&sorted, 0.5),
            p95: nearest_rank(&sorted, 0.95),
            p99: nearest_rank(&sorted, 0.99),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn obs(latency_ms: f64, method: &str, path: &str, status: u16) -> Observation {
        Observation {
            latency_ms,
            method: method.into(),
            path: path.into(),
            status,
        }
    }

    #[test]
    fn counters_track_every_observation() {
        let agg = MetricsAggregator::new();
        for i in 0..25u16 {
            agg.record(obs(1.0, "GET", "/api/events/abc", 200 + i % 2));
        }
        let report = agg.report();
        assert_eq!(report.total_requests, 25);
        assert_eq!(report.total_errors, 0);
        assert_eq!(report.events_processed, 0);
    }

    #[test]
    fn errors_counted_at_500_and_above() {
        let agg = MetricsAggregator::new();
        agg.record(obs(1.0, "GET", "/health", 499));
        agg.record(obs(1.0, "GET", "/health", 500));
        agg.record(obs(1.0, "GET", "/health", 503));
        assert_eq!(agg.report().total_errors, 2);
    }

    #[test]
    fn events_processed_requires_exact_triple() {
        let agg = MetricsAggregator::new();
        agg.record(obs(1.0, "POST", "/api/events", 202));
        // Each of these misses one leg of the predicate
        agg.record(obs(1.0, "GET", "/api/events", 202));
        agg.record(obs(1.0, "POST", "/api/events/abc", 202));
        agg.record(obs(1.0, "POST", "/api/events", 400));
        assert_eq!(agg.report().events_processed, 1);
    }

    #[test]
    fn nearest_rank_over_three_samples() {
        let agg = MetricsAggregator::new();
        for ms in [100.0, 200.0, 300.0] {
            agg.record(obs(ms, "GET", "/health", 200));
        }
        let s = agg.snapshot();
        assert_eq!(s.p50, 200.0);
        assert_eq!(s.p95, 300.0);
        assert_eq!(s.p99, 300.0);
    }

    #[test]
    fn empty_aggregator_snapshots_to_zero() {
        let s = MetricsAggregator::new().snapshot();
        assert_eq!(s.p50, 0.0);
        assert_eq!(s.p95, 0.0);
        assert_eq!(s.p99, 0.0);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let agg = MetricsAggregator::new();
        for ms in [5.0, 9.0, 2.0, 7.0] {
            agg.record(obs(ms, "GET", "/health", 200));
        }
        let a = agg.snapshot();
        let b = agg.snapshot();
        assert_eq!(a.p50, b.p50);
        assert_eq!(a.p95, b.p95);
        assert_eq!(a.p99, b.p99);
    }

    #[test]
    fn window_evicts_exactly_one_oldest_entry() {
        let agg = MetricsAggregator::new();
        for i in 0..=10_000u32 {
            agg.record(obs(f64::from(i), "GET", "/health", 200));
        }
        let inner = agg.inner.lock();
        assert_eq!(inner.latencies.len(), 10_000);
        // The very first sample (0.0) is the one that was evicted
        assert_eq!(inner.latencies.front().copied(), Some(1.0));
        assert_eq!(inner.latencies.back().copied(), Some(10_000.0));
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let agg = MetricsAggregator::new();
        for i in 0..12_345u32 {
            agg.record(obs(f64::from(i), "GET", "/health", 200));
            assert!(agg.inner.lock().latencies.len() <= 10_000);
        }
    }

    #[test]
    fn exposition_format_matches_exactly() {
        let agg = MetricsAggregator::new();
        agg.record(obs(42.0, "POST", "/api/events", 202));
        let expected = "\
# HELP http_requests_total Total number of HTTP requests
# TYPE http_requests_total counter
http_requests_total 1

# HELP http_errors_total Total number of HTTP errors
# TYPE http_errors_total counter
http_errors_total 0

# HELP events_processed_total Total number of events processed
# TYPE events_processed_total counter
events_processed_total 1

# HELP http_request_duration_ms HTTP request latency in milliseconds
# TYPE http_request_duration_ms summary
http_request_duration_ms{quantile=\"0.5\"} 42
http_request_duration_ms{quantile=\"0.95\"} 42
http_request_duration_ms{quantile=\"0.99\"} 42
";
        assert_eq!(agg.render(), expected);
    }

    #[test]
    fn exposition_has_three_quantile_lines_and_trailing_newline() {
        let agg = MetricsAggregator::new();
        agg.record(obs(3.5, "GET", "/health", 200));
        let body = agg.render();
        assert!(body.contains("http_requests_total 1"));
        assert!(body.ends_with('\n'));
        let quantile_lines = body
            .lines()
            .filter(|l| l.starts_with("http_request_duration_ms{quantile="))
            .count();
        assert_eq!(quantile_lines, 3);
    }

    #[test]
    fn concurrent_records_lose_no_updates() {
        let agg = Arc::new(MetricsAggregator::new());
        let threads = 8;
        let per_thread = 2_000;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let agg = agg.clone();
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        let status = if i % 10 == 0 { 500 } else { 200 };
                        agg.record(obs(
                            (t * per_thread + i) as f64,
                            "GET",
                            "/api/events/abc",
                            status,
                        ));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let report = agg.report();
        assert_eq!(report.total_requests, (threads * per_thread) as u64);
        assert_eq!(report.total_errors, (threads * per_thread / 10) as u64);
    }
}
