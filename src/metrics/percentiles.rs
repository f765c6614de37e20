use serde::Serialize;

/// Percentile figures over the latency window, in milliseconds.
/// Serialized straight into the JSON metrics body and the SSE stream.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LatencySummary {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencySummary {
    /// All-zero placeholder used before any samples are recorded.
    pub fn empty() -> Self {
        Self {
            p50: 0.0,
            p95: 0.0,
            p99: 0.0,
        }
    }
}

/// Nearest-rank percentile: the value at rank `ceil(q × n)` in the
/// ascending-sorted sample (1-indexed), clamped into bounds. No
/// interpolation — reported figures must match other consumers of the
/// same rule bit for bit.
pub fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let rank = (q * n as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(n - 1);
    sorted[idx]
}
