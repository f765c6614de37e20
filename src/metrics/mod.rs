pub mod aggregator;
pub mod percentiles;
pub mod stream;

pub use aggregator::{MetricsAggregator, MetricsReport};
pub use percentiles::LatencySummary;

/// One completed-request observation recorded by the timing middleware.
/// This is the "write" side — the middleware builds one per request and
/// pushes it into the aggregator after the final status is known.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Wall time of the full request/response cycle, milliseconds
    pub latency_ms: f64,
    /// HTTP method, e.g. "POST"
    pub method: String,
    /// Request path as routed, e.g. "/api/events"
    pub path: String,
    /// Final response status code
    pub status: u16,
}
