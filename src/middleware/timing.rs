use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Observation;
use crate::AppState;

/// Tower-compatible middleware wrapping every route. Measures wall
/// time, adds two response headers:
///
///   X-Response-Time-Ms  — total handler wall time in milliseconds
///   Server-Timing       — same value in the standard Server-Timing format
///
/// and records exactly one observation into the metrics aggregator
/// once the final status is known. Also prints a coloured one-liner
/// to stdout for development.
pub async fn timing_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let status = response.status().as_u16();

    // ── Feed the aggregator ─────────────────────────────────────
    state.metrics.record(Observation {
        latency_ms,
        method: method.to_string(),
        path: path.clone(),
        status,
    });

    // ── Inject response headers ─────────────────────────────────
    if let Ok(val) = format!("{latency_ms:.3}").parse() {
        response.headers_mut().insert("X-Response-Time-Ms", val);
    }

    let server_timing = format!("total;dur={latency_ms:.3}");
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("Server-Timing", val);
    }

    // ── Console log ─────────────────────────────────────────────
    let colour = match status {
        200..=299 => "\x1b[32m", // green
        400..=499 => "\x1b[33m", // yellow
        _ => "\x1b[31m",        // red
    };
    // Skip noisy scrape / SSE requests
    if !path.starts_with("/metrics") && !path.contains("/stream") {
        println!(
            "  {colour}{status}\x1b[0m  {method:<5} {path:<35} {latency_ms:>9.3}ms"
        );
    }

    response
}
