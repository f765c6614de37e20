use std::sync::Arc;

mod handlers;
mod metrics;
mod middleware;
mod redis_client;
mod server;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Cloneable async Redis connection (auto-reconnects).
    pub redis: redis::aio::ConnectionManager,

    /// Central metrics engine — the timing middleware pushes
    /// observations, the scrape/JSON/SSE endpoints read them back.
    pub metrics: Arc<metrics::MetricsAggregator>,
}

#[tokio::main]
async fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   ⚽  MATCHPULSE — LIVE MATCH EVENT TRACKER      ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Configuration ─────────────────────────────────────────
    let redis_url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379/".into());
    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    // ── 2. Connect to Redis ──────────────────────────────────────
    println!("🔌 Connecting to Redis at {redis_url}...");
    let redis_conn = redis_client::connect(&redis_url).await;
    println!("   ✓ connected");

    // ── 3. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState {
        redis: redis_conn,
        metrics: Arc::new(metrics::MetricsAggregator::new()),
    });

    // ── 4. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 5. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("❌ Failed to bind {bind_addr}: {e}");
            std::process::exit(1);
        });

    println!();
    println!("Server listening on http://{bind_addr}");
    println!("Ingest events   → POST /api/events");
    println!("Metrics scrape  → GET  /metrics");
    println!("Metrics JSON    → GET  /api/metrics");
    println!("Metrics SSE     → GET  /api/metrics/stream");
    println!();

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
