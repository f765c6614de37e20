use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::metrics::stream;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Event ingestion ─────────────────────────────────────
        .route("/api/events", post(handlers::events::ingest_event))
        .route("/api/events/:id", get(handlers::events::get_event))
        .route(
            "/api/matches/:match_id/events",
            get(handlers::events::list_match_events),
        )
        // ── Metrics ─────────────────────────────────────────────
        .route("/api/metrics", get(stream::get_metrics))
        .route("/api/metrics/stream", get(stream::metrics_stream))
        .route("/metrics", get(stream::scrape_metrics))
        // ── Health ──────────────────────────────────────────────
        .route("/health", get(handlers::health::health))
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            timing::timing_middleware,
        ))
        .layer(CorsLayer::permissive())
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
}
