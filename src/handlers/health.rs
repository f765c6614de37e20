use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub redis: &'static str,
}

// ─── GET /health ─────────────────────────────────────────────────
/// Liveness probe. Degraded (503) when Redis stops answering PING,
/// since ingestion cannot make progress without it.

pub async fn health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthStatus>) {
    let mut conn = state.redis.clone();
    let pong: redis::RedisResult<String> =
        redis::cmd("PING").query_async(&mut conn).await;

    match pong {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                redis: "up",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "degraded",
                redis: "down",
            }),
        ),
    }
}
