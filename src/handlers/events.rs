use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

use super::AppError;

// ─── Domain types ────────────────────────────────────────────────

/// One discrete in-match occurrence: a goal, a card, a substitution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: String,
    pub match_id: String,
    pub event_type: String,
    pub team: String,
    pub player: Option<String>,
    /// Match minute the event occurred at (incl. stoppage time)
    pub minute: u16,
    pub recorded_at: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestEventRequest {
    pub match_id: String,
    pub event_type: String,
    pub team: String,
    #[serde(default)]
    pub player: Option<String>,
    pub minute: u16,
}

// Upper bound with generous stoppage time; anything above is a typo.
const MAX_MINUTE: u16 = 150;

// ─── POST /api/events ────────────────────────────────────────────

pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestEventRequest>,
) -> Result<(StatusCode, Json<MatchEvent>), AppError> {
    if req.match_id.trim().is_empty() {
        return Err(AppError::BadRequest("match_id must not be empty".into()));
    }
    if req.event_type.trim().is_empty() {
        return Err(AppError::BadRequest("event_type must not be empty".into()));
    }
    if req.minute > MAX_MINUTE {
        return Err(AppError::BadRequest(format!(
            "minute must be at most {MAX_MINUTE}"
        )));
    }

    let event = MatchEvent {
        id: format!("evt_{}", &uuid::Uuid::new_v4().to_string()[..8]),
        match_id: req.match_id,
        event_type: req.event_type,
        team: req.team,
        player: req.player,
        minute: req.minute,
        recorded_at: chrono::Utc::now().to_rfc3339(),
    };

    let json_str = serde_json::to_string(&event)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // One round-trip: store the blob and index it under its match
    let mut conn = state.redis.clone();
    let mut pipe = redis::pipe();
    pipe.cmd("SET")
        .arg(format!("event:{}", event.id))
        .arg(&json_str)
        .ignore()
        .cmd("RPUSH")
        .arg(format!("match:{}:events", event.match_id))
        .arg(&event.id)
        .ignore();
    let _: () = pipe
        .query_async(&mut conn)
        .await
        .map_err(|e| AppError::Redis(e.to_string()))?;

    // 202: the event is queued for downstream consumers, not "created"
    Ok((StatusCode::ACCEPTED, Json(event)))
}

// ─── GET /api/events/:id ─────────────────────────────────────────

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MatchEvent>, AppError> {
    let mut conn = state.redis.clone();
    let maybe_json: Option<String> = conn
        .get(format!("event:{id}"))
        .await
        .map_err(|e| AppError::Redis(e.to_string()))?;

    let json_str = maybe_json
        .ok_or_else(|| AppError::NotFound(format!("event '{id}' not found")))?;

    let event: MatchEvent = serde_json::from_str(&json_str)
        .map_err(|e| AppError::Internal(format!("corrupt event data: {e}")))?;

    Ok(Json(event))
}

// ─── GET /api/matches/:match_id/events ───────────────────────────

pub async fn list_match_events(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
) -> Result<Json<Vec<MatchEvent>>, AppError> {
    let mut conn = state.redis.clone();
    let ids: Vec<String> = conn
        .lrange(format!("match:{match_id}:events"), 0, -1)
        .await
        .map_err(|e| AppError::Redis(e.to_string()))?;

    if ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let mut pipe = redis::pipe();
    for id in &ids {
        pipe.cmd("GET").arg(format!("event:{id}"));
    }
    let blobs: Vec<Option<String>> = pipe
        .query_async(&mut conn)
        .await
        .map_err(|e| AppError::Redis(e.to_string()))?;

    // Ids whose blob has expired or vanished are skipped, not fatal
    let mut events = Vec::with_capacity(blobs.len());
    for blob in blobs.into_iter().flatten() {
        let event: MatchEvent = serde_json::from_str(&blob)
            .map_err(|e| AppError::Internal(format!("corrupt event data: {e}")))?;
        events.push(event);
    }

    Ok(Json(events))
}
