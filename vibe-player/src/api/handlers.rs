//! HTTP request handlers
//!
//! Thin adapters from JSON requests to coordinator commands. Track ids are
//! resolved against the library view before reaching the coordinator.

use crate::api::server::AppContext;
use crate::error::Error;
use crate::library::ListeningStats;
use crate::playback::PlaybackSnapshot;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use vibe_common::events::RepeatMode;
use vibe_common::{Track, TrackId};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

type ApiError = (StatusCode, Json<StatusResponse>);

const TOP_TRACKS: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    track_id: TrackId,
    /// Replacement queue, in play order; must contain `track_id`
    #[serde(default)]
    queue: Option<Vec<TrackId>>,
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    track_id: TrackId,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    position_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    /// 0.0-1.0
    volume: f32,
}

#[derive(Debug, Deserialize)]
pub struct DragRequest {
    dragging: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    track_ids: Vec<TrackId>,
}

#[derive(Debug, Deserialize)]
pub struct CrossfadeRequest {
    window_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    queue: Vec<Track>,
    current_index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ShuffleResponse {
    shuffle: bool,
}

#[derive(Debug, Serialize)]
pub struct RepeatResponse {
    repeat: RepeatMode,
}

#[derive(Debug, Serialize)]
pub struct TrackListResponse {
    tracks: Vec<Track>,
}

fn ok() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// Map a coordinator error onto an HTTP status
fn error_response(e: Error) -> ApiError {
    let status = match &e {
        Error::TrackNotFound(_) => StatusCode::NOT_FOUND,
        Error::BadRequest(_) | Error::TrackNotInQueue(_) | Error::InvalidState(_) => {
            StatusCode::BAD_REQUEST
        }
        Error::Command { .. } | Error::Engine(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }

    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

async fn resolve_track(ctx: &AppContext, id: TrackId) -> Result<Track, ApiError> {
    ctx.library
        .find(id)
        .await
        .ok_or_else(|| error_response(Error::TrackNotFound(id)))
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "vibe-player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Playback Endpoints
// ============================================================================

/// GET /playback/state - Full coordinator snapshot
pub async fn get_playback_state(State(ctx): State<AppContext>) -> Json<PlaybackSnapshot> {
    Json(ctx.coordinator.snapshot().await)
}

/// POST /playback/play - Play a track, optionally replacing the queue
pub async fn play(
    State(ctx): State<AppContext>,
    Json(req): Json<PlayRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let track = resolve_track(&ctx, req.track_id).await?;
    let queue = match req.queue {
        Some(ids) => Some(ctx.library.resolve(&ids).await.map_err(error_response)?),
        None => None,
    };

    ctx.coordinator
        .play(track, queue)
        .await
        .map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/pause
pub async fn pause(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator.pause().await.map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/resume
pub async fn resume(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator.resume().await.map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/stop
pub async fn stop(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator.stop().await.map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/next - Skip to the next entry
pub async fn skip_next(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator.next().await.map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/previous - Restart or go back one entry
pub async fn skip_previous(
    State(ctx): State<AppContext>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator.previous().await.map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/seek
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator
        .seek(req.position_ms)
        .await
        .map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator
        .set_volume(req.volume)
        .await
        .map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/mute - Toggle mute
pub async fn toggle_mute(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator.toggle_mute().await.map_err(error_response)?;
    Ok(ok())
}

/// POST /playback/shuffle - Toggle shuffle
pub async fn toggle_shuffle(State(ctx): State<AppContext>) -> Json<ShuffleResponse> {
    let shuffle = ctx.coordinator.toggle_shuffle().await;
    info!("Shuffle {}", if shuffle { "on" } else { "off" });
    Json(ShuffleResponse { shuffle })
}

/// POST /playback/repeat - Cycle repeat mode
pub async fn toggle_repeat(State(ctx): State<AppContext>) -> Json<RepeatResponse> {
    let repeat = ctx.coordinator.toggle_repeat().await;
    info!("Repeat mode: {}", repeat);
    Json(RepeatResponse { repeat })
}

/// POST /playback/drag - Seek bar drag started/ended
pub async fn set_dragging(
    State(ctx): State<AppContext>,
    Json(req): Json<DragRequest>,
) -> Json<StatusResponse> {
    ctx.coordinator.set_dragging(req.dragging).await;
    ok()
}

/// POST /playback/reset - Clear queue and current track
pub async fn reset(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator.reset().await.map_err(error_response)?;
    Ok(ok())
}

// ============================================================================
// Queue Endpoints
// ============================================================================

/// GET /queue
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<QueueResponse> {
    let snapshot = ctx.coordinator.snapshot().await;
    Json(QueueResponse {
        queue: snapshot.queue,
        current_index: snapshot.current_index,
    })
}

/// POST /queue/add - Append (or move to the end)
pub async fn add_to_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let track = resolve_track(&ctx, req.track_id).await?;
    ctx.coordinator.add_to_queue(track).await;
    Ok(ok())
}

/// POST /queue/next - Queue right after the current entry
pub async fn play_next(
    State(ctx): State<AppContext>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let track = resolve_track(&ctx, req.track_id).await?;
    ctx.coordinator.play_next(track).await;
    Ok(ok())
}

/// DELETE /queue/:track_id
pub async fn remove_from_queue(
    State(ctx): State<AppContext>,
    Path(track_id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.coordinator
        .remove_from_queue(TrackId(track_id))
        .await
        .map_err(error_response)?;
    Ok(ok())
}

/// PUT /queue/order - Replace the queue order
pub async fn reorder_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let order = ctx
        .library
        .resolve(&req.track_ids)
        .await
        .map_err(error_response)?;
    ctx.coordinator.reorder_queue(order).await;
    Ok(ok())
}

/// POST /queue/clear - Keep only the current entry
pub async fn clear_queue(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.coordinator.clear_queue().await;
    ok()
}

// ============================================================================
// Library and Settings Endpoints
// ============================================================================

/// GET /library/tracks
pub async fn list_tracks(State(ctx): State<AppContext>) -> Json<TrackListResponse> {
    Json(TrackListResponse {
        tracks: ctx.library.tracks().await,
    })
}

/// GET /library/stats - Listening totals and the most played tracks
pub async fn listening_stats(
    State(ctx): State<AppContext>,
) -> Result<Json<ListeningStats>, ApiError> {
    let stats = ctx
        .library
        .stats(TOP_TRACKS)
        .await
        .map_err(error_response)?;
    Ok(Json(stats))
}

/// PUT /settings/crossfade - Change the crossfade trigger window
pub async fn set_crossfade(
    State(ctx): State<AppContext>,
    Json(req): Json<CrossfadeRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.settings
        .set_crossfade_window_ms(req.window_ms)
        .await
        .map_err(error_response)?;
    Ok(ok())
}
