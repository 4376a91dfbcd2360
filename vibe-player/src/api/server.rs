//! HTTP server setup and routing
//!
//! Sets up the Axum router for control endpoints and SSE.

use crate::error::{Error, Result};
use crate::library::SqliteLibrary;
use crate::playback::Coordinator;
use crate::settings::SharedSettings;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{handlers, sse};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub coordinator: Arc<Coordinator>,
    /// Resolves track ids in requests
    pub library: Arc<SqliteLibrary>,
    pub settings: Arc<SharedSettings>,
}

/// Build the router with every control route
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))

        // Playback control
        .route("/playback/state", get(handlers::get_playback_state))
        .route("/playback/play", post(handlers::play))
        .route("/playback/pause", post(handlers::pause))
        .route("/playback/resume", post(handlers::resume))
        .route("/playback/stop", post(handlers::stop))
        .route("/playback/next", post(handlers::skip_next))
        .route("/playback/previous", post(handlers::skip_previous))
        .route("/playback/seek", post(handlers::seek))
        .route("/playback/volume", post(handlers::set_volume))
        .route("/playback/mute", post(handlers::toggle_mute))
        .route("/playback/shuffle", post(handlers::toggle_shuffle))
        .route("/playback/repeat", post(handlers::toggle_repeat))
        .route("/playback/drag", post(handlers::set_dragging))
        .route("/playback/reset", post(handlers::reset))

        // Queue management
        .route("/queue", get(handlers::get_queue))
        .route("/queue/add", post(handlers::add_to_queue))
        .route("/queue/next", post(handlers::play_next))
        .route("/queue/order", put(handlers::reorder_queue))
        .route("/queue/clear", post(handlers::clear_queue))
        .route("/queue/:track_id", delete(handlers::remove_from_queue))

        // Library and settings
        .route("/library/tracks", get(handlers::list_tracks))
        .route("/library/stats", get(handlers::listening_stats))
        .route("/settings/crossfade", put(handlers::set_crossfade))

        // SSE event stream
        .route("/events", get(sse::event_stream))

        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Serve the API until `shutdown` resolves
pub async fn run(
    ctx: AppContext,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
