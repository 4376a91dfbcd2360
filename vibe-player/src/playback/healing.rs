//! Self-healing on engine playback errors
//!
//! An engine error almost always means the current file vanished or cannot
//! be decoded. The track is dropped from the library, the user is told, and
//! playback moves on without it.

use super::coordinator::Coordinator;
use crate::library::Library;
use std::sync::Arc;
use tracing::{error, warn};
use vibe_common::events::NoticeLevel;

pub struct SelfHealer {
    library: Arc<dyn Library>,
}

impl SelfHealer {
    pub fn new(library: Arc<dyn Library>) -> Self {
        Self { library }
    }

    /// React to an engine error reported with `detail`
    ///
    /// Always publishes a notice. With a current track, that track is deleted
    /// from the library (refreshing its view on success) and skipped.
    pub async fn recover(&self, coordinator: &Coordinator, detail: &str) {
        let Some(track) = coordinator.current_track().await else {
            warn!("Playback error with nothing loaded: {}", detail);
            coordinator.notify(NoticeLevel::Warning, format!("Playback error: {}", detail));
            return;
        };

        error!(track_id = %track.id, path = %track.path.display(), "Playback error: {}", detail);

        match self.library.delete_track(track.id).await {
            Ok(()) => {
                if let Err(e) = self.library.refresh_view().await {
                    warn!("Library refresh after deleting track {} failed: {}", track.id, e);
                }
                coordinator.notify(
                    NoticeLevel::Info,
                    format!(
                        "Removed '{}' from the library: file could not be played",
                        track.display_name()
                    ),
                );
            }
            Err(e) => {
                warn!("Could not delete track {} from library: {}", track.id, e);
                coordinator.notify(
                    NoticeLevel::Warning,
                    format!("File not found: {}", track.path.display()),
                );
            }
        }

        if let Err(e) = coordinator.skip_unplayable(track.id).await {
            warn!("Skipping unplayable track {} failed: {}", track.id, e);
        }
    }
}
