//! Library collaborator
//!
//! The coordinator only ever asks the library to forget a track, to
//! refresh whatever view it presents and to log listens to the play history. [`SqliteLibrary`] is the adapter the
//! binary uses; it also resolves track ids for the HTTP surface.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{debug, info};
use vibe_common::{db, Track, TrackId};

#[async_trait]
pub trait Library: Send + Sync {
    /// Remove a track from the catalog
    async fn delete_track(&self, id: TrackId) -> Result<()>;

    /// Reload the presented track list
    async fn refresh_view(&self) -> Result<()>;

    /// Append a listen to the play history
    async fn record_playback(&self, id: TrackId, played_ms: u64) -> Result<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningStats {
    pub total_listening_ms: u64,
    pub top_tracks: Vec<db::TopTrack>,
}

/// SQLite catalog with an in-memory view of its tracks
pub struct SqliteLibrary {
    pool: SqlitePool,
    view: RwLock<Vec<Track>>,
}

impl SqliteLibrary {
    /// Open the catalog and load the initial view
    pub async fn open(pool: SqlitePool) -> Result<Self> {
        let tracks = db::list_tracks(&pool).await?;
        info!("Library view loaded with {} tracks", tracks.len());
        Ok(Self {
            pool,
            view: RwLock::new(tracks),
        })
    }

    /// Listening statistics from the play history
    pub async fn stats(&self, top: u32) -> Result<ListeningStats> {
        Ok(ListeningStats {
            total_listening_ms: db::total_listening_ms(&self.pool).await?,
            top_tracks: db::top_tracks(&self.pool, top).await?,
        })
    }

    /// Snapshot of the current view
    pub async fn tracks(&self) -> Vec<Track> {
        self.view.read().await.clone()
    }

    pub async fn find(&self, id: TrackId) -> Option<Track> {
        self.view.read().await.iter().find(|t| t.id == id).cloned()
    }

    /// Resolve ids in order; any unknown id fails the whole request
    pub async fn resolve(&self, ids: &[TrackId]) -> Result<Vec<Track>> {
        let view = self.view.read().await;
        ids.iter()
            .map(|id| {
                view.iter()
                    .find(|t| t.id == *id)
                    .cloned()
                    .ok_or(Error::TrackNotFound(*id))
            })
            .collect()
    }
}

#[async_trait]
impl Library for SqliteLibrary {
    async fn delete_track(&self, id: TrackId) -> Result<()> {
        db::delete_track(&self.pool, id).await.map_err(|e| match e {
            vibe_common::Error::NotFound(_) => Error::TrackNotFound(id),
            other => Error::Library(other.to_string()),
        })?;
        info!("Deleted track {} from library", id);
        Ok(())
    }

    async fn refresh_view(&self) -> Result<()> {
        let tracks = db::list_tracks(&self.pool).await?;
        debug!("Library view refreshed ({} tracks)", tracks.len());
        *self.view.write().await = tracks;
        Ok(())
    }

    async fn record_playback(&self, id: TrackId, played_ms: u64) -> Result<()> {
        db::record_playback(&self.pool, id, played_ms).await?;
        debug!("Recorded {} ms of track {}", played_ms, id);
        Ok(())
    }
}
