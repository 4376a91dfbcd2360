//! Runtime settings the coordinator reads on the hot path

use crate::error::Result;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use vibe_common::db;

/// Crossfade window source, read on every progress tick
pub trait CrossfadeSettings: Send + Sync {
    /// Trigger window in milliseconds; 0 disables crossfade advancement
    fn crossfade_window_ms(&self) -> u64;
}

/// Settings cached in memory, optionally written through to the database
pub struct SharedSettings {
    crossfade_window_ms: AtomicU64,
    db: Option<SqlitePool>,
}

impl SharedSettings {
    /// Memory-only settings
    pub fn new(crossfade_window_ms: u64) -> Self {
        Self {
            crossfade_window_ms: AtomicU64::new(crossfade_window_ms),
            db: None,
        }
    }

    /// Load from the settings table; later changes are persisted there
    pub async fn load(pool: SqlitePool) -> Result<Self> {
        let window = db::get_crossfade_window_ms(&pool).await?;
        info!("Crossfade window: {} ms", window);
        Ok(Self {
            crossfade_window_ms: AtomicU64::new(window),
            db: Some(pool),
        })
    }

    pub async fn set_crossfade_window_ms(&self, ms: u64) -> Result<()> {
        if let Some(pool) = &self.db {
            db::set_crossfade_window_ms(pool, ms).await?;
        }
        self.crossfade_window_ms.store(ms, Ordering::Relaxed);
        info!("Crossfade window set to {} ms", ms);
        Ok(())
    }
}

impl CrossfadeSettings for SharedSettings {
    fn crossfade_window_ms(&self) -> u64 {
        self.crossfade_window_ms.load(Ordering::Relaxed)
    }
}
