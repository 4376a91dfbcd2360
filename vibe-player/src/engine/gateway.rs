//! Command gateway
//!
//! Thin, stateless translation from coordinator intents to engine calls.
//! Every call is bounded by the command timeout and every failure comes back
//! as [`Error::Command`]; nothing is retried here.

use super::{AudioEngine, DisplayMeta};
use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use vibe_common::Track;

#[derive(Clone)]
pub struct CommandGateway {
    engine: Arc<dyn AudioEngine>,
    timeout: Duration,
}

impl CommandGateway {
    pub fn new(engine: Arc<dyn AudioEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// Start `track`, optionally from `position_ms`
    ///
    /// A non-zero start position is applied with a follow-up seek.
    pub async fn play(&self, track: &Track, position_ms: u64) -> Result<()> {
        let meta = DisplayMeta::from(track);
        debug!(track_id = %track.id, path = %track.path.display(), "engine play");
        self.dispatch("play", self.engine.play(&track.path, &meta))
            .await?;

        if position_ms > 0 {
            self.dispatch("seek", self.engine.seek(position_ms)).await?;
        }
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        self.dispatch("pause", self.engine.pause()).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.dispatch("resume", self.engine.resume()).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.dispatch("stop", self.engine.stop()).await
    }

    pub async fn seek(&self, position_ms: u64) -> Result<()> {
        self.dispatch("seek", self.engine.seek(position_ms)).await
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.dispatch("set_volume", self.engine.set_volume(volume))
            .await
    }

    async fn dispatch<F>(&self, command: &'static str, call: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!("Engine command '{}' failed: {}", command, e);
                let reason = match e {
                    Error::Command { reason, .. } => reason,
                    other => other.to_string(),
                };
                Err(Error::Command { command, reason })
            }
            Err(_) => {
                warn!(
                    "Engine command '{}' timed out after {} ms",
                    command,
                    self.timeout.as_millis()
                );
                Err(Error::Command {
                    command,
                    reason: format!("timed out after {} ms", self.timeout.as_millis()),
                })
            }
        }
    }
}
