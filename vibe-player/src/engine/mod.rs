//! Audio engine seam
//!
//! The engine that decodes and outputs audio lives outside this crate. It is
//! driven through [`AudioEngine`] commands and reports back on named push
//! channels carrying raw JSON payloads.

pub mod gateway;
pub mod simulated;

pub use gateway::CommandGateway;
pub use simulated::SimulatedEngine;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tokio::sync::broadcast;
use vibe_common::Track;

/// Engine push channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineChannel {
    /// Serialized playback state on every engine state change
    Status,
    /// Serialized playback state on every position tick
    Progress,
    /// Current track reached its end
    Finished,
    /// Probe/open/decode failure (string payload)
    Error,
    MediaPlay,
    MediaPause,
    MediaToggle,
    MediaNext,
    MediaPrev,
    MediaStop,
}

impl EngineChannel {
    /// Every channel, in subscription order
    pub const ALL: [EngineChannel; 10] = [
        EngineChannel::Status,
        EngineChannel::Progress,
        EngineChannel::Finished,
        EngineChannel::Error,
        EngineChannel::MediaPlay,
        EngineChannel::MediaPause,
        EngineChannel::MediaToggle,
        EngineChannel::MediaNext,
        EngineChannel::MediaPrev,
        EngineChannel::MediaStop,
    ];

    /// Wire name of the channel
    pub fn name(&self) -> &'static str {
        match self {
            EngineChannel::Status => "audio-playback-state",
            EngineChannel::Progress => "audio-playback-progress",
            EngineChannel::Finished => "audio-playback-finished",
            EngineChannel::Error => "audio-playback-error",
            EngineChannel::MediaPlay => "media-play",
            EngineChannel::MediaPause => "media-pause",
            EngineChannel::MediaToggle => "media-toggle",
            EngineChannel::MediaNext => "media-next",
            EngineChannel::MediaPrev => "media-prev",
            EngineChannel::MediaStop => "media-stop",
        }
    }
}

impl std::fmt::Display for EngineChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata the engine shows on OS media controls
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayMeta {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Option<String>,
    pub duration_ms: u64,
}

impl From<&Track> for DisplayMeta {
    fn from(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            artwork: track.artwork.clone(),
            duration_ms: track.duration_ms,
        }
    }
}

/// External audio-rendering engine
///
/// Commands resolve once the engine has accepted them. Outcomes (state,
/// progress, errors) arrive asynchronously on the push channels.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    async fn play(&self, path: &Path, meta: &DisplayMeta) -> Result<()>;
    async fn pause(&self) -> Result<()>;
    async fn resume(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn seek(&self, position_ms: u64) -> Result<()>;
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Subscribe to one push channel
    ///
    /// Registration is synchronous so no event emitted after this call
    /// returns can be missed.
    fn listen(&self, channel: EngineChannel) -> broadcast::Receiver<serde_json::Value>;
}
