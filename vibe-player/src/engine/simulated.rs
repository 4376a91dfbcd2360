//! Simulated audio engine
//!
//! Stands in for the external renderer in the bundled binary: no audio is
//! produced, but commands, state reports, progress, end-of-track and file
//! errors follow the real engine's event contract on a virtual clock.

use super::{AudioEngine, DisplayMeta, EngineChannel};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Progress tick period
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Duration assumed for tracks whose length the catalog does not know
const FALLBACK_DURATION_MS: u64 = 180_000;

const CHANNEL_CAPACITY: usize = 64;

/// Serialized engine playback state (status and progress payload)
#[derive(Debug, Clone, Serialize)]
struct EngineState {
    is_playing: bool,
    is_paused: bool,
    current_file: Option<PathBuf>,
    position_ms: u64,
    duration_ms: u64,
    volume: f32,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_paused: false,
            current_file: None,
            position_ms: 0,
            duration_ms: 0,
            volume: 1.0,
        }
    }
}

#[derive(Clone)]
struct Channels {
    senders: Arc<HashMap<EngineChannel, broadcast::Sender<Value>>>,
}

impl Channels {
    fn new() -> Self {
        let senders = EngineChannel::ALL
            .iter()
            .map(|&channel| (channel, broadcast::channel(CHANNEL_CAPACITY).0))
            .collect();
        Self {
            senders: Arc::new(senders),
        }
    }

    fn emit(&self, channel: EngineChannel, payload: Value) {
        if let Some(tx) = self.senders.get(&channel) {
            // No listener is fine; the event is simply not observed
            let _ = tx.send(payload);
        }
    }

    fn emit_state(&self, channel: EngineChannel, state: &EngineState) {
        match serde_json::to_value(state) {
            Ok(payload) => self.emit(channel, payload),
            Err(e) => warn!("Failed to serialize engine state: {}", e),
        }
    }
}

/// Engine with a virtual clock and no audio output
pub struct SimulatedEngine {
    channels: Channels,
    state: Arc<Mutex<EngineState>>,
    ticker: JoinHandle<()>,
}

impl SimulatedEngine {
    /// Create the engine and start its clock
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let channels = Channels::new();
        let state = Arc::new(Mutex::new(EngineState::default()));
        let ticker = tokio::spawn(run_clock(channels.clone(), Arc::clone(&state)));

        Self {
            channels,
            state,
            ticker,
        }
    }

    /// Inject an OS media-key press
    pub fn press_media_key(&self, channel: EngineChannel) -> Result<()> {
        match channel {
            EngineChannel::MediaPlay
            | EngineChannel::MediaPause
            | EngineChannel::MediaToggle
            | EngineChannel::MediaNext
            | EngineChannel::MediaPrev
            | EngineChannel::MediaStop => {
                debug!("Simulated media key: {}", channel);
                self.channels.emit(channel, Value::Null);
                Ok(())
            }
            other => Err(Error::BadRequest(format!("{} is not a media key", other))),
        }
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn run_clock(channels: Channels, state: Arc<Mutex<EngineState>>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let step = TICK_INTERVAL.as_millis() as u64;

    loop {
        interval.tick().await;

        let mut s = state.lock().await;
        if !s.is_playing || s.is_paused {
            continue;
        }

        s.position_ms = (s.position_ms + step).min(s.duration_ms);
        if s.position_ms >= s.duration_ms {
            // End of track: report idle, then finished
            s.is_playing = false;
            s.is_paused = false;
            channels.emit_state(EngineChannel::Status, &s);
            channels.emit(EngineChannel::Finished, Value::Null);
        } else {
            channels.emit_state(EngineChannel::Progress, &s);
        }
    }
}

#[async_trait]
impl AudioEngine for SimulatedEngine {
    async fn play(&self, path: &Path, meta: &DisplayMeta) -> Result<()> {
        let mut s = self.state.lock().await;

        if !path.exists() {
            // Command accepted; the open failure is reported asynchronously
            warn!("Simulated engine cannot open {}", path.display());
            s.is_playing = false;
            s.is_paused = false;
            s.current_file = None;
            self.channels.emit(
                EngineChannel::Error,
                Value::String(format!("Failed to open {}: file not found", path.display())),
            );
            return Ok(());
        }

        s.is_playing = true;
        s.is_paused = false;
        s.current_file = Some(path.to_path_buf());
        s.position_ms = 0;
        s.duration_ms = if meta.duration_ms > 0 {
            meta.duration_ms
        } else {
            FALLBACK_DURATION_MS
        };
        info!("Simulated playback of '{}' ({} ms)", meta.title, s.duration_ms);
        self.channels.emit_state(EngineChannel::Status, &s);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let mut s = self.state.lock().await;
        if s.is_playing {
            s.is_paused = true;
        }
        self.channels.emit_state(EngineChannel::Status, &s);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        let mut s = self.state.lock().await;
        if s.is_playing {
            s.is_paused = false;
        }
        self.channels.emit_state(EngineChannel::Status, &s);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut s = self.state.lock().await;
        let volume = s.volume;
        *s = EngineState {
            volume,
            ..EngineState::default()
        };
        self.channels.emit_state(EngineChannel::Status, &s);
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        let mut s = self.state.lock().await;
        if s.current_file.is_none() {
            return Err(Error::Engine("nothing loaded".to_string()));
        }
        s.position_ms = position_ms.min(s.duration_ms);
        self.channels.emit_state(EngineChannel::Progress, &s);
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        let mut s = self.state.lock().await;
        s.volume = volume.clamp(0.0, 1.0);
        self.channels.emit_state(EngineChannel::Status, &s);
        Ok(())
    }

    fn listen(&self, channel: EngineChannel) -> broadcast::Receiver<Value> {
        match self.channels.senders.get(&channel) {
            Some(tx) => tx.subscribe(),
            // Every channel is created in Channels::new; this arm is unreachable
            None => broadcast::channel(1).1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn meta(duration_ms: u64) -> DisplayMeta {
        DisplayMeta {
            title: "Song".to_string(),
            duration_ms,
            ..DisplayMeta::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_reports_status_then_finishes() {
        let file = NamedTempFile::new().unwrap();
        let engine = SimulatedEngine::new();
        let mut status = engine.listen(EngineChannel::Status);
        let mut finished = engine.listen(EngineChannel::Finished);

        engine.play(file.path(), &meta(500)).await.unwrap();
        let playing = status.recv().await.unwrap();
        assert_eq!(playing["is_playing"], true);
        assert_eq!(playing["duration_ms"], 500);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let idle = status.recv().await.unwrap();
        assert_eq!(idle["is_playing"], false);
        assert!(finished.recv().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_file_emits_error() {
        let engine = SimulatedEngine::new();
        let mut errors = engine.listen(EngineChannel::Error);

        engine
            .play(Path::new("/definitely/not/here.flac"), &meta(1000))
            .await
            .unwrap();

        let detail = errors.recv().await.unwrap();
        assert!(detail.as_str().unwrap().contains("here.flac"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_while_playing() {
        let file = NamedTempFile::new().unwrap();
        let engine = SimulatedEngine::new();
        let mut progress = engine.listen(EngineChannel::Progress);

        engine.play(file.path(), &meta(60_000)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        let tick = progress.recv().await.unwrap();
        assert!(tick["position_ms"].as_u64().unwrap() >= 250);
    }

    #[tokio::test]
    async fn test_press_media_key_rejects_non_key_channels() {
        let engine = SimulatedEngine::new();
        let mut next = engine.listen(EngineChannel::MediaNext);

        engine.press_media_key(EngineChannel::MediaNext).unwrap();
        assert!(next.recv().await.is_ok());
        assert!(engine.press_media_key(EngineChannel::Finished).is_err());
    }
}
