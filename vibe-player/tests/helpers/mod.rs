//! Test helpers for vibe-player integration tests
//!
//! - RecordingEngine: engine double that records commands and lets tests push
//!   raw payloads on any channel
//! - MockLibrary: library double recording deletes, refreshes and listens
//! - Track builders and a coordinator factory

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use vibe_common::{Track, TrackId};
use vibe_player::config::CoordinatorConfig;
use vibe_player::engine::{AudioEngine, DisplayMeta, EngineChannel};
use vibe_player::library::Library;
use vibe_player::settings::SharedSettings;
use vibe_player::sync::SyncEvent;
use vibe_player::{Coordinator, Error, Result};

// ============================================================================
// Engine double
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Play(PathBuf),
    Pause,
    Resume,
    Stop,
    Seek(u64),
    SetVolume(f32),
}

pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    fail_play: AtomicBool,
    play_delay: Mutex<Option<Duration>>,
    listens: AtomicUsize,
    senders: HashMap<EngineChannel, broadcast::Sender<Value>>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        let senders = EngineChannel::ALL
            .iter()
            .map(|&c| (c, broadcast::channel(64).0))
            .collect();
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_play: AtomicBool::new(false),
            play_delay: Mutex::new(None),
            listens: AtomicUsize::new(0),
            senders,
        })
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<EngineCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn play_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Play(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make subsequent play commands fail
    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    /// Delay subsequent play commands
    pub fn set_play_delay(&self, delay: Option<Duration>) {
        *self.play_delay.lock().unwrap() = delay;
    }

    /// Number of listen() registrations so far
    pub fn listen_count(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }

    /// Push a raw payload; returns the number of receivers
    pub fn emit(&self, channel: EngineChannel, payload: Value) -> usize {
        self.senders[&channel].send(payload).unwrap_or(0)
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioEngine for RecordingEngine {
    async fn play(&self, path: &Path, _meta: &DisplayMeta) -> Result<()> {
        // Outcome is decided when the command is issued
        let fail = self.fail_play.load(Ordering::SeqCst);
        let delay = *self.play_delay.lock().unwrap();
        self.record(EngineCall::Play(path.to_path_buf()));

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(Error::Engine(format!("cannot open {}", path.display())));
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.record(EngineCall::Pause);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.record(EngineCall::Resume);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.record(EngineCall::Stop);
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        self.record(EngineCall::Seek(position_ms));
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        self.record(EngineCall::SetVolume(volume));
        Ok(())
    }

    fn listen(&self, channel: EngineChannel) -> broadcast::Receiver<Value> {
        self.listens.fetch_add(1, Ordering::SeqCst);
        self.senders[&channel].subscribe()
    }
}

// ============================================================================
// Library double
// ============================================================================

#[derive(Default)]
pub struct MockLibrary {
    deleted: Mutex<Vec<TrackId>>,
    refreshes: AtomicUsize,
    fail_delete: AtomicBool,
    history: Mutex<Vec<(TrackId, u64)>>,
    fail_history: AtomicBool,
}

impl MockLibrary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<TrackId> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    /// Recorded listens as (track id, played ms)
    pub fn history(&self) -> Vec<(i64, u64)> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .map(|(id, ms)| (id.0, *ms))
            .collect()
    }
}

#[async_trait]
impl Library for MockLibrary {
    async fn delete_track(&self, id: TrackId) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::Library("catalog is read-only".to_string()));
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn refresh_view(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn record_playback(&self, id: TrackId, played_ms: u64) -> Result<()> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(Error::Library("history is unavailable".to_string()));
        }
        self.history.lock().unwrap().push((id, played_ms));
        Ok(())
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn track(id: i64) -> Track {
    Track {
        id: TrackId(id),
        path: PathBuf::from(format!("/music/track-{}.flac", id)),
        title: format!("Track {}", id),
        artist: "Artist".to_string(),
        album: "Album".to_string(),
        artwork: None,
        duration_ms: 200_000,
    }
}

pub fn tracks(ids: &[i64]) -> Vec<Track> {
    ids.iter().map(|&id| track(id)).collect()
}

pub struct Harness {
    pub coordinator: Arc<Coordinator>,
    pub engine: Arc<RecordingEngine>,
    pub library: Arc<MockLibrary>,
    pub settings: Arc<SharedSettings>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        let engine = RecordingEngine::new();
        let library = MockLibrary::new();
        let settings = Arc::new(SharedSettings::new(0));
        let coordinator = Coordinator::new(
            engine.clone(),
            library.clone(),
            settings.clone(),
            config,
        );
        Self {
            coordinator,
            engine,
            library,
            settings,
        }
    }

    /// Engine confirms playback
    pub async fn confirm_playing(&self) {
        self.coordinator
            .handle_event(SyncEvent::StatusChanged {
                playing: true,
                paused: false,
                volume: None,
                duration_ms: 0,
            })
            .await;
    }

    pub async fn tick(&self, position_ms: u64) {
        self.coordinator
            .handle_event(SyncEvent::ProgressTick {
                position_ms,
                duration_ms: 200_000,
            })
            .await;
    }

    pub async fn finish(&self) {
        self.coordinator.handle_event(SyncEvent::Finished).await;
    }

    /// Play `ids[index]` with the whole list as queue, confirmed by the engine
    pub async fn start(&self, ids: &[i64], index: usize) {
        let queue = tracks(ids);
        self.coordinator
            .play(queue[index].clone(), Some(queue))
            .await
            .unwrap();
        self.confirm_playing().await;
    }

    pub async fn current_id(&self) -> Option<i64> {
        self.coordinator
            .snapshot()
            .await
            .current_track
            .map(|t| t.id.0)
    }

    pub async fn queue_ids(&self) -> Vec<i64> {
        self.coordinator
            .snapshot()
            .await
            .queue
            .iter()
            .map(|t| t.id.0)
            .collect()
    }
}

/// Status payload as the engine serializes it
pub fn status_payload(playing: bool, paused: bool) -> Value {
    json!({
        "is_playing": playing,
        "is_paused": paused,
        "current_file": null,
        "position_ms": 0,
        "duration_ms": 200000,
        "volume": 1.0
    })
}

/// Poll `check` until it returns true or a second of (virtual) time passes
pub async fn wait_until<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
