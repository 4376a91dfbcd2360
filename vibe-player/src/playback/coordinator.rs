//! Playback queue coordinator
//!
//! Owns queue order, the current position, repeat/shuffle policy and
//! playback status, and reconciles them with the events the engine reports.
//!
//! # Locking
//!
//! State lives behind a single `RwLock`. Every command and every event
//! reducer mutates inside one write-guard scope and releases it before
//! awaiting the engine, so mutations never interleave. Observer events are
//! derived by diffing the observable fields before and after each mutation.

use super::crossfade::{self, CrossfadeDecision, CrossfadeInput};
use super::healing::SelfHealer;
use super::state::{Dispatch, Listen, Observed, PlaybackSnapshot, PlayerState};
use crate::config::CoordinatorConfig;
use crate::engine::{AudioEngine, CommandGateway};
use crate::error::{Error, Result};
use crate::library::Library;
use crate::settings::CrossfadeSettings;
use crate::sync::{MediaKey, SyncEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use vibe_common::events::{
    EventBus, NoticeLevel, PlaybackStatus, PlayerEvent, QueueChangeTrigger, RepeatMode,
};
use vibe_common::{time, Track, TrackId};

pub struct Coordinator {
    state: RwLock<PlayerState>,
    gateway: CommandGateway,
    healer: SelfHealer,
    library: Arc<dyn Library>,
    settings: Arc<dyn CrossfadeSettings>,
    events: EventBus,
    config: CoordinatorConfig,
}

impl Coordinator {
    /// Create a coordinator with an empty queue in the Stopped state
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        library: Arc<dyn Library>,
        settings: Arc<dyn CrossfadeSettings>,
        config: CoordinatorConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(PlayerState::new(config.initial_volume)),
            gateway: CommandGateway::new(engine, config.command_timeout),
            healer: SelfHealer::new(library.clone()),
            library,
            settings,
            events: EventBus::new(config.event_capacity),
            config,
        })
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.state.read().await.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.state.read().await.current_track.clone()
    }

    /// Publish a user-visible notice
    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info => info!("Notice: {}", message),
            NoticeLevel::Warning => warn!("Notice: {}", message),
        }
        self.events.emit_lossy(PlayerEvent::Notice {
            level,
            message,
            timestamp: time::now(),
        });
    }

    // ========================================================================
    // Transport commands
    // ========================================================================

    /// Start `track`
    ///
    /// With a queue, the queue is replaced as given and `track` must be part
    /// of it; without, the queue becomes just `track`.
    pub async fn play(&self, track: Track, queue: Option<Vec<Track>>) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::Replace, |s| {
                let (tracks, index) = match queue {
                    Some(tracks) => {
                        let index = tracks
                            .iter()
                            .position(|t| t.id == track.id)
                            .ok_or(Error::TrackNotInQueue(track.id))?;
                        (tracks, index)
                    }
                    None => (vec![track.clone()], 0),
                };
                s.queue.replace(tracks, Some(index));
                Ok::<_, Error>(s.begin_load(index))
            })
            .await?;

        info!(track_id = %track.id, "Play '{}'", track.display_name());
        self.execute(dispatch).await
    }

    pub async fn pause(&self) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::Advance, |s| match s.status {
                PlaybackStatus::Playing | PlaybackStatus::Loading => {
                    s.status = PlaybackStatus::Paused;
                    Dispatch::Pause
                }
                _ => Dispatch::Nothing,
            })
            .await;
        self.execute(dispatch).await
    }

    /// Resume; from Stopped this re-issues play for the current entry
    pub async fn resume(&self) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::Advance, |s| match s.status {
                PlaybackStatus::Paused => {
                    s.status = PlaybackStatus::Playing;
                    Dispatch::Resume
                }
                PlaybackStatus::Stopped if s.current_track.is_some() => {
                    match s.queue.current_index() {
                        Some(index) => s.begin_load(index),
                        None => Dispatch::Nothing,
                    }
                }
                _ => Dispatch::Nothing,
            })
            .await;
        self.execute(dispatch).await
    }

    /// Stop playback, keeping the current track
    pub async fn stop(&self) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::Advance, |s| s.halt())
            .await;
        self.execute(dispatch).await
    }

    /// User skip; ignores repeat One
    ///
    /// The skipped track goes to the play history with the position reached.
    pub async fn next(&self) -> Result<()> {
        let (dispatch, listen) = self
            .mutate(QueueChangeTrigger::Advance, |s| {
                let listen = s.listen(s.position_ms);
                (s.plan_advance(false), listen)
            })
            .await;
        let result = self.execute(dispatch).await;
        self.record(listen).await;
        result
    }

    /// Move on after the current track ended (honors repeat One)
    pub async fn advance(&self) -> Result<()> {
        let (dispatch, listen) = self
            .mutate(QueueChangeTrigger::Advance, end_of_track)
            .await;
        let result = self.execute(dispatch).await;
        self.record(listen).await;
        result
    }

    /// Restart the current track, or step back when near its start
    pub async fn previous(&self) -> Result<()> {
        let threshold = self.config.restart_threshold_ms;
        let dispatch = self
            .mutate(QueueChangeTrigger::Advance, |s| {
                if s.position_ms > threshold && s.current_track.is_some() {
                    s.position_ms = 0;
                    s.last_seek_at = Some(Instant::now());
                    s.crossfade_token = None;
                    Dispatch::Seek(0)
                } else {
                    s.plan_previous()
                }
            })
            .await;

        if dispatch == Dispatch::Seek(0) {
            self.publish_progress().await;
        }
        self.execute(dispatch).await
    }

    /// Seek within the current track
    ///
    /// The position is written optimistically and progress ticks are ignored
    /// for the seek guard period.
    pub async fn seek(&self, position_ms: u64) -> Result<()> {
        let target = {
            let mut s = self.state.write().await;
            if s.current_track.is_none() {
                return Err(Error::InvalidState("nothing to seek in".to_string()));
            }
            let target = if s.duration_ms > 0 {
                position_ms.min(s.duration_ms)
            } else {
                position_ms
            };
            s.position_ms = target;
            s.last_seek_at = Some(Instant::now());
            // A seek can skip the ticks that would rearm the crossfade
            s.crossfade_token = None;
            target
        };

        debug!("Seek to {}", time::format_position(target));
        self.publish_progress().await;
        self.execute(Dispatch::Seek(target)).await
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        if !volume.is_finite() {
            return Err(Error::BadRequest(format!("invalid volume: {}", volume)));
        }
        let volume = volume.clamp(0.0, 1.0);
        let dispatch = self
            .mutate(QueueChangeTrigger::Advance, |s| {
                s.volume = volume;
                if volume > 0.0 {
                    s.previous_volume = volume;
                }
                Dispatch::SetVolume(volume)
            })
            .await;
        self.execute(dispatch).await
    }

    /// Mute, or restore the volume from before muting
    pub async fn toggle_mute(&self) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::Advance, |s| {
                if s.muted() {
                    s.volume = if s.previous_volume > 0.0 {
                        s.previous_volume
                    } else {
                        1.0
                    };
                } else {
                    s.previous_volume = s.volume;
                    s.volume = 0.0;
                }
                Dispatch::SetVolume(s.volume)
            })
            .await;
        self.execute(dispatch).await
    }

    /// Off → All → One → Off
    pub async fn toggle_repeat(&self) -> RepeatMode {
        self.mutate(QueueChangeTrigger::Advance, |s| {
            s.repeat = s.repeat.cycle();
            s.repeat
        })
        .await
    }

    /// Shuffle the queue around the current entry, or restore the order
    pub async fn toggle_shuffle(&self) -> bool {
        // The trigger depends on the flipped flag, so this cannot go through
        // `mutate`
        let (enable, before, after) = {
            let mut s = self.state.write().await;
            let before = s.observe();
            let enable = !s.shuffle;
            if enable {
                s.queue.shuffle_with(&mut rand::thread_rng());
            } else {
                s.queue.unshuffle();
            }
            s.shuffle = enable;
            (enable, before, s.observe())
        };

        let trigger = if enable {
            QueueChangeTrigger::Shuffle
        } else {
            QueueChangeTrigger::Unshuffle
        };
        self.publish_diff(trigger, &before, &after);
        enable
    }

    pub async fn set_dragging(&self, dragging: bool) {
        self.state.write().await.is_dragging = dragging;
    }

    // ========================================================================
    // Queue commands
    // ========================================================================

    /// Append, moving the track to the end if already queued
    pub async fn add_to_queue(&self, track: Track) {
        debug!(track_id = %track.id, "Add to queue");
        self.mutate(QueueChangeTrigger::UserEnqueue, |s| s.queue.enqueue(track))
            .await;
    }

    /// Queue right after the current entry
    pub async fn play_next(&self, track: Track) {
        debug!(track_id = %track.id, "Play next");
        self.mutate(QueueChangeTrigger::UserPlayNext, |s| {
            s.queue.enqueue_next(track)
        })
        .await;
    }

    /// Remove every occurrence of `track_id`
    ///
    /// Removing the playing entry stops playback and clears the current track.
    pub async fn remove_from_queue(&self, track_id: TrackId) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::UserDequeue, |s| {
                let outcome = s.queue.remove(track_id);
                if outcome.removed_current {
                    s.current_track = None;
                    s.duration_ms = 0;
                    s.halt()
                } else {
                    Dispatch::Nothing
                }
            })
            .await;
        self.execute(dispatch).await
    }

    /// Replace the order wholesale, keeping the current track by identity
    pub async fn reorder_queue(&self, order: Vec<Track>) {
        self.mutate(QueueChangeTrigger::UserReorder, |s| {
            s.queue.reorder(order);
            if let Some(track) = s.queue.current() {
                s.current_track = Some(track.clone());
            }
        })
        .await;
    }

    /// Drop everything except the current entry
    pub async fn clear_queue(&self) {
        self.mutate(QueueChangeTrigger::UserClear, |s| {
            s.queue.collapse_to_current()
        })
        .await;
    }

    /// Forget queue and current track, e.g. when the library context changes
    pub async fn reset(&self) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::Reset, |s| {
                s.queue.clear();
                s.current_track = None;
                s.duration_ms = 0;
                s.play_token += 1;
                s.halt()
            })
            .await;
        info!("Coordinator reset");
        self.execute(dispatch).await
    }

    /// Drop an unplayable track from the queue and move on
    ///
    /// Playback continues with the entry that followed the removed one; repeat
    /// One is not honored so a broken file cannot loop.
    pub async fn skip_unplayable(&self, track_id: TrackId) -> Result<()> {
        let dispatch = self
            .mutate(QueueChangeTrigger::SelfHealing, |s| {
                let old_index = s.queue.current_index();
                let was_current = s.current_track.as_ref().map(|t| t.id) == Some(track_id);
                let outcome = s.queue.remove(track_id);

                if was_current {
                    s.current_track = None;
                    s.duration_ms = 0;
                }

                if s.queue.is_empty() {
                    return s.halt();
                }

                match old_index {
                    Some(index) if outcome.removed_current => {
                        let candidate = index - outcome.removed_before;
                        if candidate < s.queue.len() {
                            s.begin_load(candidate)
                        } else if s.repeat == RepeatMode::All {
                            s.begin_load(0)
                        } else {
                            s.halt()
                        }
                    }
                    _ => s.plan_advance(false),
                }
            })
            .await;
        self.execute(dispatch).await
    }

    // ========================================================================
    // Event reduction
    // ========================================================================

    /// Reduce one normalized engine event
    pub async fn handle_event(&self, event: SyncEvent) {
        match event {
            SyncEvent::StatusChanged {
                playing,
                paused,
                volume,
                duration_ms,
            } => self.on_status(playing, paused, volume, duration_ms).await,
            SyncEvent::ProgressTick {
                position_ms,
                duration_ms,
            } => self.on_progress(position_ms, duration_ms).await,
            SyncEvent::Finished => self.on_finished().await,
            SyncEvent::Error { detail } => self.healer.recover(self, &detail).await,
            SyncEvent::MediaKey(key) => self.on_media_key(key).await,
        }
    }

    async fn on_status(&self, playing: bool, paused: bool, volume: Option<f32>, duration_ms: u64) {
        let reported = if paused {
            PlaybackStatus::Paused
        } else if playing {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Stopped
        };

        self.mutate(QueueChangeTrigger::Advance, |s| {
            // Engines report idle between stopping the old track and starting
            // the new one; that must not cancel a pending load
            if !(reported == PlaybackStatus::Stopped && s.status == PlaybackStatus::Loading) {
                s.status = reported;
            }
            if duration_ms > 0 && s.status != PlaybackStatus::Loading {
                s.duration_ms = duration_ms;
            }
            if let Some(v) = volume.filter(|v| v.is_finite()) {
                s.volume = v.clamp(0.0, 1.0);
                if s.volume > 0.0 {
                    s.previous_volume = s.volume;
                }
            }
        })
        .await;
    }

    async fn on_progress(&self, position_ms: u64, duration_ms: u64) {
        let now = Instant::now();
        let window_ms = self.settings.crossfade_window_ms();

        let (progress, fired) = {
            let mut s = self.state.write().await;

            if s.is_dragging {
                return;
            }
            if let Some(at) = s.last_seek_at {
                if now.duration_since(at) < self.config.seek_guard {
                    return;
                }
            }
            // Late ticks of a replaced or stopped track
            if !matches!(s.status, PlaybackStatus::Playing | PlaybackStatus::Paused) {
                return;
            }

            let duration_ms = if duration_ms > 0 { duration_ms } else { s.duration_ms };
            let decision = crossfade::plan(CrossfadeInput {
                position_ms,
                duration_ms,
                window_ms,
                has_next: crossfade::has_next(
                    s.queue.len(),
                    s.queue.current_index(),
                    s.repeat == RepeatMode::Off,
                ),
                is_transitioning: s.transitioning(),
            });

            let throttled = s
                .last_tick_at
                .is_some_and(|at| now.duration_since(at) < self.config.progress_throttle);
            let progress = if throttled {
                None
            } else {
                s.position_ms = position_ms;
                s.duration_ms = duration_ms;
                s.last_tick_at = Some(now);
                Some((s.current_track.as_ref().map(|t| t.id), position_ms, duration_ms))
            };

            // Advance under the same guard so no other transition can slip in
            // between the decision and the new load
            let fired = match decision {
                CrossfadeDecision::Fire => {
                    let before = s.observe();
                    let listen = s.listen(position_ms);
                    let dispatch = s.plan_advance(true);
                    if let Dispatch::Play { token, .. } = &dispatch {
                        s.crossfade_token = Some(*token);
                    }
                    Some((dispatch, listen, before, s.observe()))
                }
                CrossfadeDecision::Rearm => {
                    s.crossfade_token = None;
                    None
                }
                CrossfadeDecision::Idle => None,
            };

            (progress, fired)
        };

        if let Some((track_id, position_ms, duration_ms)) = progress {
            self.emit_progress(track_id, position_ms, duration_ms);
        }

        if let Some((dispatch, listen, before, after)) = fired {
            info!(position_ms, "Crossfade window reached, advancing");
            self.publish_diff(QueueChangeTrigger::Advance, &before, &after);
            if let Err(e) = self.execute(dispatch).await {
                warn!("Crossfade advance failed: {}", e);
            }
            self.record(listen).await;
        }
    }

    async fn on_finished(&self) {
        let outcome = self
            .mutate(QueueChangeTrigger::Advance, |s| {
                if s.transitioning() {
                    // End of the track the crossfade already moved away from
                    s.crossfade_token = None;
                    return None;
                }
                s.crossfade_token = None;
                if s.status == PlaybackStatus::Loading {
                    return None;
                }
                Some(end_of_track(s))
            })
            .await;

        let Some((dispatch, listen)) = outcome else {
            debug!("Ignoring finished event");
            return;
        };
        if let Err(e) = self.execute(dispatch).await {
            warn!("Advance after finished track failed: {}", e);
        }
        self.record(listen).await;
    }

    async fn on_media_key(&self, key: MediaKey) {
        debug!(?key, "Media key");
        let result = match key {
            MediaKey::Play => self.resume().await,
            MediaKey::Pause => self.pause().await,
            MediaKey::Toggle => {
                let playing = self.state.read().await.status == PlaybackStatus::Playing;
                if playing {
                    self.pause().await
                } else {
                    self.resume().await
                }
            }
            MediaKey::Next => self.next().await,
            MediaKey::Previous => self.previous().await,
            MediaKey::Stop => self.stop().await,
        };
        if let Err(e) = result {
            warn!("Media key {:?} failed: {}", key, e);
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Apply `f` atomically and publish whatever observable state it changed
    async fn mutate<T>(
        &self,
        trigger: QueueChangeTrigger,
        f: impl FnOnce(&mut PlayerState) -> T,
    ) -> T {
        let (result, before, after) = {
            let mut state = self.state.write().await;
            let before = state.observe();
            let result = f(&mut state);
            let after = state.observe();
            (result, before, after)
        };
        self.publish_diff(trigger, &before, &after);
        result
    }

    fn publish_diff(&self, trigger: QueueChangeTrigger, before: &Observed, after: &Observed) {
        let timestamp = time::now();

        if before.status != after.status {
            self.events.emit_lossy(PlayerEvent::PlaybackStateChanged {
                old_state: before.status,
                new_state: after.status,
                timestamp,
            });
        }
        if before.queue != after.queue || before.current_index != after.current_index {
            self.events.emit_lossy(PlayerEvent::QueueChanged {
                queue: after.queue.clone(),
                current_index: after.current_index,
                trigger,
                timestamp,
            });
        }
        if before.track_id != after.track_id || before.current_index != after.current_index {
            self.events.emit_lossy(PlayerEvent::TrackChanged {
                track_id: after.track_id,
                queue_index: after.current_index,
                timestamp,
            });
        }
        if before.repeat != after.repeat || before.shuffle != after.shuffle {
            self.events.emit_lossy(PlayerEvent::ModeChanged {
                repeat: after.repeat,
                shuffle: after.shuffle,
                timestamp,
            });
        }
        if before.volume != after.volume {
            self.events.emit_lossy(PlayerEvent::VolumeChanged {
                volume: after.volume,
                muted: after.volume <= 0.0,
                timestamp,
            });
        }
    }

    async fn publish_progress(&self) {
        let (track_id, position_ms, duration_ms) = {
            let s = self.state.read().await;
            (
                s.current_track.as_ref().map(|t| t.id),
                s.position_ms,
                s.duration_ms,
            )
        };
        self.emit_progress(track_id, position_ms, duration_ms);
    }

    fn emit_progress(&self, track_id: Option<TrackId>, position_ms: u64, duration_ms: u64) {
        self.events.emit_lossy(PlayerEvent::PlaybackProgress {
            track_id,
            position_ms,
            duration_ms,
            timestamp: time::now(),
        });
    }

    /// Add a listen to the play history; failures never affect playback
    async fn record(&self, listen: Option<Listen>) {
        let Some(Listen {
            track_id,
            played_ms,
        }) = listen
        else {
            return;
        };
        if let Err(e) = self.library.record_playback(track_id, played_ms).await {
            warn!(%track_id, "Failed to record playback: {}", e);
        }
    }

    /// Issue the engine call a transition decided on
    async fn execute(&self, dispatch: Dispatch) -> Result<()> {
        match dispatch {
            Dispatch::Nothing => Ok(()),
            Dispatch::Play { track, token } => {
                let Err(e) = self.gateway.play(&track, 0).await else {
                    return Ok(());
                };

                let current = self
                    .mutate(QueueChangeTrigger::Advance, |s| {
                        if s.play_token == token {
                            s.status = PlaybackStatus::Stopped;
                            s.position_ms = 0;
                            true
                        } else {
                            false
                        }
                    })
                    .await;

                if current {
                    error!(track_id = %track.id, "Failed to start playback: {}", e);
                } else {
                    debug!(token, "Ignoring failure of superseded play request: {}", e);
                }
                Err(e)
            }
            Dispatch::Stop => self.gateway.stop().await,
            Dispatch::Seek(position_ms) => self.gateway.seek(position_ms).await,
            Dispatch::Pause => self.gateway.pause().await,
            Dispatch::Resume => self.gateway.resume().await,
            Dispatch::SetVolume(volume) => self.gateway.set_volume(volume).await,
        }
    }
}

/// Natural end of the current track, which counts as listened in full
fn end_of_track(s: &mut PlayerState) -> (Dispatch, Option<Listen>) {
    let played_ms = if s.duration_ms > 0 {
        s.duration_ms
    } else {
        s.position_ms
    };
    let listen = s.listen(played_ms);
    (s.plan_advance(true), listen)
}
