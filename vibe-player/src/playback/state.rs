//! Coordinator state model
//!
//! Everything here is plain data plus synchronous transitions. The
//! coordinator applies transitions under its write lock and turns the
//! returned [`Dispatch`] into an engine call after the lock is released.

use super::queue::PlayQueue;
use serde::Serialize;
use tokio::time::Instant;
use vibe_common::events::{PlaybackStatus, RepeatMode};
use vibe_common::{Track, TrackId};

/// Engine call decided by a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Nothing,
    /// Start `track`; `token` identifies this request
    Play { track: Track, token: u64 },
    Stop,
    Seek(u64),
    Pause,
    Resume,
    SetVolume(f32),
}

/// A finished or skipped listen, handed to the play history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listen {
    pub track_id: TrackId,
    pub played_ms: u64,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub queue: PlayQueue,
    /// Last loaded track; survives the queue running out
    pub current_track: Option<Track>,
    pub status: PlaybackStatus,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub volume: f32,
    /// Restored by unmute
    pub previous_volume: f32,
    /// Play token of the load a crossfade fired; the guard only holds while
    /// that load is still the current one
    pub crossfade_token: Option<u64>,
    pub is_dragging: bool,
    pub last_seek_at: Option<Instant>,
    pub last_tick_at: Option<Instant>,
    /// Bumped on every play dispatch
    pub play_token: u64,
}

impl PlayerState {
    pub fn new(initial_volume: f32) -> Self {
        Self {
            queue: PlayQueue::new(),
            current_track: None,
            status: PlaybackStatus::Stopped,
            repeat: RepeatMode::Off,
            shuffle: false,
            position_ms: 0,
            duration_ms: 0,
            volume: initial_volume,
            previous_volume: if initial_volume > 0.0 { initial_volume } else { 1.0 },
            crossfade_token: None,
            is_dragging: false,
            last_seek_at: None,
            last_tick_at: None,
            play_token: 0,
        }
    }

    /// Load queue entry `index`: Loading, position reset, new play token
    pub fn begin_load(&mut self, index: usize) -> Dispatch {
        let Some(track) = self.queue.get(index).cloned() else {
            return Dispatch::Nothing;
        };

        self.queue.set_current(Some(index));
        self.current_track = Some(track.clone());
        self.status = PlaybackStatus::Loading;
        self.position_ms = 0;
        self.duration_ms = track.duration_ms;
        self.last_seek_at = None;
        self.last_tick_at = None;
        self.play_token += 1;

        Dispatch::Play {
            track,
            token: self.play_token,
        }
    }

    /// Stopped at position 0; the current track is kept
    pub fn halt(&mut self) -> Dispatch {
        self.status = PlaybackStatus::Stopped;
        self.position_ms = 0;
        self.crossfade_token = None;
        self.last_tick_at = None;
        Dispatch::Stop
    }

    /// Move past the current entry
    ///
    /// `honor_repeat_one` is set for natural track ends; a user skip moves on
    /// even under repeat One. Running off the end wraps only under repeat All.
    pub fn plan_advance(&mut self, honor_repeat_one: bool) -> Dispatch {
        if self.queue.is_empty() {
            return self.halt();
        }

        let current = self.queue.current_index();
        if honor_repeat_one && self.repeat == RepeatMode::One {
            if let Some(index) = current {
                return self.begin_load(index);
            }
        }

        let next = current.map_or(0, |c| c + 1);
        if next < self.queue.len() {
            self.begin_load(next)
        } else if self.repeat == RepeatMode::All {
            self.begin_load(0)
        } else {
            self.halt()
        }
    }

    /// Step back one entry, wrapping only under repeat All
    pub fn plan_previous(&mut self) -> Dispatch {
        if self.queue.is_empty() {
            return Dispatch::Nothing;
        }

        let previous = match self.queue.current_index() {
            Some(c) if c > 0 => c - 1,
            _ if self.repeat == RepeatMode::All => self.queue.len() - 1,
            _ => 0,
        };
        self.begin_load(previous)
    }

    /// A crossfade advanced onto the current load and has not rearmed yet
    pub fn transitioning(&self) -> bool {
        self.crossfade_token == Some(self.play_token)
    }

    /// The current track as listened up to `played_ms`
    pub fn listen(&self, played_ms: u64) -> Option<Listen> {
        if played_ms == 0 {
            return None;
        }
        self.current_track.as_ref().map(|t| Listen {
            track_id: t.id,
            played_ms,
        })
    }

    pub fn muted(&self) -> bool {
        self.volume <= 0.0
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            current_track: self.current_track.clone(),
            current_index: self.queue.current_index(),
            queue: self.queue.tracks().to_vec(),
            repeat: self.repeat,
            shuffle: self.shuffle,
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            volume: self.volume,
            muted: self.muted(),
        }
    }

    pub(crate) fn observe(&self) -> Observed {
        Observed {
            status: self.status,
            track_id: self.current_track.as_ref().map(|t| t.id),
            queue: self.queue.ids(),
            current_index: self.queue.current_index(),
            repeat: self.repeat,
            shuffle: self.shuffle,
            volume: self.volume,
        }
    }
}

/// Read-only view handed to callers
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub queue: Vec<Track>,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub volume: f32,
    pub muted: bool,
}

/// The fields observers are notified about, for before/after diffing
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Observed {
    pub status: PlaybackStatus,
    pub track_id: Option<TrackId>,
    pub queue: Vec<TrackId>,
    pub current_index: Option<usize>,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub volume: f32,
}
