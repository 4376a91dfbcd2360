//! Event types for the vibe event system
//!
//! Provides the observer event enum and the EventBus that carries it from
//! the queue coordinator to every subscriber (SSE clients, tests, UI glue).

mod playback_types;
mod queue_types;

pub use playback_types::{PlaybackStatus, RepeatMode};
pub use queue_types::{NoticeLevel, QueueChangeTrigger};

use crate::track::TrackId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Observer events published by the queue coordinator
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Playback status changed
    ///
    /// Triggers:
    /// - SSE: Update transport controls
    PlaybackStateChanged {
        /// Status before change
        old_state: PlaybackStatus,
        /// Status after change
        new_state: PlaybackStatus,
        /// When status changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Current track or its queue position changed
    TrackChanged {
        /// Current track (kept after the queue runs out)
        track_id: Option<TrackId>,
        /// Position in the queue, None once the queue no longer holds it
        queue_index: Option<usize>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents changed
    ///
    /// Triggers:
    /// - SSE: Update queue display
    QueueChanged {
        /// Queue track ids in play order
        queue: Vec<TrackId>,
        /// Current position after the change
        current_index: Option<usize>,
        /// Why queue changed
        trigger: QueueChangeTrigger,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback progress update
    ///
    /// Emitted for accepted (non-throttled) engine progress ticks and for
    /// optimistic seeks.
    PlaybackProgress {
        track_id: Option<TrackId>,
        /// Current playback position (milliseconds)
        position_ms: u64,
        /// Total track duration (milliseconds)
        duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Repeat or shuffle mode changed
    ModeChanged {
        repeat: RepeatMode,
        shuffle: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume changed (0.0-1.0)
    VolumeChanged {
        volume: f32,
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User-visible notification (self-healing outcomes, playback errors)
    Notice {
        level: NoticeLevel,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::TrackChanged { .. } => "TrackChanged",
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::ModeChanged { .. } => "ModeChanged",
            PlayerEvent::VolumeChanged { .. } => "VolumeChanged",
            PlayerEvent::Notice { .. } => "Notice",
        }
    }
}

/// One-to-many broadcaster for [`PlayerEvent`]
///
/// Slow subscribers lag and lose the oldest events rather than blocking the
/// coordinator.
///
/// # Examples
///
/// ```
/// use vibe_common::events::EventBus;
///
/// let event_bus = EventBus::new(100);
/// let rx = event_bus.subscribe();
/// assert_eq!(event_bus.subscriber_count(), 1);
/// # drop(rx);
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
