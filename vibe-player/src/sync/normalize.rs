//! Raw engine payload normalization

use crate::engine::EngineChannel;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// OS media key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    Stop,
}

/// Engine event in the coordinator's vocabulary
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    StatusChanged {
        playing: bool,
        paused: bool,
        volume: Option<f32>,
        duration_ms: u64,
    },
    ProgressTick {
        position_ms: u64,
        duration_ms: u64,
    },
    Finished,
    Error {
        detail: String,
    },
    MediaKey(MediaKey),
}

/// Engine playback state payload
///
/// Fields the engine omits fall back to their defaults.
#[derive(Debug, Deserialize)]
struct EngineStatePayload {
    #[serde(default)]
    is_playing: bool,
    #[serde(default)]
    is_paused: bool,
    #[serde(default)]
    position_ms: u64,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    volume: Option<f32>,
}

fn parse_state(channel: EngineChannel, payload: Value) -> Result<EngineStatePayload> {
    serde_json::from_value(payload).map_err(|e| Error::MalformedEvent {
        channel: channel.name(),
        reason: e.to_string(),
    })
}

/// Normalize one raw payload from `channel`
pub fn normalize(channel: EngineChannel, payload: Value) -> Result<SyncEvent> {
    let event = match channel {
        EngineChannel::Status => {
            let state = parse_state(channel, payload)?;
            SyncEvent::StatusChanged {
                playing: state.is_playing,
                paused: state.is_paused,
                volume: state.volume,
                duration_ms: state.duration_ms,
            }
        }
        EngineChannel::Progress => {
            let state = parse_state(channel, payload)?;
            SyncEvent::ProgressTick {
                position_ms: state.position_ms,
                duration_ms: state.duration_ms,
            }
        }
        EngineChannel::Finished => SyncEvent::Finished,
        EngineChannel::Error => {
            let detail = match payload {
                Value::String(s) => s,
                Value::Object(map) => match map.get("message").and_then(Value::as_str) {
                    Some(message) => message.to_string(),
                    None => Value::Object(map).to_string(),
                },
                Value::Null => {
                    return Err(Error::MalformedEvent {
                        channel: channel.name(),
                        reason: "empty error payload".to_string(),
                    })
                }
                other => other.to_string(),
            };
            SyncEvent::Error { detail }
        }
        EngineChannel::MediaPlay => SyncEvent::MediaKey(MediaKey::Play),
        EngineChannel::MediaPause => SyncEvent::MediaKey(MediaKey::Pause),
        EngineChannel::MediaToggle => SyncEvent::MediaKey(MediaKey::Toggle),
        EngineChannel::MediaNext => SyncEvent::MediaKey(MediaKey::Next),
        EngineChannel::MediaPrev => SyncEvent::MediaKey(MediaKey::Previous),
        EngineChannel::MediaStop => SyncEvent::MediaKey(MediaKey::Stop),
    };
    Ok(event)
}
