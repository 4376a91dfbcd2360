//! Queue and notification type definitions

use serde::{Deserialize, Serialize};

/// Why the queue changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QueueChangeTrigger {
    /// Caller replaced the queue through `play`
    Replace,
    UserEnqueue,
    UserPlayNext,
    UserDequeue,
    UserReorder,
    UserClear,
    Shuffle,
    Unshuffle,
    /// Playback moved on (finished, skipped, crossfade)
    Advance,
    /// Unplayable track dropped by the error handler
    SelfHealing,
    /// Library context switched
    Reset,
}

impl std::fmt::Display for QueueChangeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueChangeTrigger::Replace => write!(f, "Replace"),
            QueueChangeTrigger::UserEnqueue => write!(f, "UserEnqueue"),
            QueueChangeTrigger::UserPlayNext => write!(f, "UserPlayNext"),
            QueueChangeTrigger::UserDequeue => write!(f, "UserDequeue"),
            QueueChangeTrigger::UserReorder => write!(f, "UserReorder"),
            QueueChangeTrigger::UserClear => write!(f, "UserClear"),
            QueueChangeTrigger::Shuffle => write!(f, "Shuffle"),
            QueueChangeTrigger::Unshuffle => write!(f, "Unshuffle"),
            QueueChangeTrigger::Advance => write!(f, "Advance"),
            QueueChangeTrigger::SelfHealing => write!(f, "SelfHealing"),
            QueueChangeTrigger::Reset => write!(f, "Reset"),
        }
    }
}

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
        }
    }
}
