//! Coordinator tunables
//!
//! Bootstrap values come from the `[playback]` TOML table; the runtime
//! crossfade window is read separately through [`crate::settings`].

use std::time::Duration;
use vibe_common::config::PlaybackConfig;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// `previous` restarts the current track when past this position
    pub restart_threshold_ms: u64,
    /// Minimum spacing between accepted progress ticks
    pub progress_throttle: Duration,
    /// Ticks are ignored this long after a local seek
    pub seek_guard: Duration,
    /// Upper bound for one engine command
    pub command_timeout: Duration,
    /// Observer channel capacity
    pub event_capacity: usize,
    pub initial_volume: f32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for CoordinatorConfig {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            restart_threshold_ms: config.restart_threshold_ms,
            progress_throttle: Duration::from_millis(config.progress_throttle_ms),
            seek_guard: Duration::from_millis(config.seek_guard_ms),
            command_timeout: Duration::from_millis(config.command_timeout_ms),
            event_capacity: config.event_capacity.max(1),
            initial_volume: if config.initial_volume.is_finite() {
                config.initial_volume.clamp(0.0, 1.0)
            } else {
                1.0
            },
        }
    }
}
