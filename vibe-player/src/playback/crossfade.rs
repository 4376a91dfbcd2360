//! Crossfade trigger planning
//!
//! Decides, on every progress tick, whether playback should move on before the
//! engine reports the end of the track. The actual fade is the engine's job;
//! this only picks the moment.

/// Inputs sampled from coordinator state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossfadeInput {
    pub position_ms: u64,
    pub duration_ms: u64,
    /// Trigger window before the end of the track (0 disables the planner)
    pub window_ms: u64,
    pub has_next: bool,
    pub is_transitioning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeDecision {
    /// Nothing to do
    Idle,
    /// Start the next track now
    Fire,
    /// The new track is well under way: clear the transition guard
    Rearm,
}

/// Plan one tick
///
/// While transitioning, the guard is released once the position drops below
/// half of the trigger point, which only happens after the next track started.
/// A track no longer than the window has no trigger point and rearms at once.
pub fn plan(input: CrossfadeInput) -> CrossfadeDecision {
    let trigger_at = input.duration_ms.saturating_sub(input.window_ms);

    if input.is_transitioning {
        if trigger_at == 0 || input.position_ms < trigger_at / 2 {
            return CrossfadeDecision::Rearm;
        }
        return CrossfadeDecision::Idle;
    }

    if input.window_ms == 0
        || input.duration_ms == 0
        || input.duration_ms <= input.window_ms
        || !input.has_next
    {
        return CrossfadeDecision::Idle;
    }

    if input.position_ms >= trigger_at {
        CrossfadeDecision::Fire
    } else {
        CrossfadeDecision::Idle
    }
}

/// Whether anything would play after the current entry
pub fn has_next(queue_len: usize, current_index: Option<usize>, repeat_off: bool) -> bool {
    if queue_len == 0 {
        return false;
    }
    if !repeat_off {
        return true;
    }
    match current_index {
        Some(i) => i + 1 < queue_len,
        None => false,
    }
}
