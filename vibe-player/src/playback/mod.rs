//! Playback coordination
//!
//! The queue coordinator and the policies it applies: queue editing,
//! crossfade triggering and self-healing on engine errors.

pub mod coordinator;
pub mod crossfade;
pub mod healing;
pub mod queue;
pub mod state;

pub use coordinator::Coordinator;
pub use queue::PlayQueue;
pub use state::{Dispatch, Listen, PlaybackSnapshot, PlayerState};
