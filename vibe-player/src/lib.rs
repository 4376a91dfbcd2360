//! # Vibe Player Library (vibe-player)
//!
//! Playback queue coordination against an external audio engine.
//!
//! **Purpose:** Own queue order, current position, repeat/shuffle policy and
//! playback status; drive the engine through a command gateway and reconcile
//! with the events it pushes back (status, progress, end of track, errors,
//! OS media keys).
//!
//! **Architecture:** caller → [`playback::Coordinator`] →
//! [`engine::CommandGateway`] → engine; engine → [`sync::EventSynchronizer`] →
//! coordinator → observers ([`vibe_common::events::EventBus`]).

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod playback;
pub mod session;
pub mod settings;
pub mod sync;

pub use error::{Error, Result};
pub use playback::Coordinator;
pub use session::PlayerSession;
