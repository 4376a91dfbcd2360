//! # Vibe Common Library
//!
//! Shared code for the vibe player workspace:
//! - Track references handed around by identity
//! - Observer event types (PlayerEvent) and the EventBus
//! - Bootstrap configuration loading
//! - SQLite access for the library catalog and runtime settings
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;
pub mod track;

pub use error::{Error, Result};
pub use track::{Track, TrackId};
