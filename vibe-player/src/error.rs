//! Error types for vibe-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;
use vibe_common::TrackId;

/// Main error type for vibe-player
#[derive(Error, Debug)]
pub enum Error {
    /// Errors bubbled up from vibe-common
    #[error(transparent)]
    Common(#[from] vibe_common::Error),

    /// Engine-side failure reported by an engine implementation
    #[error("Engine error: {0}")]
    Engine(String),

    /// An engine command failed or timed out
    #[error("Engine command '{command}' failed: {reason}")]
    Command {
        command: &'static str,
        reason: String,
    },

    /// `play` was asked to start a track that is not part of the supplied queue
    #[error("Track {0} is not in the queue")]
    TrackNotInQueue(TrackId),

    /// Track id could not be resolved against the library view
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Engine payload that could not be normalized
    #[error("Malformed '{channel}' event: {reason}")]
    MalformedEvent {
        channel: &'static str,
        reason: String,
    },

    /// Library collaborator errors
    #[error("Library error: {0}")]
    Library(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),
}

/// Convenience Result type using vibe-player Error
pub type Result<T> = std::result::Result<T, Error>;
