//! Track references
//!
//! A track is owned by the external library; everything downstream only
//! holds clones and compares them by [`TrackId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque, comparable track identity (library row id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Track reference as handed out by the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Library identity
    pub id: TrackId,
    /// Audio file location
    pub path: PathBuf,
    /// Display title
    pub title: String,
    /// Display artist
    pub artist: String,
    /// Display album
    pub album: String,
    /// Artwork location, if the library has one
    #[serde(default)]
    pub artwork: Option<String>,
    /// Duration in milliseconds (0 when unknown)
    #[serde(default)]
    pub duration_ms: u64,
}

impl Track {
    /// "Artist - Title", falling back to the file name when tags are empty
    pub fn display_name(&self) -> String {
        match (self.artist.is_empty(), self.title.is_empty()) {
            (false, false) => format!("{} - {}", self.artist, self.title),
            (true, false) => self.title.clone(),
            _ => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string()),
        }
    }
}
