//! Track catalog queries

use crate::track::{Track, TrackId};
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::path::PathBuf;

type TrackRow = (i64, String, String, String, String, Option<String>, i64);

const TRACK_COLUMNS: &str = "id, path, title, artist, album, artwork, duration_ms";

fn row_to_track(row: TrackRow) -> Track {
    Track {
        id: TrackId(row.0),
        path: PathBuf::from(row.1),
        title: row.2,
        artist: row.3,
        album: row.4,
        artwork: row.5,
        duration_ms: row.6.max(0) as u64,
    }
}

/// All tracks in catalog order (by id)
pub async fn list_tracks(db: &SqlitePool) -> Result<Vec<Track>> {
    let rows: Vec<TrackRow> =
        sqlx::query_as(&format!("SELECT {} FROM tracks ORDER BY id", TRACK_COLUMNS))
            .fetch_all(db)
            .await?;

    Ok(rows.into_iter().map(row_to_track).collect())
}

pub async fn get_track(db: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let row: Option<TrackRow> =
        sqlx::query_as(&format!("SELECT {} FROM tracks WHERE id = ?", TRACK_COLUMNS))
            .bind(id.0)
            .fetch_optional(db)
            .await?;

    Ok(row.map(row_to_track))
}

/// New catalog entry, as produced by a scanner
#[derive(Debug, Clone, Default)]
pub struct NewTrack {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Option<String>,
    pub duration_ms: u64,
}

/// Insert a track and return it with its assigned id
pub async fn insert_track(db: &SqlitePool, track: &NewTrack) -> Result<Track> {
    let path = track.path.to_string_lossy().into_owned();
    let result = sqlx::query(
        r#"
        INSERT INTO tracks (path, title, artist, album, artwork, duration_ms)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&path)
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.album)
    .bind(&track.artwork)
    .bind(track.duration_ms as i64)
    .execute(db)
    .await?;

    Ok(Track {
        id: TrackId(result.last_insert_rowid()),
        path: track.path.clone(),
        title: track.title.clone(),
        artist: track.artist.clone(),
        album: track.album.clone(),
        artwork: track.artwork.clone(),
        duration_ms: track.duration_ms,
    })
}

/// Delete a track from the catalog
///
/// Returns `Error::NotFound` when no row carried that id.
pub async fn delete_track(db: &SqlitePool, id: TrackId) -> Result<()> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id.0)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("track {}", id)));
    }

    Ok(())
}
