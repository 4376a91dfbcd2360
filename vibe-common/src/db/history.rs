//! Playback history
//!
//! Every finished or skipped track adds one row. Rows outlive the catalog
//! entry they point at; the aggregate queries only report tracks that still
//! exist.

use crate::time;
use crate::track::TrackId;
use crate::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Record that `track_id` was listened to for `played_ms`
pub async fn record_playback(db: &SqlitePool, track_id: TrackId, played_ms: u64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playback_history (track_id, timestamp, duration_ms)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(track_id.0)
    .bind(time::now().timestamp())
    .bind(played_ms as i64)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn play_count(db: &SqlitePool, track_id: TrackId) -> Result<u64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM playback_history WHERE track_id = ?")
            .bind(track_id.0)
            .fetch_one(db)
            .await?;

    Ok(count.max(0) as u64)
}

/// Sum of all recorded listening time
pub async fn total_listening_ms(db: &SqlitePool) -> Result<u64> {
    let (total,): (Option<i64>,) =
        sqlx::query_as("SELECT SUM(duration_ms) FROM playback_history")
            .fetch_one(db)
            .await?;

    Ok(total.unwrap_or(0).max(0) as u64)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopTrack {
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    pub play_count: u64,
}

/// Most played catalog tracks, ties broken by id
pub async fn top_tracks(db: &SqlitePool, limit: u32) -> Result<Vec<TopTrack>> {
    let rows: Vec<(i64, String, String, i64)> = sqlx::query_as(
        r#"
        SELECT t.id, t.title, t.artist, COUNT(h.id) AS plays
        FROM playback_history h
        JOIN tracks t ON t.id = h.track_id
        GROUP BY t.id
        ORDER BY plays DESC, t.id
        LIMIT ?
        "#,
    )
    .bind(limit as i64)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, title, artist, plays)| TopTrack {
            track_id: TrackId(id),
            title,
            artist,
            play_count: plays.max(0) as u64,
        })
        .collect())
}
