//! Database initialization, catalog and history query tests
//!
//! Uses tempfile for on-disk databases so the file-creation path is exercised.

use std::path::PathBuf;
use tempfile::TempDir;
use vibe_common::db::{self, NewTrack};
use vibe_common::{Error, TrackId};

fn new_track(path: &str, title: &str) -> NewTrack {
    NewTrack {
        path: PathBuf::from(path),
        title: title.to_string(),
        artist: "Artist".to_string(),
        album: "Album".to_string(),
        artwork: None,
        duration_ms: 200_000,
    }
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("library.db");
    assert!(!db_path.exists());

    let pool = db::init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_settings() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("library.db");

    {
        let pool = db::init_database(&db_path).await.unwrap();
        db::set_crossfade_window_ms(&pool, 4000).await.unwrap();
        pool.close().await;
    }

    // Re-init must not overwrite an existing value with the default
    let pool = db::init_database(&db_path).await.unwrap();
    assert_eq!(db::get_crossfade_window_ms(&pool).await.unwrap(), 4000);
}

#[tokio::test]
async fn test_insert_list_and_get_tracks() {
    let pool = db::init_in_memory().await.unwrap();

    let a = db::insert_track(&pool, &new_track("/music/a.mp3", "A")).await.unwrap();
    let b = db::insert_track(&pool, &new_track("/music/b.mp3", "B")).await.unwrap();
    assert_ne!(a.id, b.id);

    let all = db::list_tracks(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], a);
    assert_eq!(all[1], b);

    let fetched = db::get_track(&pool, b.id).await.unwrap();
    assert_eq!(fetched.as_ref().map(|t| t.title.as_str()), Some("B"));
    assert_eq!(fetched.map(|t| t.duration_ms), Some(200_000));
}

#[tokio::test]
async fn test_delete_track() {
    let pool = db::init_in_memory().await.unwrap();
    let a = db::insert_track(&pool, &new_track("/music/a.mp3", "A")).await.unwrap();

    db::delete_track(&pool, a.id).await.unwrap();
    assert!(db::get_track(&pool, a.id).await.unwrap().is_none());

    // Second delete reports the missing row
    let result = db::delete_track(&pool, a.id).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_get_unknown_track_is_none() {
    let pool = db::init_in_memory().await.unwrap();
    assert!(db::get_track(&pool, TrackId(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_history() {
    let pool = db::init_in_memory().await.unwrap();

    assert_eq!(db::total_listening_ms(&pool).await.unwrap(), 0);
    assert_eq!(db::play_count(&pool, TrackId(1)).await.unwrap(), 0);
    assert!(db::top_tracks(&pool, 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_record_playback_and_aggregate() {
    let pool = db::init_in_memory().await.unwrap();
    let a = db::insert_track(&pool, &new_track("/music/a.flac", "A"))
        .await
        .unwrap();
    let b = db::insert_track(&pool, &new_track("/music/b.flac", "B"))
        .await
        .unwrap();

    db::record_playback(&pool, a.id, 200_000).await.unwrap();
    db::record_playback(&pool, b.id, 50_000).await.unwrap();
    db::record_playback(&pool, b.id, 120_000).await.unwrap();

    assert_eq!(db::play_count(&pool, a.id).await.unwrap(), 1);
    assert_eq!(db::play_count(&pool, b.id).await.unwrap(), 2);
    assert_eq!(db::total_listening_ms(&pool).await.unwrap(), 370_000);

    let top = db::top_tracks(&pool, 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].track_id, b.id);
    assert_eq!(top[0].title, "B");
    assert_eq!(top[0].play_count, 2);
}

#[tokio::test]
async fn test_history_of_deleted_track_is_kept_but_not_ranked() {
    let pool = db::init_in_memory().await.unwrap();
    let a = db::insert_track(&pool, &new_track("/music/a.flac", "A"))
        .await
        .unwrap();
    db::record_playback(&pool, a.id, 10_000).await.unwrap();

    db::delete_track(&pool, a.id).await.unwrap();

    assert_eq!(db::play_count(&pool, a.id).await.unwrap(), 1);
    assert_eq!(db::total_listening_ms(&pool).await.unwrap(), 10_000);
    assert!(db::top_tracks(&pool, 5).await.unwrap().is_empty());
}
