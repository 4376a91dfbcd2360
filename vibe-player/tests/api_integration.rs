//! Integration tests for the Vibe Player HTTP API
//!
//! Tests the control surface end to end against an in-memory catalog and a
//! recording engine:
//! - Health and state
//! - Playback commands and their error mapping
//! - Queue editing
//! - Crossfade setting
//! - Listening statistics

mod helpers;

use axum::http::StatusCode;
use helpers::{EngineCall, RecordingEngine};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use vibe_common::db::{self, NewTrack};
use vibe_common::TrackId;
use vibe_player::api::{create_router, AppContext};
use vibe_player::config::CoordinatorConfig;
use vibe_player::library::SqliteLibrary;
use vibe_player::settings::SharedSettings;
use vibe_player::Coordinator;

/// Test helper to create a router over three catalog tracks (ids 1-3)
async fn setup_test_server() -> (axum::Router, Arc<RecordingEngine>, SqlitePool) {
    let pool = db::init_in_memory().await.unwrap();
    for n in 1..=3 {
        db::insert_track(
            &pool,
            &NewTrack {
                path: PathBuf::from(format!("/music/song-{}.mp3", n)),
                title: format!("Song {}", n),
                artist: "Band".to_string(),
                album: "Record".to_string(),
                artwork: None,
                duration_ms: 240_000,
            },
        )
        .await
        .unwrap();
    }

    let library = Arc::new(SqliteLibrary::open(pool.clone()).await.unwrap());
    let settings = Arc::new(SharedSettings::load(pool.clone()).await.unwrap());
    let engine = RecordingEngine::new();
    let coordinator = Coordinator::new(
        engine.clone(),
        library.clone(),
        settings.clone(),
        CoordinatorConfig::default(),
    );

    let router = create_router(AppContext {
        coordinator,
        library,
        settings,
    });
    (router, engine, pool)
}

/// Helper function to make HTTP requests to the test router
async fn make_request(
    app: &axum::Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    use axum::body::Body;
    use http::{Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        _ => panic!("Unsupported method"),
    };

    let request = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json_body) => request
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };

    (status, json_body)
}

fn queue_ids(body: &Value) -> Vec<i64> {
    body["queue"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = setup_test_server().await;

    let (status, body) = make_request(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "vibe-player");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_initial_state() {
    let (app, _, _) = setup_test_server().await;

    let (status, body) = make_request(&app, "GET", "/playback/state", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["repeat"], "off");
    assert_eq!(body["shuffle"], false);
    assert!(body["current_track"].is_null());
    assert_eq!(body["queue"], json!([]));
}

#[tokio::test]
async fn test_play_with_queue() {
    let (app, engine, _) = setup_test_server().await;

    let (status, _) = make_request(
        &app,
        "POST",
        "/playback/play",
        Some(json!({"track_id": 2, "queue": [1, 2, 3]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        engine.last_call(),
        Some(EngineCall::Play(PathBuf::from("/music/song-2.mp3")))
    );

    let (_, body) = make_request(&app, "GET", "/playback/state", None).await;
    let body = body.unwrap();
    assert_eq!(body["status"], "loading");
    assert_eq!(body["current_index"], 1);
    assert_eq!(body["current_track"]["title"], "Song 2");
    assert_eq!(queue_ids(&body), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_play_unknown_track_is_404() {
    let (app, engine, _) = setup_test_server().await;

    let (status, body) =
        make_request(&app, "POST", "/playback/play", Some(json!({"track_id": 99}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.unwrap()["status"]
        .as_str()
        .unwrap()
        .starts_with("error:"));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_play_track_outside_queue_is_400() {
    let (app, _, _) = setup_test_server().await;

    let (status, _) = make_request(
        &app,
        "POST",
        "/playback/play",
        Some(json!({"track_id": 3, "queue": [1, 2]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_engine_failure_is_502() {
    let (app, engine, _) = setup_test_server().await;
    engine.fail_play(true);

    let (status, _) =
        make_request(&app, "POST", "/playback/play", Some(json!({"track_id": 1}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, body) = make_request(&app, "GET", "/playback/state", None).await;
    assert_eq!(body.unwrap()["status"], "stopped");
}

#[tokio::test]
async fn test_seek_without_track_is_400() {
    let (app, _, _) = setup_test_server().await;

    let (status, _) = make_request(
        &app,
        "POST",
        "/playback/seek",
        Some(json!({"position_ms": 1000})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_queue_editing() {
    let (app, _, _) = setup_test_server().await;
    make_request(&app, "POST", "/playback/play", Some(json!({"track_id": 1}))).await;

    let (status, _) =
        make_request(&app, "POST", "/queue/add", Some(json!({"track_id": 3}))).await;
    assert_eq!(status, StatusCode::OK);
    make_request(&app, "POST", "/queue/next", Some(json!({"track_id": 2}))).await;

    let (_, body) = make_request(&app, "GET", "/queue", None).await;
    let body = body.unwrap();
    assert_eq!(queue_ids(&body), vec![1, 2, 3]);
    assert_eq!(body["current_index"], 0);

    let (status, _) = make_request(
        &app,
        "PUT",
        "/queue/order",
        Some(json!({"track_ids": [3, 2, 1]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = make_request(&app, "GET", "/queue", None).await;
    let body = body.unwrap();
    assert_eq!(queue_ids(&body), vec![3, 2, 1]);
    assert_eq!(body["current_index"], 2);

    let (status, _) = make_request(&app, "DELETE", "/queue/2", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = make_request(&app, "GET", "/queue", None).await;
    assert_eq!(queue_ids(&body.unwrap()), vec![3, 1]);

    make_request(&app, "POST", "/queue/clear", None).await;
    let (_, body) = make_request(&app, "GET", "/queue", None).await;
    assert_eq!(queue_ids(&body.unwrap()), vec![1]);
}

#[tokio::test]
async fn test_add_unknown_track_is_404() {
    let (app, _, _) = setup_test_server().await;

    let (status, _) =
        make_request(&app, "POST", "/queue/add", Some(json!({"track_id": 42}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_repeat_and_shuffle_toggles() {
    let (app, _, _) = setup_test_server().await;

    let (_, body) = make_request(&app, "POST", "/playback/repeat", None).await;
    assert_eq!(body.unwrap()["repeat"], "all");
    let (_, body) = make_request(&app, "POST", "/playback/repeat", None).await;
    assert_eq!(body.unwrap()["repeat"], "one");

    let (_, body) = make_request(&app, "POST", "/playback/shuffle", None).await;
    assert_eq!(body.unwrap()["shuffle"], true);
    let (_, body) = make_request(&app, "POST", "/playback/shuffle", None).await;
    assert_eq!(body.unwrap()["shuffle"], false);
}

#[tokio::test]
async fn test_volume_and_mute() {
    let (app, engine, _) = setup_test_server().await;

    let (status, _) =
        make_request(&app, "POST", "/playback/volume", Some(json!({"volume": 0.5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.last_call(), Some(EngineCall::SetVolume(0.5)));

    make_request(&app, "POST", "/playback/mute", None).await;
    let (_, body) = make_request(&app, "GET", "/playback/state", None).await;
    let body = body.unwrap();
    assert_eq!(body["muted"], true);
    assert_eq!(body["volume"], 0.0);
}

#[tokio::test]
async fn test_crossfade_setting_is_persisted() {
    let (app, _, pool) = setup_test_server().await;

    let (status, _) = make_request(
        &app,
        "PUT",
        "/settings/crossfade",
        Some(json!({"window_ms": 4000})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(db::get_crossfade_window_ms(&pool).await.unwrap(), 4000);
}

#[tokio::test]
async fn test_library_listing() {
    let (app, _, _) = setup_test_server().await;

    let (status, body) = make_request(&app, "GET", "/library/tracks", None).await;

    assert_eq!(status, StatusCode::OK);
    let tracks = body.unwrap()["tracks"].as_array().unwrap().clone();
    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks[0]["artist"], "Band");
}

#[tokio::test]
async fn test_listening_stats() {
    let (app, _, pool) = setup_test_server().await;
    db::record_playback(&pool, TrackId(2), 240_000).await.unwrap();
    db::record_playback(&pool, TrackId(2), 100_000).await.unwrap();
    db::record_playback(&pool, TrackId(3), 60_000).await.unwrap();

    let (status, body) = make_request(&app, "GET", "/library/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["total_listening_ms"], 400_000);
    assert_eq!(body["top_tracks"][0]["title"], "Song 2");
    assert_eq!(body["top_tracks"][0]["play_count"], 2);
    assert_eq!(body["top_tracks"][1]["track_id"], 3);
}

#[tokio::test]
async fn test_reset() {
    let (app, engine, _) = setup_test_server().await;
    make_request(
        &app,
        "POST",
        "/playback/play",
        Some(json!({"track_id": 1, "queue": [1, 2]})),
    )
    .await;

    let (status, _) = make_request(&app, "POST", "/playback/reset", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.last_call(), Some(EngineCall::Stop));
    let (_, body) = make_request(&app, "GET", "/playback/state", None).await;
    let body = body.unwrap();
    assert_eq!(body["queue"], json!([]));
    assert!(body["current_track"].is_null());
}
