//! Vibe Player - Main entry point
//!
//! Runs the playback queue coordinator against the simulated engine and
//! exposes it over HTTP/SSE.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vibe_common::config::{resolve_database_path, TomlConfig};
use vibe_player::api::{self, AppContext};
use vibe_player::config::CoordinatorConfig;
use vibe_player::engine::SimulatedEngine;
use vibe_player::library::SqliteLibrary;
use vibe_player::settings::SharedSettings;
use vibe_player::PlayerSession;

const DEFAULT_LOG_FILTER: &str = "vibe_player=debug,vibe_common=info,tower_http=info";

/// Command-line arguments for vibe-player
#[derive(Parser, Debug)]
#[command(name = "vibe-player")]
#[command(about = "Playback queue coordinator with an HTTP control surface")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "VIBE_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long, env = "VIBE_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite library database
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize tracing; RUST_LOG wins over the config file, which wins
    // over the built-in filter
    let default_filter = if config.logging.level == "info" {
        DEFAULT_LOG_FILTER.to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = args.port.unwrap_or(config.port);
    info!("Starting Vibe Player on port {}", port);

    let db_path = resolve_database_path(args.database.as_deref(), "VIBE_DATABASE", &config);
    info!("Database: {}", db_path.display());
    let pool = vibe_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let library = Arc::new(
        SqliteLibrary::open(pool.clone())
            .await
            .context("Failed to load library")?,
    );
    let settings = Arc::new(
        SharedSettings::load(pool.clone())
            .await
            .context("Failed to load settings")?,
    );

    let engine = Arc::new(SimulatedEngine::new());
    let mut session = PlayerSession::create(
        engine,
        library.clone(),
        settings.clone(),
        CoordinatorConfig::from(&config.playback),
    );
    info!("Player session ready");

    let ctx = AppContext {
        coordinator: Arc::clone(session.coordinator()),
        library,
        settings,
    };

    api::run(ctx, port, shutdown_signal())
        .await
        .context("Server error")?;

    session.dispose();
    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
