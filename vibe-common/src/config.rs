//! Bootstrap configuration loading and database path resolution
//!
//! Two tiers, as for every vibe binary:
//! 1. **TOML bootstrap**: database path, port, logging, playback tunables
//! 2. **Database runtime**: settings read from the `settings` table
//!
//! Database path resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bootstrap configuration loaded from TOML file
///
/// Every field has a default, so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Queue coordinator tunables (`[playback]` table)
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// `previous` restarts the current track past this position
    #[serde(default = "default_restart_threshold_ms")]
    pub restart_threshold_ms: u64,

    /// Minimum spacing between accepted progress ticks
    #[serde(default = "default_progress_throttle_ms")]
    pub progress_throttle_ms: u64,

    /// Progress ticks are ignored this long after a local seek
    #[serde(default = "default_seek_guard_ms")]
    pub seek_guard_ms: u64,

    /// Upper bound for a single engine command
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Observer event channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Volume applied when the coordinator is created (0.0-1.0)
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            restart_threshold_ms: default_restart_threshold_ms(),
            progress_throttle_ms: default_progress_throttle_ms(),
            seek_guard_ms: default_seek_guard_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            event_capacity: default_event_capacity(),
            initial_volume: default_initial_volume(),
        }
    }
}

fn default_port() -> u16 {
    5780
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_restart_threshold_ms() -> u64 {
    3000
}

fn default_progress_throttle_ms() -> u64 {
    500
}

fn default_seek_guard_ms() -> u64 {
    1000
}

fn default_command_timeout_ms() -> u64 {
    5000
}

fn default_event_capacity() -> usize {
    100
}

fn default_initial_volume() -> f32 {
    1.0
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            port: default_port(),
            logging: LoggingConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: TomlConfig = toml::from_str(&content)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config file, falling back to compiled defaults
    ///
    /// A missing file is not an error: log a warning and start with defaults.
    /// A file that exists but fails to parse is still reported.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load(&path)
    }
}

/// Platform config file location (`~/.config/vibe/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vibe").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vibe"))
        .unwrap_or_else(|| PathBuf::from("./vibe_data"))
        .join("library.db")
}

/// Resolve the database path: CLI → environment → TOML → compiled default
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.database_path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        assert_eq!(default_port(), 5780);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 5780);
        assert_eq!(config.logging.level, "info");
        assert!(config.database_path.is_none());
        assert_eq!(config.playback.restart_threshold_ms, 3000);
        assert_eq!(config.playback.progress_throttle_ms, 500);
        assert_eq!(config.playback.seek_guard_ms, 1000);
        assert_eq!(config.playback.command_timeout_ms, 5000);
        assert_eq!(config.playback.event_capacity, 100);
        assert_eq!(config.playback.initial_volume, 1.0);
    }

    #[test]
    fn test_partial_playback_table() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 6000

            [playback]
            seek_guard_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.playback.seek_guard_ms, 250);
        assert_eq!(config.playback.progress_throttle_ms, 500);
    }

    #[test]
    fn test_default_database_path_ends_with_library_db() {
        let path = default_database_path();
        assert!(path.ends_with("vibe/library.db") || path.ends_with("vibe_data/library.db"));
    }
}
