//! Settings database access
//!
//! Read/write settings from the settings table (key-value store).

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Settings key for the crossfade trigger window
pub const CROSSFADE_WINDOW_KEY: &str = "crossfade_window_ms";

/// Crossfade trigger window in milliseconds (0 = disabled)
///
/// A missing value is written back as 0.
pub async fn get_crossfade_window_ms(db: &SqlitePool) -> Result<u64> {
    match get_setting::<u64>(db, CROSSFADE_WINDOW_KEY).await? {
        Some(ms) => Ok(ms),
        None => {
            set_setting(db, CROSSFADE_WINDOW_KEY, 0u64).await?;
            Ok(0)
        }
    }
}

pub async fn set_crossfade_window_ms(db: &SqlitePool, ms: u64) -> Result<()> {
    set_setting(db, CROSSFADE_WINDOW_KEY, ms).await
}

/// Generic setting getter
///
/// Returns None if key doesn't exist (or holds NULL).
/// Parses value from string using FromStr trait.
pub async fn get_setting<T: FromStr>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match value.flatten() {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}
