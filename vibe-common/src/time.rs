//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render a millisecond count as `m:ss`, the way the player displays positions
pub fn format_position(millis: u64) -> String {
    let total_seconds = millis / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_format_position() {
        assert_eq!(format_position(0), "0:00");
        assert_eq!(format_position(999), "0:00");
        assert_eq!(format_position(61_000), "1:01");
        assert_eq!(format_position(3_599_000), "59:59");
    }
}
