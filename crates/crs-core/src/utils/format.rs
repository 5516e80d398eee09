use chrono::{DateTime, Local, NaiveDateTime};

/// Output shape for record timestamps: `2024-03-05 | 14:30`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d | %H:%M";

/// Format a server timestamp in local time.
/// Returns an empty string for anything that doesn't parse.
pub fn format_timestamp(value: &str) -> String {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
    }
    // Offset-less timestamps are taken as already local
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Truncate a string to a maximum number of characters, adding an ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
