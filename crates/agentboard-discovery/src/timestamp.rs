//! `extractLastEntryTimestamp` (§4.7.6): derive `lastActivityAt` from the
//! transcript's own last entry rather than filesystem `mtime`, which backup and
//! sync tooling routinely rewrites out of order.

use std::path::Path;

use agentboard_match::{DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT, read_tail_values};
use chrono::{DateTime, Utc};
use serde_json::Value;

fn field_timestamp(value: &Value, pointer: &[&str]) -> Option<DateTime<Utc>> {
    let mut cursor = value;
    for key in pointer {
        cursor = cursor.get(key)?;
    }
    let raw = cursor.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Try each known timestamp field in turn: top-level `timestamp` (Claude), then
/// Codex's `payload.timestamp`. `None` means the caller should fall back to `mtime`.
pub fn extract_last_entry_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let values = read_tail_values(path, DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT);
    let last = values.last()?;
    field_timestamp(last, &["timestamp"]).or_else(|| field_timestamp(last, &["payload", "timestamp"]))
}
