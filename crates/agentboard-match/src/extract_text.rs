//! Text extraction from a log tail (§4.4): read at most the trailing `byteLimit`
//! or `lineLimit`, parse each line as JSON via the shared event taxonomy (§4.8),
//! and join the selected role's text with `\n`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use agentboard_core::{EventRole, extract_event};
use serde_json::Value;
use tracing::debug;

/// Default trailing-byte budget read from each transcript (§5).
pub const DEFAULT_BYTE_LIMIT: u64 = 200 * 1024;
/// Default trailing-line budget read from each transcript (§4.4).
pub const DEFAULT_LINE_LIMIT: usize = 2000;

/// Which roles' text to include when extracting from a log tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    All,
    User,
    Assistant,
    AssistantUser,
}

impl ExtractMode {
    fn accepts(&self, role: EventRole) -> bool {
        match self {
            ExtractMode::All => true,
            ExtractMode::User => role == EventRole::User,
            ExtractMode::Assistant => role == EventRole::Assistant,
            ExtractMode::AssistantUser => {
                role == EventRole::Assistant || role == EventRole::User
            }
        }
    }
}

/// Read the trailing `byte_limit` bytes of `path` (or the whole file if smaller).
/// Returns `None` on any I/O failure (§7 tier 1: soft failure).
fn read_tail_bytes(path: &Path, byte_limit: u64) -> Option<String> {
    let mut file = File::open(path)
        .map_err(|e| debug!(path = %path.display(), error = %e, "failed to open transcript"))
        .ok()?;
    let len = file
        .metadata()
        .map_err(|e| debug!(path = %path.display(), error = %e, "failed to stat transcript"))
        .ok()?
        .len();
    let start = len.saturating_sub(byte_limit);
    if start > 0 {
        file.seek(SeekFrom::Start(start)).ok()?;
    }
    let mut buf = String::new();
    file.read_to_string(&mut buf)
        .map_err(|e| debug!(path = %path.display(), error = %e, "failed to read transcript tail"))
        .ok()?;
    Some(buf)
}

fn parse_tail_lines(tail: &str, line_limit: usize) -> Vec<Value> {
    let lines: Vec<&str> = tail.lines().collect();
    let start = lines.len().saturating_sub(line_limit);
    lines[start..]
        .iter()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                None
            } else {
                serde_json::from_str::<Value>(trimmed).ok()
            }
        })
        .collect()
}

/// Read and JSON-parse the trailing window of a transcript, skipping lines
/// that fail to parse. Shared by text extraction and last-exchange scanning.
pub fn read_tail_values(path: &Path, byte_limit: u64, line_limit: usize) -> Vec<Value> {
    let Some(tail) = read_tail_bytes(path, byte_limit) else {
        return Vec::new();
    };
    parse_tail_lines(&tail, line_limit)
}

/// Extract role-tagged text from the trailing window of a transcript, joining
/// accepted chunks with `\n`.
pub fn extract_log_text(
    path: &Path,
    mode: ExtractMode,
    byte_limit: u64,
    line_limit: usize,
) -> String {
    let values = read_tail_values(path, byte_limit, line_limit);
    values
        .iter()
        .filter_map(|v| {
            let event = extract_event(v)?;
            if event.text.is_empty() || !mode.accepts(event.role) {
                None
            } else {
                Some(event.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, lines: &[&str]) {
        fs::write(path, lines.join("\n")).unwrap();
    }

    #[test]
    fn extracts_assistant_user_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        write(
            &path,
            &[
                r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"hi"}]}}"#,
                r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"hello back"}]}}"#,
                r#"{"type":"tool_result"}"#,
            ],
        );
        let text = extract_log_text(&path, ExtractMode::AssistantUser, DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT);
        assert_eq!(text, "hi\nhello back");
    }

    #[test]
    fn user_mode_excludes_assistant() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        write(
            &path,
            &[
                r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"hi"}]}}"#,
                r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"hello"}]}}"#,
            ],
        );
        let text = extract_log_text(&path, ExtractMode::User, DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT);
        assert_eq!(text, "hi");
    }

    #[test]
    fn missing_file_returns_empty_string() {
        let text = extract_log_text(
            Path::new("/nonexistent.jsonl"),
            ExtractMode::All,
            DEFAULT_BYTE_LIMIT,
            DEFAULT_LINE_LIMIT,
        );
        assert_eq!(text, "");
    }

    #[test]
    fn line_limit_truncates_to_trailing_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let lines: Vec<String> = (0..10)
            .map(|i| format!(r#"{{"type":"user","message":{{"role":"user","content":[{{"type":"text","text":"msg{i}"}}]}}}}"#))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        write(&path, &refs);

        let text = extract_log_text(&path, ExtractMode::All, DEFAULT_BYTE_LIMIT, 3);
        let joined_count = text.split('\n').count();
        assert_eq!(joined_count, 3);
        assert!(text.contains("msg9"));
        assert!(!text.contains("msg0"));
    }
}
