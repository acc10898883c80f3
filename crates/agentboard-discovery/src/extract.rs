//! Per-file extraction (§4.1): open a `.jsonl` transcript, read its first 1-3
//! entries (and optionally scan to the last) to pull out `sessionId`,
//! `projectPath`, `slug`, subagent/exec flags, and the last user message.
//!
//! Every failure mode here is soft: a missing file, a read error, or an entry that
//! doesn't parse as JSON simply yields `None` fields rather than aborting the
//! caller's batch (§7 tier 1).

use std::fs;
use std::path::Path;

use agentboard_core::{AgentFamily, EventRole, extract_event};
use serde_json::Value;
use tracing::debug;

/// Identity and metadata pulled from a transcript file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedMeta {
    pub session_id: Option<String>,
    pub project_path: Option<String>,
    pub slug: Option<String>,
    pub is_subagent: bool,
    pub is_exec: bool,
    pub last_user_message: Option<String>,
}

/// Number of leading lines inspected for session identity (§4.1: "first 1-3
/// entries").
const HEAD_LINES: usize = 3;

fn read_lines(path: &Path) -> Option<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents.lines().map(str::to_string).collect()),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "failed to read transcript for extraction");
            None
        }
    }
}

fn parse_values<'a>(lines: impl Iterator<Item = &'a String>) -> Vec<Value> {
    lines
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

fn claude_identity(head: &[Value]) -> (Option<String>, Option<String>, Option<String>) {
    let first = head.first();
    let session_id = first
        .and_then(|v| v.get("sessionId"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let project_path = first
        .and_then(|v| v.get("cwd"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let slug = head
        .iter()
        .find_map(|v| v.get("slug").and_then(Value::as_str))
        .map(str::to_string);
    (session_id, project_path, slug)
}

fn codex_identity(head: &[Value]) -> (Option<String>, Option<String>, Option<String>, bool, bool) {
    let meta_entry = head
        .iter()
        .find(|v| v.get("type").and_then(Value::as_str) == Some("session_meta"));

    let payload = meta_entry.and_then(|v| v.get("payload"));
    let session_id = payload
        .and_then(|p| p.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let project_path = payload
        .and_then(|p| p.get("cwd"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let slug = head
        .iter()
        .find_map(|v| v.get("slug").and_then(Value::as_str))
        .map(str::to_string);

    let source = payload
        .and_then(|p| p.get("source"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let originator = payload
        .and_then(|p| p.get("originator"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let is_subagent = source.contains("subagent");
    let is_exec = source == "exec" || originator == "codex_exec";

    (session_id, project_path, slug, is_subagent, is_exec)
}

fn last_user_message(values: &[Value]) -> Option<String> {
    values.iter().rev().find_map(|v| {
        let event = extract_event(v)?;
        if event.role == EventRole::User && !event.text.trim().is_empty() {
            Some(event.text)
        } else {
            None
        }
    })
}

/// Extract identity metadata from a transcript. Never panics or propagates an
/// error: any failure yields the default (all-`None`) metadata.
pub fn extract_meta(path: &Path, family: AgentFamily) -> ExtractedMeta {
    let Some(lines) = read_lines(path) else {
        return ExtractedMeta::default();
    };

    let head_values = parse_values(lines.iter().take(HEAD_LINES));
    let all_values = parse_values(lines.iter());

    let (session_id, project_path, slug, is_subagent, is_exec) = match family {
        AgentFamily::Claude => {
            let (sid, proj, slug) = claude_identity(&head_values);
            (sid, proj, slug, false, false)
        }
        AgentFamily::Codex => codex_identity(&head_values),
        AgentFamily::Pi | AgentFamily::Unknown => {
            // Layout undefined for pi beyond the directory convention (§9 open
            // question); fall back to the claude-shaped top-level fields, which
            // cost nothing extra to check and degrade to `None` harmlessly.
            let (sid, proj, slug) = claude_identity(&head_values);
            (sid, proj, slug, false, false)
        }
    };

    ExtractedMeta {
        session_id,
        project_path,
        slug,
        is_subagent,
        is_exec,
        last_user_message: last_user_message(&all_values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_jsonl(path: &Path, lines: &[&str]) {
        let mut file = File::create(path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
    }

    #[test]
    fn claude_extracts_session_and_project() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        write_jsonl(
            &path,
            &[
                r#"{"sessionId":"abc123","cwd":"/tmp/alpha","slug":"starry-leaping-orbit"}"#,
                r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"hello"}]}}"#,
            ],
        );
        let meta = extract_meta(&path, AgentFamily::Claude);
        assert_eq!(meta.session_id.as_deref(), Some("abc123"));
        assert_eq!(meta.project_path.as_deref(), Some("/tmp/alpha"));
        assert_eq!(meta.slug.as_deref(), Some("starry-leaping-orbit"));
        assert_eq!(meta.last_user_message.as_deref(), Some("hello"));
    }

    #[test]
    fn codex_extracts_from_session_meta() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        write_jsonl(
            &path,
            &[
                r#"{"type":"session_meta","payload":{"id":"sess-1","cwd":"/tmp/beta","source":"exec","originator":"codex_exec"}}"#,
            ],
        );
        let meta = extract_meta(&path, AgentFamily::Codex);
        assert_eq!(meta.session_id.as_deref(), Some("sess-1"));
        assert_eq!(meta.project_path.as_deref(), Some("/tmp/beta"));
        assert!(meta.is_exec);
        assert!(!meta.is_subagent);
    }

    #[test]
    fn codex_subagent_detected_via_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        write_jsonl(
            &path,
            &[r#"{"type":"session_meta","payload":{"id":"sess-2","cwd":"/tmp","source":"subagent:reviewer"}}"#],
        );
        let meta = extract_meta(&path, AgentFamily::Codex);
        assert!(meta.is_subagent);
        assert!(!meta.is_exec);
    }

    #[test]
    fn missing_file_yields_default_meta() {
        let meta = extract_meta(Path::new("/nonexistent/path.jsonl"), AgentFamily::Claude);
        assert_eq!(meta, ExtractedMeta::default());
    }

    #[test]
    fn malformed_json_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        write_jsonl(&path, &["not json", r#"{"sessionId":"ok","cwd":"/tmp"}"#]);
        let meta = extract_meta(&path, AgentFamily::Claude);
        assert_eq!(meta.session_id.as_deref(), Some("ok"));
    }

    #[test]
    fn last_user_message_picks_most_recent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        write_jsonl(
            &path,
            &[
                r#"{"sessionId":"ok","cwd":"/tmp"}"#,
                r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"first"}]}}"#,
                r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"reply"}]}}"#,
                r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"second"}]}}"#,
            ],
        );
        let meta = extract_meta(&path, AgentFamily::Claude);
        assert_eq!(meta.last_user_message.as_deref(), Some("second"));
    }
}
