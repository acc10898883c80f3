//! LogPollData enrichment (§4.3): turn a batch of paths into `LogEntrySnapshot`s,
//! taking a "known sessions" fast path that skips content reads for paths whose
//! identity is already cached.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use agentboard_core::{AgentFamily, LogEntrySnapshot};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::extract::extract_meta;

/// The subset of a previously known session's identity that the fast path
/// copies forward without re-reading the file (§4.3 point 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownSession {
    pub session_id: Option<String>,
    pub project_path: Option<String>,
    pub slug: Option<String>,
    pub agent_family: AgentFamily,
    pub is_exec: Option<bool>,
}

fn to_datetime(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

/// Enrich one path: `stat` it, then either copy a known identity (fast path,
/// `token_count` sentinel) or perform full extraction and token counting.
/// Returns `None` if the file no longer exists (§4.3 point 1: "silently
/// dropped").
pub fn enrich_one(
    path: &Path,
    known: &HashMap<PathBuf, KnownSession>,
    count_tokens: impl Fn(&Path) -> i64,
) -> Option<LogEntrySnapshot> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "log vanished before enrichment");
            return None;
        }
    };

    let mtime = to_datetime(metadata.modified()).unwrap_or_else(Utc::now);
    let birthtime = to_datetime(metadata.created());
    let size = metadata.len();

    if let Some(known) = known.get(path) {
        let is_exec = match known.is_exec {
            Some(value) => value,
            None if known.agent_family == AgentFamily::Codex => {
                extract_meta(path, known.agent_family).is_exec
            }
            None => false,
        };
        return Some(LogEntrySnapshot {
            path: path.to_path_buf(),
            mtime,
            birthtime,
            size,
            session_id: known.session_id.clone(),
            project_path: known.project_path.clone(),
            slug: known.slug.clone(),
            agent_family: known.agent_family,
            is_subagent: false,
            is_exec,
            token_count: LogEntrySnapshot::ENRICHMENT_SKIPPED,
            last_user_message: None,
        });
    }

    let family = infer_family_from_path(path);
    let meta = extract_meta(path, family);
    let token_count = count_tokens(path);

    Some(LogEntrySnapshot {
        path: path.to_path_buf(),
        mtime,
        birthtime,
        size,
        session_id: meta.session_id,
        project_path: meta.project_path,
        slug: meta.slug,
        agent_family: family,
        is_subagent: meta.is_subagent,
        is_exec: meta.is_exec,
        token_count,
        last_user_message: meta.last_user_message,
    })
}

fn infer_family_from_path(path: &Path) -> AgentFamily {
    let text = path.to_string_lossy();
    if text.contains("/projects/") {
        AgentFamily::Claude
    } else if text.contains("/sessions/") && text.contains("codex") {
        AgentFamily::Codex
    } else {
        AgentFamily::Unknown
    }
}

/// Enrich a batch of paths, dropping any that vanished, and sort the result by
/// `mtime` descending truncated to `max(1, max_logs)` (§4.3 last line).
pub fn enrich_batch(
    paths: &[PathBuf],
    known: &HashMap<PathBuf, KnownSession>,
    max_logs: usize,
    count_tokens: impl Fn(&Path) -> i64,
) -> Vec<LogEntrySnapshot> {
    let mut snapshots: Vec<LogEntrySnapshot> = paths
        .iter()
        .filter_map(|path| enrich_one(path, known, &count_tokens))
        .collect();
    snapshots.sort_by(|a, b| b.mtime.cmp(&a.mtime));
    snapshots.truncate(max_logs.max(1));
    snapshots
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
    fn full_extraction_path_counts_tokens_and_fills_identity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("projects").join("s.jsonl");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        write_jsonl(
            &path,
            &[r#"{"sessionId":"abc","cwd":"/tmp/x","slug":"slug-one"}"#],
        );

        let known = HashMap::new();
        let snapshot = enrich_one(&path, &known, |_| 42).unwrap();
        assert_eq!(snapshot.session_id.as_deref(), Some("abc"));
        assert_eq!(snapshot.token_count, 42);
        assert!(!snapshot.enrichment_skipped());
    }

    #[test]
    fn known_session_skips_enrichment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        fs::write(&path, "irrelevant").unwrap();

        let mut known = HashMap::new();
        known.insert(
            path.clone(),
            KnownSession {
                session_id: Some("cached-id".into()),
                project_path: Some("/tmp/cached".into()),
                slug: None,
                agent_family: AgentFamily::Claude,
                is_exec: Some(false),
            },
        );

        let snapshot = enrich_one(&path, &known, |_| panic!("should not be called")).unwrap();
        assert_eq!(snapshot.session_id.as_deref(), Some("cached-id"));
        assert!(snapshot.enrichment_skipped());
    }

    #[test]
    fn missing_file_yields_none() {
        let known = HashMap::new();
        let result = enrich_one(Path::new("/nonexistent/file.jsonl"), &known, |_| 0);
        assert!(result.is_none());
    }

    #[test]
    fn batch_sorts_by_mtime_descending_and_truncates() {
        let dir = tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 0..5 {
            let path = dir.path().join(format!("s{i}.jsonl"));
            fs::write(&path, "{}").unwrap();
            paths.push(path);
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let known = HashMap::new();
        let snapshots = enrich_batch(&paths, &known, 2, |_| 0);
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].mtime >= snapshots[1].mtime);
    }
}
