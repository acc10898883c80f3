//! Event filter (§4.2): accept only `.jsonl` paths, skip anything under a
//! `subagents/` segment.

use std::path::Path;

/// Whether `path` should be forwarded to the poller.
pub fn accepts_path(path: &Path) -> bool {
    let is_jsonl = path.extension().and_then(|e| e.to_str()) == Some("jsonl");
    let under_subagents = path.components().any(|c| c.as_os_str() == "subagents");
    is_jsonl && !under_subagents
}
