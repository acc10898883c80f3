//! Coarse status inference from captured pane content.
//!
//! This is the WindowEnumerator's own heuristic (§2), distinct from the JSONL-driven
//! `StatusMachine` in `agentboard-status`: it classifies a window from scrollback
//! deltas and a fixed set of permission-prompt regexes, with no access to the
//! transcript at all. The HTTP/WS layer combines both signals; this crate only owns
//! the pane-content half.

use std::sync::OnceLock;

use agentboard_core::SessionStatus;
use regex::RegexSet;

/// Permission/approval prompt patterns observed across vendor CLIs. Matching any one
/// of these against the current pane content short-circuits to `Permission`
/// regardless of whether the content changed since the last capture.
const PERMISSION_PATTERNS: &[&str] = &[
    r"(?i)do you want to proceed",
    r"(?i)do you want to (make|create|apply) (this|these) (edit|change)",
    r"(?i)allow (this )?command",
    r"(?i)would you like to (allow|approve|continue)",
    r"(?i)press (y|enter) to (approve|continue|confirm)",
    r"\(y/n\)",
    r"\[y/N\]",
    r"(?i)waiting for (your )?(approval|confirmation)",
    r"(?i)permission (required|needed)",
];

fn permission_regex_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| RegexSet::new(PERMISSION_PATTERNS).expect("valid permission patterns"))
}

/// Classify a window's coarse status from its previous and current scrollback
/// capture.
///
/// - `Permission` if the current content matches any permission-prompt pattern.
/// - `Unknown` if there is no previous capture to diff against (first observation).
/// - `Working` if the content changed since the previous capture.
/// - `Waiting` if the content is unchanged (the agent produced no new output).
pub fn infer_status(previous: Option<&str>, current: &str) -> SessionStatus {
    if permission_regex_set().is_match(current) {
        return SessionStatus::Permission;
    }

    match previous {
        None => SessionStatus::Unknown,
        Some(prev) if prev == current => SessionStatus::Waiting,
        Some(_) => SessionStatus::Working,
    }
}
