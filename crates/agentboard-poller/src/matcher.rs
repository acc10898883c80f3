//! Window↔log matching orchestration (§4.4, §4.7.1 point 2): combine the
//! exact-match short-circuit with the token-overlap window-selection contract
//! over the live window set captured by the enumerator.

use std::path::{Path, PathBuf};

use agentboard_core::{AgentFamily, MatchRejectReason, WindowKey};
use agentboard_match::{
    DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT, ExtractMode, LAST_EXCHANGE_MIN_TOKENS, SubstringSearch,
    WindowSelectConfig, extract_log_text, find_unique_match, last_exchange_from_log, last_exchange_from_pane,
    select_window, tokenize,
};

/// One live window as seen by this poll cycle: its identity, captured
/// scrollback, and the agent family its pane content should be scanned for
/// (used only to pick the last-exchange prompt/bullet glyphs).
#[derive(Debug, Clone)]
pub struct WindowCandidate {
    pub key: WindowKey,
    pub content: String,
}

/// One exact-match short-circuit hit: `logPath → window` (§4.4 "Exact-match
/// short-circuit").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatch {
    pub log_path: PathBuf,
    pub window: WindowKey,
}

/// The last non-blank line of captured pane content, used as the distinctive
/// substring-search needle for a window (§4.4: "distinctive tokens captured
/// from each window's pane").
fn window_signature(content: &str) -> Option<&str> {
    content.lines().rev().map(str::trim).find(|line| !line.is_empty())
}

/// Run the exact-match short-circuit for every candidate window against the
/// set of candidate log paths. Each window's signature is searched against
/// paths not already claimed by an earlier window in this same pass — a path
/// claimed once is never handed to a second window (§9 open question: treat
/// "multiple paths matched" as a non-match, and symmetrically a path is never
/// double-claimed within one pass).
pub fn run_exact_matches<S: SubstringSearch>(
    tool: &S,
    windows: &[WindowCandidate],
    candidate_log_paths: &[PathBuf],
) -> Vec<ExactMatch> {
    let mut claimed: Vec<PathBuf> = Vec::new();
    let mut hits = Vec::new();

    for window in windows {
        let Some(signature) = window_signature(&window.content) else {
            continue;
        };
        let remaining: Vec<PathBuf> = candidate_log_paths
            .iter()
            .filter(|p| !claimed.contains(p))
            .cloned()
            .collect();

        match find_unique_match(tool, signature, &remaining) {
            Ok(Some(path)) => {
                claimed.push(path.clone());
                hits.push(ExactMatch { log_path: path, window: window.key.clone() });
            }
            Ok(None) => {}
            Err(_) => {
                // A tool failure degrades to "no exact match" for this window; the
                // similarity path still gets a chance (§7 tier 2: log and continue).
            }
        }
    }

    hits
}

/// Full-transcript scope window selection (§4.4 default scope): tokenize the
/// assistant+user text of the log tail and each window's raw scrollback, then
/// apply the window-selection contract.
pub fn select_full_transcript(
    log_path: &Path,
    windows: &[WindowCandidate],
    config: &WindowSelectConfig,
) -> Result<WindowKey, MatchRejectReason> {
    let log_text = extract_log_text(log_path, ExtractMode::AssistantUser, DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT);
    let log_tokens = tokenize(&log_text);

    let candidates: Vec<(WindowKey, Vec<String>)> = windows
        .iter()
        .map(|w| (w.key.clone(), tokenize(&w.content)))
        .collect();

    select_window(&log_tokens, &candidates, config)
}

/// `last-exchange` scope (§4.4): compare only the most recent user/assistant
/// turn on each side, useful for short sessions where full-transcript overlap
/// is too noisy. `min_tokens` defaults to 5 per §4.4 point 5 — callers should
/// pass a `WindowSelectConfig` with `min_tokens = LAST_EXCHANGE_MIN_TOKENS`.
pub fn select_last_exchange(
    log_path: &Path,
    windows: &[WindowCandidate],
    family: AgentFamily,
    config: &WindowSelectConfig,
) -> Result<WindowKey, MatchRejectReason> {
    let log_exchange = last_exchange_from_log(log_path);
    let log_tokens = tokenize(&log_exchange.joined_text());

    let candidates: Vec<(WindowKey, Vec<String>)> = windows
        .iter()
        .map(|w| {
            let exchange = last_exchange_from_pane(&w.content, family, 2000);
            (w.key.clone(), tokenize(&exchange.joined_text()))
        })
        .collect();

    select_window(&log_tokens, &candidates, config)
}

/// Default `WindowSelectConfig` for the `last-exchange` scope (§4.4 point 5).
pub fn last_exchange_config() -> WindowSelectConfig {
    WindowSelectConfig { min_tokens: LAST_EXCHANGE_MIN_TOKENS, ..WindowSelectConfig::default() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentboard_match::{SubstringSearchError, WindowSelectConfig};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    struct FakeTool {
        hits: RefCell<Vec<(String, Vec<PathBuf>)>>,
    }

    impl SubstringSearch for FakeTool {
        fn search(&self, needle: &str, candidates: &[PathBuf]) -> Result<Vec<PathBuf>, SubstringSearchError> {
            self.hits.borrow_mut().push((needle.to_string(), candidates.to_vec()));
            Ok(candidates
                .iter()
                .filter(|p| fs::read_to_string(p).unwrap_or_default().contains(needle))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn window_signature_takes_last_nonblank_line() {
        assert_eq!(window_signature("a\nb\n\n   \n"), Some("b"));
        assert_eq!(window_signature(""), None);
    }

    #[test]
    fn exact_match_claims_unique_hit_and_skips_it_for_later_windows() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jsonl");
        let b = dir.path().join("b.jsonl");
        fs::write(&a, "the distinctive phrase lives here").unwrap();
        fs::write(&b, "nothing matching here").unwrap();

        let windows = vec![
            WindowCandidate { key: WindowKey::new("sess", "1"), content: "banner\nthe distinctive phrase lives here".into() },
            WindowCandidate { key: WindowKey::new("sess", "2"), content: "banner\nunrelated tail content".into() },
        ];

        let tool = FakeTool { hits: RefCell::new(Vec::new()) };
        let hits = run_exact_matches(&tool, &windows, &[a.clone(), b.clone()]);
        assert_eq!(hits, vec![ExactMatch { log_path: a, window: WindowKey::new("sess", "1") }]);
    }

    #[test]
    fn full_transcript_selection_prefers_overlapping_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"alpha beta gamma delta epsilon zeta eta theta"}]}}"#,
            ),
        )
        .unwrap();

        let windows = vec![
            WindowCandidate { key: WindowKey::new("sess", "1"), content: "alpha beta gamma delta epsilon zeta eta theta".into() },
            WindowCandidate { key: WindowKey::new("sess", "2"), content: "completely unrelated pane content here".into() },
        ];

        let result = select_full_transcript(&path, &windows, &WindowSelectConfig::default());
        assert_eq!(result, Ok(WindowKey::new("sess", "1")));
    }
}
