//! Exact-match short-circuit (§4.4): before falling back to token-overlap
//! scoring, ask an external substring-search tool whether the session's
//! last-user-message appears verbatim in exactly one candidate transcript. A
//! unique hit wins outright; anything else (no hits, or more than one) defers
//! to the similarity path — a tie between paths is never treated as a match.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubstringSearchError {
    #[error("substring search tool failed: {0}")]
    ToolFailed(String),
    #[error("failed to parse substring search output: {0}")]
    InvalidOutput(String),
}

/// Contract for an external line/content search tool (e.g. ripgrep) invoked
/// with `-l`/`--json`/`--threads`-style semantics: given a literal needle and a
/// set of candidate files, report which files contain it.
pub trait SubstringSearch {
    fn search(&self, needle: &str, candidates: &[PathBuf]) -> Result<Vec<PathBuf>, SubstringSearchError>;
}

/// Run the exact-match short-circuit: search `candidates` for `needle` and
/// return the unique hit, or `None` if there were zero or multiple matches.
pub fn find_unique_match<S: SubstringSearch>(
    tool: &S,
    needle: &str,
    candidates: &[PathBuf],
) -> Result<Option<PathBuf>, SubstringSearchError> {
    if needle.trim().is_empty() {
        return Ok(None);
    }
    let hits = tool.search(needle, candidates)?;
    match hits.len() {
        1 => Ok(Some(hits.into_iter().next().expect("len checked"))),
        _ => Ok(None),
    }
}

/// A naive in-process `SubstringSearch` that reads each candidate fully and
/// checks for a literal substring. Used when no external tool is configured
/// and in tests; production callers are expected to supply a tool backed by a
/// real search binary for speed on large transcript sets.
pub struct NaiveSubstringSearch;

impl SubstringSearch for NaiveSubstringSearch {
    fn search(&self, needle: &str, candidates: &[PathBuf]) -> Result<Vec<PathBuf>, SubstringSearchError> {
        let mut hits = Vec::new();
        for candidate in candidates {
            let contents = std::fs::read_to_string(candidate)
                .map_err(|e| SubstringSearchError::ToolFailed(format!("{}: {e}", candidate.display())))?;
            if contents.contains(needle) {
                hits.push(candidate.clone());
            }
        }
        Ok(hits)
    }
}
