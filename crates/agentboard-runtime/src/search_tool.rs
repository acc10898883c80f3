//! `SubstringSearch` backed by an external regex/substring tool (§6:
//! `AGENTBOARD_SEARCH_BIN`), invoked the same way the matcher contract
//! describes: `-l` (list files with match), `-F` (literal needle), `--`
//! (end of flags) followed by the needle and candidate paths.

use std::path::PathBuf;
use std::process::Command;

use agentboard_match::{NaiveSubstringSearch, SubstringSearch, SubstringSearchError};

pub struct ExternalSubstringSearch {
    bin: String,
}

impl ExternalSubstringSearch {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl SubstringSearch for ExternalSubstringSearch {
    fn search(&self, needle: &str, candidates: &[PathBuf]) -> Result<Vec<PathBuf>, SubstringSearchError> {
        if candidates.is_empty() || needle.trim().is_empty() {
            return Ok(Vec::new());
        }

        let output = Command::new(&self.bin)
            .arg("-l")
            .arg("-F")
            .arg("--")
            .arg(needle)
            .args(candidates)
            .output()
            .map_err(|e| SubstringSearchError::ToolFailed(format!("{}: {e}", self.bin)))?;

        // Exit code 1 means "no matches" for grep-family tools, not a failure.
        if !output.status.success() && output.status.code() != Some(1) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubstringSearchError::ToolFailed(format!(
                "{} exited with {:?}: {}",
                self.bin,
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| SubstringSearchError::InvalidOutput(e.to_string()))?;
        Ok(stdout.lines().map(PathBuf::from).collect())
    }
}

/// Picked once at daemon startup from `AGENTBOARD_SEARCH_BIN` (§6). An enum
/// rather than a trait object: `LogPoller`'s cycle methods are generic over
/// `S: SubstringSearch`, which requires a `Sized` implementor.
pub enum SearchTool {
    Naive(NaiveSubstringSearch),
    External(ExternalSubstringSearch),
}

impl SearchTool {
    pub fn from_config(search_bin: Option<&str>) -> Self {
        match search_bin {
            Some(bin) => SearchTool::External(ExternalSubstringSearch::new(bin)),
            None => SearchTool::Naive(NaiveSubstringSearch),
        }
    }
}

impl SubstringSearch for SearchTool {
    fn search(&self, needle: &str, candidates: &[PathBuf]) -> Result<Vec<PathBuf>, SubstringSearchError> {
        match self {
            SearchTool::Naive(tool) => tool.search(needle, candidates),
            SearchTool::External(tool) => tool.search(needle, candidates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_candidates_short_circuit_without_spawning() {
        let tool = ExternalSubstringSearch::new("a-binary-that-does-not-exist");
        let hits = tool.search("anything", &[]).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn from_config_picks_naive_when_unset() {
        let tool = SearchTool::from_config(None);
        assert!(matches!(tool, SearchTool::Naive(_)));
    }

    #[test]
    fn from_config_picks_external_when_set() {
        let tool = SearchTool::from_config(Some("rg"));
        assert!(matches!(tool, SearchTool::External(_)));
    }
}
