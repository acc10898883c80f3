//! Filesystem scanning for the three vendor layouts (§4.1). Every walk fails soft:
//! an unreadable directory is skipped rather than aborting the whole scan.

use std::fs;
use std::path::{Path, PathBuf};

use agentboard_core::AgentFamily;

use crate::roots::VendorRoots;

/// A discovered transcript path tagged with the vendor family it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLog {
    pub path: PathBuf,
    pub agent_family: AgentFamily,
}

fn is_jsonl(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}

fn has_subagents_segment(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "subagents")
}

/// Recursively collect every `.jsonl` file under `root`, skipping unreadable
/// directories and (optionally) any path containing a `subagents` segment.
fn walk_jsonl(root: &Path, exclude_subagents: bool, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if exclude_subagents && has_subagents_segment(&path) {
            continue;
        }
        if path.is_dir() {
            walk_jsonl(&path, exclude_subagents, out);
        } else if is_jsonl(&path) {
            out.push(path);
        }
    }
}

/// `<claude-root>/projects/<encoded-project-path>/*.jsonl`, excluding any directory
/// segment `subagents/`.
pub fn scan_claude(roots: &VendorRoots) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk_jsonl(&roots.claude_projects_dir(), true, &mut out);
    out
}

/// `<codex-root>/sessions/YYYY/MM/DD/*.jsonl`.
pub fn scan_codex(roots: &VendorRoots) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk_jsonl(&roots.codex_sessions_dir(), false, &mut out);
    out
}

/// `<pi-root>/sessions/**/*.jsonl`.
pub fn scan_pi(roots: &VendorRoots) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk_jsonl(&roots.pi_sessions_dir(), false, &mut out);
    out
}

/// Scan all three vendor roots and return every discovered transcript path, tagged
/// by family.
pub fn scan_all(roots: &VendorRoots) -> Vec<DiscoveredLog> {
    let mut out = Vec::new();
    out.extend(scan_claude(roots).into_iter().map(|path| DiscoveredLog {
        path,
        agent_family: AgentFamily::Claude,
    }));
    out.extend(scan_codex(roots).into_iter().map(|path| DiscoveredLog {
        path,
        agent_family: AgentFamily::Codex,
    }));
    out.extend(scan_pi(roots).into_iter().map(|path| DiscoveredLog {
        path,
        agent_family: AgentFamily::Pi,
    }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    #[test]
    fn scan_claude_finds_jsonl_and_skips_subagents() {
        let dir = tempdir().unwrap();
        let roots = VendorRoots {
            claude: dir.path().join(".claude"),
            codex: dir.path().join(".codex"),
            pi: dir.path().join(".pi"),
        };
        touch(&roots.claude_projects_dir().join("-tmp-alpha/session-1.jsonl"));
        touch(
            &roots
                .claude_projects_dir()
                .join("-tmp-alpha/subagents/nested.jsonl"),
        );
        touch(&roots.claude_projects_dir().join("-tmp-alpha/notes.txt"));

        let found = scan_claude(&roots);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("session-1.jsonl"));
    }

    #[test]
    fn scan_codex_walks_date_hierarchy() {
        let dir = tempdir().unwrap();
        let roots = VendorRoots {
            claude: dir.path().join(".claude"),
            codex: dir.path().join(".codex"),
            pi: dir.path().join(".pi"),
        };
        touch(&roots.codex_sessions_dir().join("2026/07/26/rollout.jsonl"));

        let found = scan_codex(&roots);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn scan_pi_is_fully_recursive() {
        let dir = tempdir().unwrap();
        let roots = VendorRoots {
            claude: dir.path().join(".claude"),
            codex: dir.path().join(".codex"),
            pi: dir.path().join(".pi"),
        };
        touch(&roots.pi_sessions_dir().join("a/b/c/session.jsonl"));

        let found = scan_pi(&roots);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn missing_root_returns_empty_without_error() {
        let dir = tempdir().unwrap();
        let roots = VendorRoots {
            claude: dir.path().join(".claude"),
            codex: dir.path().join(".codex"),
            pi: dir.path().join(".pi"),
        };
        assert!(scan_claude(&roots).is_empty());
        assert!(scan_codex(&roots).is_empty());
        assert!(scan_pi(&roots).is_empty());
    }

    #[test]
    fn scan_all_tags_by_family() {
        let dir = tempdir().unwrap();
        let roots = VendorRoots {
            claude: dir.path().join(".claude"),
            codex: dir.path().join(".codex"),
            pi: dir.path().join(".pi"),
        };
        touch(&roots.claude_projects_dir().join("-tmp/s.jsonl"));
        touch(&roots.codex_sessions_dir().join("2026/01/01/s.jsonl"));

        let found = scan_all(&roots);
        assert_eq!(found.len(), 2);
        assert!(
            found
                .iter()
                .any(|d| d.agent_family == AgentFamily::Claude)
        );
        assert!(found.iter().any(|d| d.agent_family == AgentFamily::Codex));
    }
}
