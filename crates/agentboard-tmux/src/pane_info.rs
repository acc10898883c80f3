//! TmuxPaneInfo, list_panes format string, and parser.

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;
use serde::{Deserialize, Serialize};

/// Tab-delimited format string for `tmux list-panes -a -F`.
pub const LIST_PANES_FORMAT: &str = "#{session_id}\t#{session_name}\t#{window_id}\t#{window_name}\t#{pane_id}\t#{pane_current_command}\t#{pane_current_path}\t#{pane_title}\t#{pane_width}\t#{pane_height}\t#{pane_active}\t#{session_attached}\t#{pane_pid}";

/// Full metadata for a tmux pane.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TmuxPaneInfo {
    pub session_id: String,
    pub session_name: String,
    pub window_id: String,
    pub window_name: String,
    pub pane_id: String,
    pub current_cmd: String,
    pub current_path: String,
    pub pane_title: String,
    pub width: u16,
    pub height: u16,
    pub active: bool,
    pub session_attached: bool,
    /// PID of the process running in this pane (tmux `#{pane_pid}`).
    /// Used for deep process-tree inspection (T-128).
    pub pane_pid: Option<u32>,
}

/// Execute `tmux list-panes -a` and parse the output.
pub fn list_panes(runner: &impl TmuxCommandRunner) -> Result<Vec<TmuxPaneInfo>, TmuxError> {
    let output = runner.run(&["list-panes", "-a", "-F", LIST_PANES_FORMAT])?;
    parse_list_panes_output(&output)
}

/// Parse the raw output of `tmux list-panes -a -F <FORMAT>`.
pub fn parse_list_panes_output(output: &str) -> Result<Vec<TmuxPaneInfo>, TmuxError> {
    let mut panes = Vec::new();
    for (idx, line) in output.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let pane = parse_line(trimmed, idx + 1)?;
        panes.push(pane);
    }
    Ok(panes)
}

fn parse_line(line: &str, line_num: usize) -> Result<TmuxPaneInfo, TmuxError> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 11 {
        return Err(TmuxError::ParseError {
            line_num,
            detail: format!(
                "expected at least 11 tab-separated fields, got {}",
                parts.len()
            ),
        });
    }

    let width = parts[8].parse::<u16>().unwrap_or(80);
    let height = parts[9].parse::<u16>().unwrap_or(24);
    let active = parse_bool(parts[10]);
    let session_attached = if parts.len() > 11 {
        parse_bool(parts[11])
    } else {
        false
    };
    let pane_pid: Option<u32> = parts.get(12).and_then(|s| s.trim().parse().ok());

    Ok(TmuxPaneInfo {
        session_id: parts[0].to_string(),
        session_name: parts[1].to_string(),
        window_id: parts[2].to_string(),
        window_name: parts[3].to_string(),
        pane_id: parts[4].to_string(),
        current_cmd: parts[5].to_string(),
        current_path: parts[6].to_string(),
        pane_title: parts[7].to_string(),
        width,
        height,
        active,
        session_attached,
        pane_pid,
    })
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim(), "1" | "true")
}
