//! Core domain types shared by every subsystem: the live [`Window`] set, the on-disk
//! [`LogEntrySnapshot`] (transcript) set, and the logical [`Session`] that correlates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Vendor family of an AI coding agent, inferred from which transcript root a log was
/// found under.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentFamily {
    Claude,
    Codex,
    Pi,
    Unknown,
}

impl AgentFamily {
    pub const ALL: [AgentFamily; 4] = [
        AgentFamily::Claude,
        AgentFamily::Codex,
        AgentFamily::Pi,
        AgentFamily::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentFamily::Claude => "claude",
            AgentFamily::Codex => "codex",
            AgentFamily::Pi => "pi",
            AgentFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AgentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentFamily {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "claude" => AgentFamily::Claude,
            "codex" => AgentFamily::Codex,
            "pi" => AgentFamily::Pi,
            _ => AgentFamily::Unknown,
        })
    }
}

/// Whether a window lives in the managed multiplexer session or an externally
/// discovered one (matched via `DISCOVER_PREFIXES`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSource {
    Managed,
    External,
}

/// Stable identity of a multiplexer window: `sessionName:windowId`.
///
/// Stable only within one multiplexer run — windows are recreated with a fresh key
/// across multiplexer restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowKey(String);

impl WindowKey {
    pub fn new(session_name: impl AsRef<str>, window_id: impl AsRef<str>) -> Self {
        Self(format!("{}:{}", session_name.as_ref(), window_id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(session_name, window_id)`. Returns `None` if the key was not
    /// built with exactly one `:` separator.
    pub fn parts(&self) -> Option<(&str, &str)> {
        self.0.split_once(':')
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WindowKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A live multiplexer window, as last seen by the enumerator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub key: WindowKey,
    /// User-editable window name.
    pub name: String,
    /// Pane working directory, if resolvable.
    pub project_path: Option<String>,
    pub source: WindowSource,
    pub command: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Enriched, per-transcript-file metadata snapshot produced by LogPollData.
///
/// Identity is the absolute path. `token_count = -1` is the sentinel for "enrichment
/// skipped" (§I6): the path matched a known session and only size/activity fields
/// were refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntrySnapshot {
    pub path: PathBuf,
    pub mtime: DateTime<Utc>,
    pub birthtime: Option<DateTime<Utc>>,
    pub size: u64,
    pub session_id: Option<String>,
    pub project_path: Option<String>,
    pub slug: Option<String>,
    pub agent_family: AgentFamily,
    pub is_subagent: bool,
    pub is_exec: bool,
    /// -1 means enrichment was skipped via the known-sessions fast path.
    pub token_count: i64,
    pub last_user_message: Option<String>,
}

impl LogEntrySnapshot {
    pub const ENRICHMENT_SKIPPED: i64 = -1;

    pub fn enrichment_skipped(&self) -> bool {
        self.token_count == Self::ENRICHMENT_SKIPPED
    }
}

/// Coarse per-session status, derived by the StatusMachine and refined by
/// pane-content detection in the WindowEnumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NeedsApproval,
    Working,
    Waiting,
    Permission,
    Unknown,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Unknown
    }
}

impl SessionStatus {
    /// Sort rank used by SessionRegistry ordering: needs_approval < working <
    /// waiting < unknown. `permission` shares needs_approval's rank — both demand
    /// immediate user attention.
    pub fn sort_rank(&self) -> u8 {
        match self {
            SessionStatus::NeedsApproval | SessionStatus::Permission => 0,
            SessionStatus::Working => 1,
            SessionStatus::Waiting => 2,
            SessionStatus::Unknown => 3,
        }
    }
}

/// A logical, long-running agent conversation: the correlation of a transcript with
/// (at most one) live window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub log_file_path: PathBuf,
    pub project_path: Option<String>,
    pub slug: Option<String>,
    pub agent_family: AgentFamily,
    pub display_name: String,
    pub current_window: Option<WindowKey>,
    pub is_pinned: bool,
    pub last_resume_error: Option<String>,
    pub last_known_log_size: u64,
    pub last_user_message: Option<String>,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_codex_exec: bool,
}

impl Session {
    pub fn is_orphan(&self) -> bool {
        self.current_window.is_none()
    }
}

/// Event alphabet driving the StatusMachine (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    LogFound,
    UserPrompt,
    AssistantToolUse,
    ToolResult,
    TurnEnd,
    ToolStall,
    IdleTimeout,
}

/// Reasons a candidate window was rejected by the LogMatcher's window-selection
/// contract (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRejectReason {
    NoWindows,
    TooFewTokens,
    LowScore,
    LowGap,
}

/// Terminal error codes passed through to the (out-of-scope) HTTP/WS layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalErrorCode {
    ErrTmuxAttachFailed,
    ErrTmuxSwitchFailed,
    ErrInvalidWindow,
    ErrNotReady,
}

impl TerminalErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalErrorCode::ErrTmuxAttachFailed => "ERR_TMUX_ATTACH_FAILED",
            TerminalErrorCode::ErrTmuxSwitchFailed => "ERR_TMUX_SWITCH_FAILED",
            TerminalErrorCode::ErrInvalidWindow => "ERR_INVALID_WINDOW",
            TerminalErrorCode::ErrNotReady => "ERR_NOT_READY",
        }
    }
}
