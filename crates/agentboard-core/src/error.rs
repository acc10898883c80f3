//! Cross-cutting error type for domain-level invariant violations.
//!
//! Per-subsystem I/O errors (tmux, discovery, the watcher, the store) live in their
//! own crates; this type is for violations of the data model itself (§3).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("window {0} is already claimed by session {1}")]
    WindowAlreadyClaimed(String, String),

    #[error("invalid window key: {0}")]
    InvalidWindowKey(String),

    #[error("session {0} not found")]
    SessionNotFound(String),
}
