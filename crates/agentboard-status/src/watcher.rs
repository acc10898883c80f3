//! Tail a single session's JSONL transcript and drive its StatusMachine.
//!
//! Tracks a byte `position` and a partial-line `remainder`, mirroring the
//! claude-jsonl source's `SessionFileWatcher` (seek_pos/incomplete_buffer), but
//! detects rotation by `size < position` rather than inode change, and seeds
//! `position` from the last 64 KiB on attach instead of seeking straight to EOF.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Instant;

use agentboard_core::{SessionStatus, StatusEvent, extract_event};
use serde_json::Value;
use tracing::warn;

use crate::classify::classify;
use crate::machine::StatusMachine;

/// How much trailing history to replay when a watcher first attaches to a file.
pub const BOOTSTRAP_BYTES: u64 = 64 * 1024;

/// Per-session transcript tail, owning the StatusMachine it drives.
#[derive(Debug)]
pub struct StatusWatcher {
    path: PathBuf,
    position: u64,
    remainder: String,
    machine: StatusMachine,
}

impl StatusWatcher {
    /// Attach to `path`, seeding `position` from the tail (last `BOOTSTRAP_BYTES`)
    /// and replaying whatever complete lines fall within it.
    pub fn attach(path: PathBuf, now: Instant) -> Self {
        let mut watcher = Self {
            path,
            position: 0,
            remainder: String::new(),
            machine: StatusMachine::new(),
        };
        watcher.machine.apply(StatusEvent::LogFound, now);
        watcher.bootstrap(now);
        watcher
    }

    pub fn status(&self) -> SessionStatus {
        self.machine.status()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bootstrap(&mut self, now: Instant) {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(_) => return,
        };
        self.position = size.saturating_sub(BOOTSTRAP_BYTES);
        self.poll(now);
    }

    /// Read whatever is new since the last poll, feeding complete lines to the
    /// StatusMachine, then check the stall timer. Returns the resulting status.
    pub fn poll(&mut self, now: Instant) -> SessionStatus {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "status watcher: failed to stat transcript");
                self.machine.check_stall(now);
                return self.machine.status();
            }
        };

        if size < self.position {
            self.position = 0;
            self.remainder.clear();
        }

        if size > self.position {
            match self.read_range(self.position, size) {
                Ok(chunk) => {
                    self.position = size;
                    self.remainder.push_str(&chunk);
                    self.drain_lines(now);
                }
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "status watcher: failed to read transcript");
                }
            }
        }

        self.machine.check_stall(now);
        self.machine.status()
    }

    fn read_range(&self, start: u64, end: u64) -> std::io::Result<String> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; (end - start) as usize];
        file.read_exact(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn drain_lines(&mut self, now: Instant) {
        while let Some(idx) = self.remainder.find('\n') {
            let line = self.remainder[..idx].trim_end_matches('\r').to_string();
            self.remainder.drain(..=idx);
            self.apply_line(&line, now);
        }
    }

    fn apply_line(&mut self, line: &str, now: Instant) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
            return;
        };
        if let Some(event) = extract_event(&value).as_ref().and_then(classify) {
            self.machine.apply(event, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_line(path: &Path, line: &str) {
        let mut f = fs::OpenOptions::new().append(true).open(path).unwrap();
        writeln!(f, "{line}").unwrap();
    }

    #[test]
    fn attach_on_empty_file_starts_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        fs::write(&path, "").unwrap();

        let watcher = StatusWatcher::attach(path, Instant::now());
        assert_eq!(watcher.status(), SessionStatus::Waiting);
    }

    #[test]
    fn user_prompt_line_moves_to_working() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        fs::write(&path, "").unwrap();

        let now = Instant::now();
        let mut watcher = StatusWatcher::attach(path.clone(), now);
        write_line(&path, r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"hi"}]}}"#);

        assert_eq!(watcher.poll(now), SessionStatus::Working);
    }

    #[test]
    fn tool_use_then_result_returns_to_working_without_stall() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        fs::write(&path, "").unwrap();

        let now = Instant::now();
        let mut watcher = StatusWatcher::attach(path.clone(), now);
        write_line(&path, r#"{"type":"tool_use","name":"Bash"}"#);
        write_line(&path, r#"{"type":"tool_result"}"#);

        assert_eq!(watcher.poll(now), SessionStatus::Working);
        let later = now + crate::machine::STALL_TIMEOUT;
        assert_eq!(watcher.poll(later), SessionStatus::Working);
    }

    #[test]
    fn stalled_tool_use_becomes_needs_approval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        fs::write(&path, "").unwrap();

        let now = Instant::now();
        let mut watcher = StatusWatcher::attach(path.clone(), now);
        write_line(&path, r#"{"type":"tool_use","name":"Bash"}"#);
        assert_eq!(watcher.poll(now), SessionStatus::Working);

        let after = now + crate::machine::STALL_TIMEOUT;
        assert_eq!(watcher.poll(after), SessionStatus::NeedsApproval);
    }

    #[test]
    fn rotation_resets_position_and_rereads_from_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        fs::write(&path, "").unwrap();

        let now = Instant::now();
        let mut watcher = StatusWatcher::attach(path.clone(), now);
        write_line(&path, r#"{"type":"tool_use","name":"Bash"}"#);
        watcher.poll(now);
        assert!(watcher.position > 0);

        fs::write(&path, "").unwrap();
        write_line(&path, r#"{"type":"result","result":"done"}"#);
        assert_eq!(watcher.poll(now), SessionStatus::Waiting);
    }

    #[test]
    fn bootstrap_replays_tail_of_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        fs::write(
            &path,
            format!(
                "{}\n",
                r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"hi"}]}}"#
            ),
        )
        .unwrap();

        let watcher = StatusWatcher::attach(path, Instant::now());
        assert_eq!(watcher.status(), SessionStatus::Working);
    }
}
