//! Pure status transition table (§4.5), independent of how events are sourced.
//!
//! | from            | log_found | user_prompt | assistant_tool_use | tool_result | turn_end | tool_stall    | idle_timeout |
//! |-----------------|-----------|--------------|---------------------|-------------|----------|---------------|--------------|
//! | unknown         | waiting   | working      | working             | working     | waiting  | needs_approval| unknown      |
//! | waiting         | waiting   | working      | working             | working     | waiting  | needs_approval| waiting      |
//! | working         | working   | working      | working             | working     | waiting  | needs_approval| working      |
//! | needs_approval  | needs_approval | working | working             | working     | waiting  | needs_approval| needs_approval|
//!
//! `permission` has no row: it is set and cleared by pane-content detection in
//! the WindowEnumerator, never by this machine. It behaves like any other
//! "from" state above — only `log_found` and `idle_timeout` leave it alone.

use std::time::{Duration, Instant};

use agentboard_core::{SessionStatus, StatusEvent};

/// Idle period after `assistant_tool_use` before a synthetic `tool_stall` fires.
pub const STALL_TIMEOUT: Duration = Duration::from_millis(3000);

/// Per-session status state, advanced one event at a time.
#[derive(Debug)]
pub struct StatusMachine {
    status: SessionStatus,
    pending_tool_use_at: Option<Instant>,
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusMachine {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Unknown,
            pending_tool_use_at: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Apply one event, returning the resulting status.
    pub fn apply(&mut self, event: StatusEvent, now: Instant) -> SessionStatus {
        self.status = transition(self.status, event);
        match event {
            StatusEvent::AssistantToolUse => self.pending_tool_use_at = Some(now),
            StatusEvent::ToolResult | StatusEvent::TurnEnd => self.pending_tool_use_at = None,
            _ => {}
        }
        self.status
    }

    /// Check the stall timer, synthesising and applying `tool_stall` if the
    /// pending tool use has been outstanding for `STALL_TIMEOUT` or more.
    /// Returns the new status only when the stall actually fired.
    pub fn check_stall(&mut self, now: Instant) -> Option<SessionStatus> {
        let pending_at = self.pending_tool_use_at?;
        if now.duration_since(pending_at) < STALL_TIMEOUT {
            return None;
        }
        self.pending_tool_use_at = None;
        Some(self.apply(StatusEvent::ToolStall, now))
    }
}

fn transition(from: SessionStatus, event: StatusEvent) -> SessionStatus {
    use StatusEvent::*;
    match event {
        LogFound => {
            if from == SessionStatus::Unknown {
                SessionStatus::Waiting
            } else {
                from
            }
        }
        UserPrompt | AssistantToolUse | ToolResult => SessionStatus::Working,
        TurnEnd => SessionStatus::Waiting,
        ToolStall => SessionStatus::NeedsApproval,
        IdleTimeout => from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_found_moves_unknown_to_waiting_only() {
        assert_eq!(
            transition(SessionStatus::Unknown, StatusEvent::LogFound),
            SessionStatus::Waiting
        );
        assert_eq!(
            transition(SessionStatus::Working, StatusEvent::LogFound),
            SessionStatus::Working
        );
    }

    #[test]
    fn activity_events_move_to_working_from_any_state() {
        for from in [
            SessionStatus::Unknown,
            SessionStatus::Waiting,
            SessionStatus::Working,
            SessionStatus::NeedsApproval,
        ] {
            assert_eq!(transition(from, StatusEvent::UserPrompt), SessionStatus::Working);
            assert_eq!(transition(from, StatusEvent::AssistantToolUse), SessionStatus::Working);
            assert_eq!(transition(from, StatusEvent::ToolResult), SessionStatus::Working);
        }
    }

    #[test]
    fn turn_end_always_moves_to_waiting() {
        assert_eq!(transition(SessionStatus::Working, StatusEvent::TurnEnd), SessionStatus::Waiting);
        assert_eq!(transition(SessionStatus::NeedsApproval, StatusEvent::TurnEnd), SessionStatus::Waiting);
    }

    #[test]
    fn idle_timeout_never_changes_status() {
        for from in [
            SessionStatus::Unknown,
            SessionStatus::Waiting,
            SessionStatus::Working,
            SessionStatus::NeedsApproval,
            SessionStatus::Permission,
        ] {
            assert_eq!(transition(from, StatusEvent::IdleTimeout), from);
        }
    }

    #[test]
    fn stall_fires_after_timeout_and_clears_pending() {
        let mut machine = StatusMachine::new();
        let t0 = Instant::now();
        machine.apply(StatusEvent::AssistantToolUse, t0);
        assert_eq!(machine.status(), SessionStatus::Working);

        assert!(machine.check_stall(t0).is_none());

        let after = t0 + STALL_TIMEOUT;
        let fired = machine.check_stall(after);
        assert_eq!(fired, Some(SessionStatus::NeedsApproval));
        assert!(machine.check_stall(after).is_none());
    }

    #[test]
    fn tool_result_before_timeout_clears_pending_stall() {
        let mut machine = StatusMachine::new();
        let t0 = Instant::now();
        machine.apply(StatusEvent::AssistantToolUse, t0);
        machine.apply(StatusEvent::ToolResult, t0);

        let after = t0 + STALL_TIMEOUT;
        assert!(machine.check_stall(after).is_none());
        assert_eq!(machine.status(), SessionStatus::Working);
    }
}
