//! Translate a normalised transcript entry (§4.8's `ExtractedEvent`) into the
//! StatusMachine's event alphabet (§4.5). Synthesised events (`log_found`,
//! `tool_stall`, `idle_timeout`) are not produced here — they come from the
//! watcher and the stall timer.

use agentboard_core::{EventKind, EventRole, ExtractedEvent, StatusEvent};

/// `None` means the line carries no status-relevant signal (e.g. plain
/// assistant prose with no tool call, or an unrecognised entry).
pub fn classify(event: &ExtractedEvent) -> Option<StatusEvent> {
    match (event.kind, event.role) {
        (EventKind::Message, EventRole::User) => Some(StatusEvent::UserPrompt),
        (EventKind::ToolCall, _) => Some(StatusEvent::AssistantToolUse),
        (EventKind::ToolResult, _) => Some(StatusEvent::ToolResult),
        (EventKind::SystemOther, _) if event.source == "result" => Some(StatusEvent::TurnEnd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, role: EventRole, source: &'static str) -> ExtractedEvent {
        ExtractedEvent {
            kind,
            role,
            text: String::new(),
            source,
        }
    }

    #[test]
    fn user_message_is_user_prompt() {
        let e = event(EventKind::Message, EventRole::User, "claude_message");
        assert_eq!(classify(&e), Some(StatusEvent::UserPrompt));
    }

    #[test]
    fn assistant_message_has_no_signal() {
        let e = event(EventKind::Message, EventRole::Assistant, "claude_message");
        assert_eq!(classify(&e), None);
    }

    #[test]
    fn tool_call_is_assistant_tool_use() {
        let e = event(EventKind::ToolCall, EventRole::Assistant, "tool_use");
        assert_eq!(classify(&e), Some(StatusEvent::AssistantToolUse));
    }

    #[test]
    fn tool_result_maps_through() {
        let e = event(EventKind::ToolResult, EventRole::System, "tool_result");
        assert_eq!(classify(&e), Some(StatusEvent::ToolResult));
    }

    #[test]
    fn result_entry_is_turn_end() {
        let e = event(EventKind::SystemOther, EventRole::System, "result");
        assert_eq!(classify(&e), Some(StatusEvent::TurnEnd));
    }

    #[test]
    fn unrecognised_source_has_no_signal() {
        let e = event(EventKind::Unknown, EventRole::Unknown, "fallback");
        assert_eq!(classify(&e), None);
    }
}
