//! Event taxonomy adapters (§4.8): normalise heterogeneous per-vendor JSONL lines
//! into a fixed `{kind, role, text, source}` shape.
//!
//! Shared by `agentboard-discovery` (lastUserMessage / token-count enrichment) and
//! `agentboard-match` (assistant/user text extraction for similarity). Adapters are
//! explicit `type`/`payload.type` dispatch, never field-name reflection, per the
//! design note in §9.

use serde_json::Value;

/// Coarse shape of a normalised event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Message,
    ToolCall,
    ToolResult,
    SystemOther,
    Unknown,
}

/// The conversational role the event is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRole {
    User,
    Assistant,
    System,
    Unknown,
}

/// One normalised event extracted from a single JSONL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEvent {
    pub kind: EventKind,
    pub role: EventRole,
    pub text: String,
    /// Which adapter produced this event, for diagnostics.
    pub source: &'static str,
}

fn role_from_str(s: &str) -> EventRole {
    match s {
        "user" => EventRole::User,
        "assistant" => EventRole::Assistant,
        "system" => EventRole::System,
        _ => EventRole::Unknown,
    }
}

/// Concatenate the text-bearing entries of a `content` array (Claude and Codex both
/// use this shape): each entry is either a bare string or `{"type": ..., "text":
/// ...}` with `type` in the accepted set.
fn join_content_array(content: &[Value], accepted_types: &[&str]) -> String {
    let mut parts = Vec::new();
    for item in content {
        match item {
            Value::String(s) => parts.push(s.clone()),
            Value::Object(obj) => {
                let kind = obj.get("type").and_then(Value::as_str).unwrap_or("");
                if accepted_types.is_empty() || accepted_types.contains(&kind) {
                    if let Some(text) = obj.get("text").and_then(Value::as_str) {
                        parts.push(text.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    parts.join("")
}

/// Codex `response_item` / `message`: `payload.type == "message"`, `payload.role`,
/// `payload.content[*]` where `type in {text, input_text, output_text}`.
fn try_codex_message(top: &Value) -> Option<ExtractedEvent> {
    let payload = top.get("payload")?;
    if payload.get("type").and_then(Value::as_str) != Some("message") {
        return None;
    }
    let role_str = payload.get("role").and_then(Value::as_str).unwrap_or("");
    let role = role_from_str(role_str);
    let content = payload.get("content").and_then(Value::as_array);
    let text = match content {
        Some(arr) => join_content_array(arr, &["text", "input_text", "output_text"]),
        None => payload
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    };
    Some(ExtractedEvent {
        kind: EventKind::Message,
        role,
        text,
        source: "codex_message",
    })
}

/// Codex `event_msg` / `user_message`: text lifted from `payload.message`.
fn try_codex_user_message(top: &Value) -> Option<ExtractedEvent> {
    let payload = top.get("payload")?;
    if payload.get("type").and_then(Value::as_str) != Some("user_message") {
        return None;
    }
    let text = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    Some(ExtractedEvent {
        kind: EventKind::Message,
        role: EventRole::User,
        text,
        source: "codex_user_message",
    })
}

/// Claude top-level `user`/`assistant`: `message.role` + `message.content[*]`
/// (strings or `{type, text}` objects), plus legacy top-level `content`/`text`.
fn try_claude_message(top: &Value) -> Option<ExtractedEvent> {
    let top_type = top.get("type").and_then(Value::as_str)?;
    if top_type != "user" && top_type != "assistant" {
        return None;
    }
    let role = role_from_str(top_type);

    if let Some(message) = top.get("message") {
        let content = message.get("content");
        let text = match content.and_then(Value::as_array) {
            Some(arr) => join_content_array(arr, &[]),
            None => content
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default(),
        };
        return Some(ExtractedEvent {
            kind: EventKind::Message,
            role,
            text,
            source: "claude_message",
        });
    }

    // Legacy top-level content/text.
    let text = top
        .get("content")
        .and_then(Value::as_str)
        .or_else(|| top.get("text").and_then(Value::as_str))
        .unwrap_or("")
        .to_string();
    Some(ExtractedEvent {
        kind: EventKind::Message,
        role,
        text,
        source: "claude_legacy",
    })
}

/// `tool_use` anywhere in the entry (top-level `type` or nested `content` item
/// type) → `tool_call` with `text = "[Tool: <name>]"`.
fn try_tool_use(top: &Value) -> Option<ExtractedEvent> {
    let is_tool_use_top = top.get("type").and_then(Value::as_str) == Some("tool_use");
    let nested = top
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_array)
        .and_then(|arr| {
            arr.iter()
                .find(|item| item.get("type").and_then(Value::as_str) == Some("tool_use"))
        });

    let tool_value = if is_tool_use_top {
        Some(top)
    } else {
        nested
    }?;

    let name = tool_value
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    Some(ExtractedEvent {
        kind: EventKind::ToolCall,
        role: EventRole::Assistant,
        text: format!("[Tool: {name}]"),
        source: "tool_use",
    })
}

/// `tool_result` / `custom_tool_call_output` → empty text, ignored by text
/// extractors but still a recognised event kind.
fn try_tool_result(top: &Value) -> Option<ExtractedEvent> {
    let top_type = top.get("type").and_then(Value::as_str)?;
    if top_type != "tool_result" && top_type != "custom_tool_call_output" {
        return None;
    }
    Some(ExtractedEvent {
        kind: EventKind::ToolResult,
        role: EventRole::System,
        text: String::new(),
        source: "tool_result",
    })
}

/// `result` → `system_other` with the `result` string.
fn try_result(top: &Value) -> Option<ExtractedEvent> {
    if top.get("type").and_then(Value::as_str) != Some("result") {
        return None;
    }
    let text = top
        .get("result")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    Some(ExtractedEvent {
        kind: EventKind::SystemOther,
        role: EventRole::System,
        text,
        source: "result",
    })
}

/// Fallback: any `message`/`content`/`text` string anywhere at the top level →
/// unknown-role event.
fn try_fallback(top: &Value) -> Option<ExtractedEvent> {
    let text = top
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| top.get("content").and_then(Value::as_str))
        .or_else(|| top.get("text").and_then(Value::as_str))?;
    Some(ExtractedEvent {
        kind: EventKind::Unknown,
        role: EventRole::Unknown,
        text: text.to_string(),
        source: "fallback",
    })
}

/// Run the fixed adapter chain over one parsed JSONL entry.
pub fn extract_event(top: &Value) -> Option<ExtractedEvent> {
    try_codex_message(top)
        .or_else(|| try_codex_user_message(top))
        .or_else(|| try_claude_message(top))
        .or_else(|| try_tool_use(top))
        .or_else(|| try_tool_result(top))
        .or_else(|| try_result(top))
        .or_else(|| try_fallback(top))
}
