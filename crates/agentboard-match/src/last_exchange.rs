//! Last-exchange extraction (§4.4): pull the single most recent user/assistant
//! turn either from a log tail or from a captured tmux pane, for the
//! short-session matching path where a full-transcript comparison would be too
//! noisy.

use std::path::Path;

use agentboard_core::{AgentFamily, EventRole, extract_event};
use serde_json::Value;

use crate::extract_text::{DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT, read_tail_values};

/// The most recent user/assistant pair found in a transcript or pane, each
/// optional since a short session may only have produced one side so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastExchange {
    pub user: Option<String>,
    pub assistant: Option<String>,
}

impl LastExchange {
    /// Join whatever sides are present, most recent last, for tokenization.
    pub fn joined_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(u) = &self.user {
            parts.push(u.as_str());
        }
        if let Some(a) = &self.assistant {
            parts.push(a.as_str());
        }
        parts.join("\n")
    }
}

/// Scan a transcript's trailing window backward for the most recent user text
/// and the most recent assistant text, independent of their relative order.
pub fn last_exchange_from_log(path: &Path) -> LastExchange {
    let values = read_tail_values(path, DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT);
    last_exchange_from_values(&values)
}

fn last_exchange_from_values(values: &[Value]) -> LastExchange {
    let mut exchange = LastExchange::default();
    for value in values.iter().rev() {
        if exchange.user.is_some() && exchange.assistant.is_some() {
            break;
        }
        let Some(event) = extract_event(value) else {
            continue;
        };
        if event.text.is_empty() {
            continue;
        }
        match event.role {
            EventRole::User if exchange.user.is_none() => exchange.user = Some(event.text),
            EventRole::Assistant if exchange.assistant.is_none() => {
                exchange.assistant = Some(event.text)
            }
            _ => {}
        }
    }
    exchange
}

/// Prompt marker glyph that precedes a user-entered line in each agent's TUI.
fn prompt_marker(family: AgentFamily) -> char {
    match family {
        AgentFamily::Codex => '›',
        _ => '❯',
    }
}

/// Bullet marker glyph that precedes an assistant response line (tool-call
/// bullets use the same glyph, so callers filter those separately by content).
fn bullet_marker(family: AgentFamily) -> char {
    match family {
        AgentFamily::Codex => '•',
        _ => '⏺',
    }
}

/// Lines that look like a tool invocation rather than conversational assistant
/// text: "⏺ Bash(...)", "⏺ Read(...)" etc. Excluded from the bullet scan.
fn looks_like_tool_call(line: &str) -> bool {
    line.trim_start_matches(['⏺', '•', ' '])
        .split('(')
        .next()
        .map(|head| !head.is_empty() && head.chars().all(|c| c.is_alphanumeric()))
        .unwrap_or(false)
        && line.contains('(')
        && line.trim_end().ends_with(')')
}

/// Scan the last `tail_lines` of a captured tmux pane backward for the most
/// recent prompt-marker line (user input) and the most recent bullet-marker
/// line (assistant output) for `family`'s glyph conventions.
pub fn last_exchange_from_pane(pane_content: &str, family: AgentFamily, tail_lines: usize) -> LastExchange {
    let lines: Vec<&str> = pane_content.lines().collect();
    let start = lines.len().saturating_sub(tail_lines);
    let window = &lines[start..];

    let prompt = prompt_marker(family);
    let bullet = bullet_marker(family);

    let mut exchange = LastExchange::default();
    for line in window.iter().rev() {
        if exchange.user.is_some() && exchange.assistant.is_some() {
            break;
        }
        let trimmed = line.trim();
        if exchange.user.is_none() {
            if let Some(rest) = trimmed.strip_prefix(prompt) {
                let text = rest.trim();
                if !text.is_empty() {
                    exchange.user = Some(text.to_string());
                    continue;
                }
            }
        }
        if exchange.assistant.is_none() && trimmed.starts_with(bullet) && !looks_like_tool_call(trimmed) {
            let text = trimmed.trim_start_matches(bullet).trim();
            if !text.is_empty() {
                exchange.assistant = Some(text.to_string());
            }
        }
    }
    exchange
}
