//! The literal whitelist pattern that marks a `lastUserMessage` as a tool
//! notification rather than something a person typed (§4.7.2). These are the
//! bracketed placeholders produced by the event taxonomy's `tool_call` text
//! (`"[Tool: <name>]"`, §4.8) plus a couple of vendor-emitted stand-ins seen in
//! the same position.

const TOOL_NOTIFICATION_PREFIXES: [&str; 3] = ["[Tool:", "[Request interrupted", "[Command running"];

pub fn is_tool_notification(text: &str) -> bool {
    let trimmed = text.trim();
    TOOL_NOTIFICATION_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_bracket_is_a_notification() {
        assert!(is_tool_notification("[Tool: Bash]"));
    }

    #[test]
    fn plain_user_text_is_not_a_notification() {
        assert!(!is_tool_notification("please run the tests"));
    }

    #[test]
    fn leading_whitespace_is_tolerated() {
        assert!(is_tool_notification("  [Tool: Read]"));
    }
}
