//! WindowEnumerator: lists live multiplexer windows across the managed session and
//! any externally prefixed sessions (`DISCOVER_PREFIXES`, §6), captures their active
//! pane's scrollback, and infers a coarse status per window (§4.5 WindowEnumerator
//! row).

use std::collections::HashMap;

use agentboard_core::{SessionStatus, Window, WindowKey, WindowSource};
use chrono::Utc;

use crate::capture::capture_pane;
use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;
use crate::pane_info::{TmuxPaneInfo, list_panes};
use crate::status_infer::infer_status;

/// Default number of scrollback lines captured per window for status inference and
/// downstream matching (the matcher itself may request more via its own scrollback
/// parameter, §4.4).
pub const DEFAULT_CAPTURE_LINES: u32 = 200;

/// A window as observed by one enumeration pass, including the content snapshot used
/// for status inference and the downstream matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedWindow {
    pub window: Window,
    /// Representative pane id (the active pane, or the first pane if none is
    /// marked active).
    pub pane_id: String,
    /// Captured scrollback content (most recent `capture_lines` lines).
    pub content: String,
    pub status: SessionStatus,
}

/// Enumerates tmux windows and infers per-window status across poll cycles.
///
/// Keeps a content cache keyed by [`WindowKey`] so that status inference (§4.5) can
/// diff against the previous capture. The cache is pruned of windows that disappear
/// from one enumeration to the next.
pub struct WindowEnumerator<R: TmuxCommandRunner> {
    runner: R,
    managed_session: String,
    discover_prefixes: Vec<String>,
    capture_lines: u32,
    previous_content: HashMap<WindowKey, String>,
}

impl<R: TmuxCommandRunner> WindowEnumerator<R> {
    pub fn new(runner: R, managed_session: impl Into<String>) -> Self {
        Self {
            runner,
            managed_session: managed_session.into(),
            discover_prefixes: Vec::new(),
            capture_lines: DEFAULT_CAPTURE_LINES,
            previous_content: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_discover_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.discover_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn with_capture_lines(mut self, lines: u32) -> Self {
        self.capture_lines = lines;
        self
    }

    fn classify_session(&self, session_name: &str) -> Option<WindowSource> {
        if session_name == self.managed_session {
            Some(WindowSource::Managed)
        } else if self
            .discover_prefixes
            .iter()
            .any(|prefix| session_name.starts_with(prefix.as_str()))
        {
            Some(WindowSource::External)
        } else {
            None
        }
    }

    /// Run one enumeration pass: list panes, pick one representative pane per
    /// window, capture its content, and infer status. Windows absent from this pass
    /// are evicted from the content cache.
    pub fn enumerate(&mut self) -> Result<Vec<EnumeratedWindow>, TmuxError> {
        let panes = list_panes(&self.runner)?;
        let now = Utc::now();

        let mut by_window: HashMap<(String, String), &TmuxPaneInfo> = HashMap::new();
        for pane in &panes {
            if self.classify_session(&pane.session_name).is_none() {
                continue;
            }
            let entry = by_window
                .entry((pane.session_name.clone(), pane.window_id.clone()))
                .or_insert(pane);
            // Prefer the active pane as the window's representative.
            if pane.active && !entry.active {
                *entry = pane;
            }
        }

        let mut seen_keys = Vec::with_capacity(by_window.len());
        let mut result = Vec::with_capacity(by_window.len());

        for ((session_name, window_id), pane) in by_window {
            let source = match self.classify_session(&session_name) {
                Some(s) => s,
                None => continue,
            };
            let key = WindowKey::new(&session_name, &window_id);
            let content = capture_pane(&self.runner, &pane.pane_id, self.capture_lines)?.join("\n");
            let previous = self.previous_content.get(&key).map(String::as_str);
            let status = infer_status(previous, &content);
            self.previous_content.insert(key.clone(), content.clone());
            seen_keys.push(key.clone());

            let window = Window {
                key: key.clone(),
                name: pane.window_name.clone(),
                project_path: if pane.current_path.is_empty() {
                    None
                } else {
                    Some(pane.current_path.clone())
                },
                source,
                command: pane.current_cmd.clone(),
                created_at: now,
                last_activity: now,
            };

            result.push(EnumeratedWindow {
                window,
                pane_id: pane.pane_id.clone(),
                content,
                status,
            });
        }

        self.previous_content
            .retain(|key, _| seen_keys.contains(key));

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedRunner {
        responses: RefCell<Vec<(Vec<String>, String)>>,
    }

    impl ScriptedRunner {
        fn new(responses: Vec<(Vec<&str>, &str)>) -> Self {
            Self {
                responses: RefCell::new(
                    responses
                        .into_iter()
                        .map(|(args, out)| {
                            (args.into_iter().map(String::from).collect(), out.to_string())
                        })
                        .collect(),
                ),
            }
        }
    }

    impl TmuxCommandRunner for ScriptedRunner {
        fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
            let mut responses = self.responses.borrow_mut();
            let idx = responses
                .iter()
                .position(|(expected, _)| expected.iter().map(String::as_str).eq(args.iter().copied()));
            match idx {
                Some(i) => Ok(responses.remove(i).1),
                None => Ok(String::new()),
            }
        }
    }

    fn list_panes_output() -> &'static str {
        "$0\tagentboard\t@1\tclaude\t%0\tclaude\t/tmp/alpha\ttitle\t200\t50\t1\t1\n\
         $1\tother-proj\t@2\tcodex\t%1\tcodex\t/tmp/beta\ttitle\t200\t50\t1\t1\n\
         $2\tunrelated\t@3\tshell\t%2\tzsh\t/tmp/gamma\ttitle\t80\t24\t1\t1\n"
    }

    #[test]
    fn enumerates_managed_and_prefixed_sessions_only() {
        let runner = ScriptedRunner::new(vec![
            (vec!["list-panes", "-a", "-F", LIST_PANES_FORMAT_STR], list_panes_output()),
            (vec!["capture-pane", "-p", "-S", "-200", "-t", "%0"], "hello claude"),
            (vec!["capture-pane", "-p", "-S", "-200", "-t", "%1"], "hello codex"),
        ]);
        let mut enumerator = WindowEnumerator::new(runner, "agentboard")
            .with_discover_prefixes(vec!["other".to_string()]);

        let windows = enumerator.enumerate().expect("enumerate");
        assert_eq!(windows.len(), 2);
        let sources: Vec<_> = windows.iter().map(|w| w.window.source).collect();
        assert!(sources.contains(&WindowSource::Managed));
        assert!(sources.contains(&WindowSource::External));
    }

    #[test]
    fn first_pass_status_is_unknown_second_pass_waiting() {
        let runner = ScriptedRunner::new(vec![
            (vec!["list-panes", "-a", "-F", LIST_PANES_FORMAT_STR], list_panes_output()),
            (vec!["capture-pane", "-p", "-S", "-200", "-t", "%0"], "same content"),
            (vec!["capture-pane", "-p", "-S", "-200", "-t", "%1"], "same content"),
        ]);
        let mut enumerator = WindowEnumerator::new(runner, "agentboard");
        let first = enumerator.enumerate().expect("enumerate");
        assert!(first.iter().all(|w| w.status == SessionStatus::Unknown));

        // Re-run against a fresh runner with identical output to simulate unchanged content.
        let runner2 = ScriptedRunner::new(vec![
            (vec!["list-panes", "-a", "-F", LIST_PANES_FORMAT_STR], list_panes_output()),
            (vec!["capture-pane", "-p", "-S", "-200", "-t", "%0"], "same content"),
            (vec!["capture-pane", "-p", "-S", "-200", "-t", "%1"], "same content"),
        ]);
        enumerator.runner = runner2;
        let second = enumerator.enumerate().expect("enumerate");
        assert!(second.iter().all(|w| w.status == SessionStatus::Waiting));
    }

    const LIST_PANES_FORMAT_STR: &str = crate::pane_info::LIST_PANES_FORMAT;
}
