//! Text normalisation shared by every similarity comparison (§4.4): strip ANSI CSI
//! sequences, C0/C1 controls, decorative box-drawing lines, and common
//! metadata/status chrome (timers, banners, UI glyphs), then lowercase and collapse
//! whitespace.

use std::sync::OnceLock;

use regex::Regex;

fn ansi_csi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ESC '[' ... final byte in 0x40-0x7E.
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid ansi regex"))
}

fn control_chars_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x00-\x08\x0b-\x1f\x7f]").expect("valid control regex"))
}

fn box_drawing_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A line consisting solely of box-drawing / separator glyphs and whitespace.
    RE.get_or_init(|| {
        Regex::new(r"^[\s\u{2500}-\u{257F}\u{2580}-\u{259F}\-_=]+$").expect("valid box regex")
    })
}

fn metadata_status_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Timer/banner/status chrome: "(12s · esc to interrupt)", "[1m32s]", spinner
    // glyphs, token counters.
    RE.get_or_init(|| {
        Regex::new(r"(?i)\(?\d+[ms]?\s*(·|\|)?\s*(esc to interrupt|tokens?|elapsed)\)?")
            .expect("valid metadata regex")
    })
}

/// Strip ANSI CSI escape sequences from `text`.
pub fn strip_ansi(text: &str) -> String {
    ansi_csi_regex().replace_all(text, "").into_owned()
}

/// Strip C0/C1 control characters (excluding `\n`, which callers split on).
pub fn strip_controls(text: &str) -> String {
    control_chars_regex().replace_all(text, "").into_owned()
}

/// Drop lines that are purely decorative box-drawing/separator chrome.
pub fn strip_box_drawing_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !box_drawing_line_regex().is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip recognisable metadata/status strings (timers, banners) that would
/// otherwise pollute token overlap with UI chrome rather than conversational text.
pub fn strip_metadata_status(text: &str) -> String {
    metadata_status_regex().replace_all(text, "").into_owned()
}

/// Collapse runs of whitespace (including newlines) into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full normalisation pipeline: ANSI → controls → box-drawing → metadata chrome →
/// lowercase → whitespace collapse.
pub fn normalize(text: &str) -> String {
    let text = strip_ansi(text);
    let text = strip_controls(&text);
    let text = strip_box_drawing_lines(&text);
    let text = strip_metadata_status(&text);
    let text = text.to_lowercase();
    collapse_whitespace(&text)
}
