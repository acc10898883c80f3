//! Enumerates vendor transcript roots, scans them for `.jsonl` files, and
//! enriches the results into `LogEntrySnapshot`s.

pub mod encode;
pub mod enrich;
pub mod extract;
pub mod roots;
pub mod scan;
pub mod timestamp;

pub use encode::{decode_project_path, encode_project_path};
pub use enrich::{KnownSession, enrich_batch, enrich_one};
pub use extract::{ExtractedMeta, extract_meta};
pub use roots::VendorRoots;
pub use scan::{DiscoveredLog, scan_all, scan_claude, scan_codex, scan_pi};
pub use timestamp::extract_last_entry_timestamp;

use std::path::Path;

use agentboard_match::{DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT, ExtractMode, count_tokens, extract_log_text};

/// The tail-extraction + tokenizer pipeline §4.3 point 3 points at: assistant+user
/// text from the trailing window, whitespace-tokenized after ANSI stripping.
pub fn count_tail_tokens(path: &Path) -> i64 {
    let text = extract_log_text(path, ExtractMode::AssistantUser, DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT);
    count_tokens(&text) as i64
}
