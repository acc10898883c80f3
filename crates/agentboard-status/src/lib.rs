//! Per-session status derivation (§4.5): a pure transition table plus a file
//! tail that feeds it from a transcript.

pub mod classify;
pub mod machine;
pub mod watcher;

pub use classify::classify;
pub use machine::{STALL_TIMEOUT, StatusMachine};
pub use watcher::{BOOTSTRAP_BYTES, StatusWatcher};
