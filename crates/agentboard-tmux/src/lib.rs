//! agentboard-tmux: multiplexer CLI backend and WindowEnumerator.
//!
//! Provides subprocess execution, pane/window listing, scrollback capture, pane
//! generation tracking, and coarse status inference from captured content. This is
//! the only crate permitted to shell out to the multiplexer CLI (§5).

pub mod capture;
pub mod enumerator;
pub mod error;
pub mod executor;
pub mod generation;
pub mod pane_info;
pub mod status_infer;

pub use capture::{capture_pane, inspect_pane_processes};
pub use enumerator::{EnumeratedWindow, WindowEnumerator};
pub use error::TmuxError;
pub use executor::{TmuxCommandRunner, TmuxExecutor};
pub use generation::PaneGenerationTracker;
pub use pane_info::{LIST_PANES_FORMAT, TmuxPaneInfo, list_panes, parse_list_panes_output};
pub use status_infer::infer_status;
