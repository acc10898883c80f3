//! Recursive filesystem watching of vendor transcript directories with debounced,
//! max-wait-bounded batch delivery.

pub mod debounce;
pub mod dirs;
pub mod error;
pub mod filter;
pub mod watcher;

pub use debounce::{DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_WAIT_MS, DebounceBatcher};
pub use dirs::resolve_watch_dir;
pub use error::WatchError;
pub use filter::accepts_path;
pub use watcher::LogWatcher;
