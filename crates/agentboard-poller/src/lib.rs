//! agentboard-poller: the controller (§4.7) that drives discovery, watching,
//! and matching into `SessionStore` mutations and lifecycle callbacks.

pub mod cooldown;
pub mod cycle;
pub mod display_name;
pub mod empty_log_cache;
pub mod matcher;
pub mod notification;

pub use cooldown::{REMATCH_COOLDOWN_MS, RematchCooldown};
pub use cycle::{
    LiveWindow, LogPoller, NoopCallbacks, PollStats, PollerCallbacks, apply_log_entry_to_existing_record,
};
pub use display_name::{base_display_name, unique_display_name};
pub use empty_log_cache::{EmptyLogCache, MIN_LOG_TOKENS_FOR_INSERT};
pub use matcher::{ExactMatch, WindowCandidate, last_exchange_config, run_exact_matches, select_full_transcript, select_last_exchange};
pub use notification::is_tool_notification;
