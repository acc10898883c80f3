//! The registry's unit of record: a live window plus its currently computed
//! status. Identity is the window's key — the registry owns Window records,
//! not Session records (those belong to the store).

use agentboard_core::{SessionStatus, Window, WindowKey};

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub window: Window,
    pub status: SessionStatus,
}

impl RegistryEntry {
    pub fn new(window: Window, status: SessionStatus) -> Self {
        Self { window, status }
    }

    pub fn id(&self) -> &WindowKey {
        &self.window.key
    }
}

/// Ordering key used by `SessionRegistry::get_all` (§4.6): ascending status rank,
/// then descending last activity.
pub(crate) fn sort_key(entry: &RegistryEntry) -> (u8, std::cmp::Reverse<chrono::DateTime<chrono::Utc>>) {
    (entry.status.sort_rank(), std::cmp::Reverse(entry.window.last_activity))
}
