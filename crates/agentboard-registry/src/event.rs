use agentboard_core::WindowKey;

use crate::entry::RegistryEntry;

/// Broadcast notifications emitted by `SessionRegistry` mutations (§4.6).
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// A full replacement of the live set, already ordered (§4.6).
    Sessions(Vec<RegistryEntry>),
    /// One entry changed in place.
    SessionUpdate(RegistryEntry),
    /// An entry present in the previous set is no longer live.
    SessionRemoved(WindowKey),
}
