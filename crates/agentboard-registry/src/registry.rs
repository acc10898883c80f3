//! In-memory set of live windows (§4.6). Single logical serialiser: all mutation
//! goes through a `std::sync::Mutex` held only for the duration of one operation,
//! mirroring the teacher orchestrator's "one writer, broadcast to many readers"
//! shape.

use std::collections::HashMap;
use std::sync::Mutex;

use agentboard_core::WindowKey;
use tokio::sync::broadcast;

use crate::entry::{RegistryEntry, sort_key};
use crate::event::RegistryEvent;

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct SessionRegistry {
    entries: Mutex<HashMap<WindowKey, RegistryEntry>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to registry mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Replace the entire live set. Emits `session-removed` for every id present
    /// before the call but absent from `next`, then `sessions` with the new
    /// ordered list.
    pub fn replace_sessions(&self, next: Vec<RegistryEntry>) {
        let mut guard = self.entries.lock().expect("registry mutex poisoned");

        let next_ids: std::collections::HashSet<WindowKey> = next.iter().map(|e| e.id().clone()).collect();
        let removed: Vec<WindowKey> = guard
            .keys()
            .filter(|id| !next_ids.contains(*id))
            .cloned()
            .collect();

        *guard = next.into_iter().map(|e| (e.id().clone(), e)).collect();
        let ordered = Self::ordered(&guard);
        drop(guard);

        for id in removed {
            let _ = self.events.send(RegistryEvent::SessionRemoved(id));
        }
        let _ = self.events.send(RegistryEvent::Sessions(ordered));
    }

    /// Mutate one entry in place via `update`, emitting `session-update` if it
    /// existed. Returns the updated entry, or `None` if `id` was not live.
    pub fn update_session(&self, id: &WindowKey, update: impl FnOnce(&mut RegistryEntry)) -> Option<RegistryEntry> {
        let mut guard = self.entries.lock().expect("registry mutex poisoned");
        let entry = guard.get_mut(id)?;
        update(entry);
        let updated = entry.clone();
        drop(guard);

        let _ = self.events.send(RegistryEvent::SessionUpdate(updated.clone()));
        Some(updated)
    }

    pub fn get(&self, id: &WindowKey) -> Option<RegistryEntry> {
        self.entries.lock().expect("registry mutex poisoned").get(id).cloned()
    }

    /// All live entries, ordered by status rank ascending then activity descending
    /// (§4.6).
    pub fn get_all(&self) -> Vec<RegistryEntry> {
        let guard = self.entries.lock().expect("registry mutex poisoned");
        Self::ordered(&guard)
    }

    fn ordered(map: &HashMap<WindowKey, RegistryEntry>) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> = map.values().cloned().collect();
        entries.sort_by_key(sort_key);
        entries
    }
}
