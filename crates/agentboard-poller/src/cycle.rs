//! The controller (§4.7): drives one poll cycle over changed or fully-scanned
//! transcript paths, reconciles the result against the `SessionStore`, and
//! applies the supersede/orphan/rematch policies.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use agentboard_core::{AgentFamily, LogEntrySnapshot, Session, WindowKey, WindowSource};
use agentboard_discovery::{KnownSession, count_tail_tokens, enrich_batch, extract_last_entry_timestamp};
use agentboard_match::{SubstringSearch, WindowSelectConfig};
use agentboard_store::{SessionStore, StoreError};
use chrono::Utc;
use tracing::{info, warn};

use crate::cooldown::RematchCooldown;
use crate::display_name::{base_display_name, unique_display_name};
use crate::empty_log_cache::{EmptyLogCache, MIN_LOG_TOKENS_FOR_INSERT};
use crate::matcher::{ExactMatch, WindowCandidate, run_exact_matches, select_full_transcript};
use crate::notification::is_tool_notification;

/// A live multiplexer window as observed by this poll cycle, reduced to the
/// fields the controller needs — it never shells out to the multiplexer
/// itself (§5: only the match worker / enumerator do that).
#[derive(Debug, Clone)]
pub struct LiveWindow {
    pub key: WindowKey,
    pub name: String,
    pub project_path: Option<String>,
    pub source: WindowSource,
    pub content: String,
}

/// Per-cycle outcome counters (§8 P7: two identical polls should differ only
/// in `duration_ms`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollStats {
    pub new_sessions: usize,
    pub updated_sessions: usize,
    pub orphaned: usize,
    pub activated: usize,
    pub skipped_empty: usize,
    pub duration_ms: u64,
}

/// Callback surface consumed by the (out-of-scope) HTTP/WS layer (§6).
pub trait PollerCallbacks {
    fn on_session_orphaned(&self, _session_id: &str, _superseded_by: Option<&str>) {}
    fn on_session_activated(&self, _session_id: &str, _window: &WindowKey) {}
}

/// A callback surface that does nothing — used by callers (tests, `agentboard
/// list-windows`) that don't need the HTTP/WS push layer.
pub struct NoopCallbacks;
impl PollerCallbacks for NoopCallbacks {}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

fn try_enter<'a>(flag: &'a AtomicBool) -> Option<InFlightGuard<'a>> {
    flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .ok()
        .map(|_| InFlightGuard { flag })
}

/// The LogPoller controller (§4.7). Holds only the short-lived state the spec
/// allows it to own across cycles: the empty-log cache, the rematch-cooldown
/// map, and the two non-reentrancy flags (§5: "holds no persistent state
/// beyond the empty-log cache, the rematch-cooldown map, ... the in-flight
/// flag").
pub struct LogPoller {
    empty_log_cache: Mutex<EmptyLogCache>,
    cooldown: Mutex<RematchCooldown>,
    cycle_in_flight: AtomicBool,
    orphan_in_flight: AtomicBool,
    max_logs_per_poll: usize,
    window_select: WindowSelectConfig,
}

impl Default for LogPoller {
    fn default() -> Self {
        Self::new(25)
    }
}

impl LogPoller {
    pub fn new(max_logs_per_poll: usize) -> Self {
        Self {
            empty_log_cache: Mutex::new(EmptyLogCache::new()),
            cooldown: Mutex::new(RematchCooldown::new()),
            cycle_in_flight: AtomicBool::new(false),
            orphan_in_flight: AtomicBool::new(false),
            max_logs_per_poll,
            window_select: WindowSelectConfig::default(),
        }
    }

    /// A full scan cycle: `paths` is every transcript currently on disk.
    /// Shares the same non-reentrancy gate as [`Self::poll_changed`] (§5 G2).
    pub fn poll_once<S: SubstringSearch>(
        &self,
        store: &SessionStore,
        windows: &[LiveWindow],
        paths: &[PathBuf],
        known: &HashMap<PathBuf, KnownSession>,
        substring_tool: &S,
        callbacks: &impl PollerCallbacks,
    ) -> Result<PollStats, StoreError> {
        self.run_cycle(store, windows, paths, known, substring_tool, callbacks)
    }

    /// A watcher-driven cycle: `paths` is the deduped batch the `LogWatcher`
    /// just delivered. Identical reconciliation logic to `poll_once` — only
    /// the input set differs (§4.7.1 preamble).
    pub fn poll_changed<S: SubstringSearch>(
        &self,
        store: &SessionStore,
        windows: &[LiveWindow],
        paths: &[PathBuf],
        known: &HashMap<PathBuf, KnownSession>,
        substring_tool: &S,
        callbacks: &impl PollerCallbacks,
    ) -> Result<PollStats, StoreError> {
        self.run_cycle(store, windows, paths, known, substring_tool, callbacks)
    }

    fn run_cycle<S: SubstringSearch>(
        &self,
        store: &SessionStore,
        windows: &[LiveWindow],
        paths: &[PathBuf],
        known: &HashMap<PathBuf, KnownSession>,
        substring_tool: &S,
        callbacks: &impl PollerCallbacks,
    ) -> Result<PollStats, StoreError> {
        let Some(_guard) = try_enter(&self.cycle_in_flight) else {
            // G2: a poll already in flight — zero-effect stats, not an error.
            return Ok(PollStats::default());
        };

        let started = Instant::now();
        let mut stats = PollStats::default();

        // §4.3: enrich the batch; entries come back sorted mtime descending (G1).
        let entries = enrich_batch(paths, known, self.max_logs_per_poll, |p| count_tail_tokens(p));

        let window_candidates: Vec<WindowCandidate> = windows
            .iter()
            .map(|w| WindowCandidate { key: w.key.clone(), content: w.content.clone() })
            .collect();
        let entry_paths: Vec<PathBuf> = entries.iter().map(|e| e.path.clone()).collect();
        let exact_hits = run_exact_matches(substring_tool, &window_candidates, &entry_paths);
        let exact_by_path: HashMap<PathBuf, WindowKey> =
            exact_hits.into_iter().map(|h| (h.log_path, h.window)).collect();

        // Windows already owned by a session at cycle start, tracked so a later
        // step in this same cycle never double-claims one (§4.7.5).
        let mut claimed_this_cycle: HashSet<WindowKey> = HashSet::new();
        for window in windows {
            if store.get_by_window(&window.key)?.is_some() {
                claimed_this_cycle.insert(window.key.clone());
            }
        }

        let mut existing_display_names: Vec<String> =
            store.list_all()?.into_iter().map(|s| s.display_name).collect();

        for entry in &entries {
            let existing = match store.get_by_log_path(&entry.path)? {
                Some(found) => Some(found),
                None => match &entry.session_id {
                    Some(id) => store.get(id)?,
                    None => None,
                },
            };

            match existing {
                Some(record) => {
                    self.apply_existing(
                        store,
                        &record,
                        entry,
                        &window_candidates,
                        &exact_by_path,
                        &mut claimed_this_cycle,
                        callbacks,
                        &mut stats,
                    )?;
                }
                None => {
                    self.apply_new(
                        store,
                        entry,
                        &exact_by_path,
                        &mut claimed_this_cycle,
                        &mut existing_display_names,
                        callbacks,
                        &mut stats,
                    )?;
                }
            }
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_existing(
        &self,
        store: &SessionStore,
        record: &Session,
        entry: &LogEntrySnapshot,
        window_candidates: &[WindowCandidate],
        exact_by_path: &HashMap<PathBuf, WindowKey>,
        claimed_this_cycle: &mut HashSet<WindowKey>,
        callbacks: &impl PollerCallbacks,
        stats: &mut PollStats,
    ) -> Result<(), StoreError> {
        // Locking the last-user-message is an HTTP/WS-layer concern (§6:
        // `isLastUserMessageLocked`); the core controller treats it as never
        // locked and leaves external callers free to wrap this method.
        let locked = false;
        let mut updated = apply_log_entry_to_existing_record(record, entry, locked);
        let had_grown = entry.size > record.last_known_log_size;
        let match_eligible = entry.token_count >= MIN_LOG_TOKENS_FOR_INSERT || entry.enrichment_skipped();

        store.upsert(&updated)?;
        stats.updated_sessions += 1;

        if updated.current_window.is_none() && (had_grown || match_eligible) {
            let mut cooldown = self.cooldown.lock().expect("cooldown mutex poisoned");
            let now = Instant::now();
            if !cooldown.is_cooling_down(&updated.session_id, now) {
                cooldown.record_attempt(&updated.session_id, now);
                drop(cooldown);

                let candidate_window = exact_by_path.get(&entry.path).cloned().or_else(|| {
                    let unclaimed: Vec<WindowCandidate> = window_candidates
                        .iter()
                        .filter(|w| !claimed_this_cycle.contains(&w.key))
                        .cloned()
                        .collect();
                    select_full_transcript(&entry.path, &unclaimed, &self.window_select).ok()
                });

                if let Some(window) = candidate_window {
                    if try_claim_window(store, &window, claimed_this_cycle)? {
                        updated.current_window = Some(window.clone());
                        store.upsert(&updated)?;
                        callbacks.on_session_activated(&updated.session_id, &window);
                        stats.activated += 1;
                    }
                }
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_new(
        &self,
        store: &SessionStore,
        entry: &LogEntrySnapshot,
        exact_by_path: &HashMap<PathBuf, WindowKey>,
        claimed_this_cycle: &mut HashSet<WindowKey>,
        existing_display_names: &mut Vec<String>,
        callbacks: &impl PollerCallbacks,
        stats: &mut PollStats,
    ) -> Result<(), StoreError> {
        let Some(session_id) = entry.session_id.clone() else {
            // No extractable identity — a soft per-file failure (§7 tier 1).
            return Ok(());
        };

        if !entry.enrichment_skipped() && entry.token_count < MIN_LOG_TOKENS_FOR_INSERT {
            self.empty_log_cache.lock().expect("empty-log cache poisoned").record(&entry.path, entry.size);
            stats.skipped_empty += 1;
            return Ok(());
        }

        let now = Utc::now();
        let last_activity_at = extract_last_entry_timestamp(&entry.path).unwrap_or(entry.mtime);

        let mut session = Session {
            session_id: session_id.clone(),
            log_file_path: entry.path.clone(),
            project_path: entry.project_path.clone(),
            slug: entry.slug.clone(),
            agent_family: entry.agent_family,
            display_name: String::new(),
            current_window: None,
            is_pinned: false,
            last_resume_error: None,
            last_known_log_size: entry.size,
            last_user_message: entry.last_user_message.clone(),
            last_activity_at,
            created_at: now,
            is_codex_exec: entry.agent_family == AgentFamily::Codex && entry.is_exec,
        };

        // §4.7.3: slug-based supersede (plan→execute transition). Step 1 asks
        // for *active* sessions only — I5 allows several orphans to share a
        // (slug, project) pair alongside the one active session, so an
        // unfiltered lookup could latch onto an orphaned sibling instead.
        // §I5 guarantees at most one active match.
        let superseded = match &entry.slug {
            Some(slug) => {
                let candidates = store.get_by_slug_project(slug, entry.project_path.as_deref())?;
                candidates
                    .into_iter()
                    .find(|s| s.session_id != session_id && s.current_window.is_some())
            }
            None => None,
        };

        match superseded {
            Some(mut old) => {
                let inherited_window = old.current_window.take();
                let inherited_pinned = old.is_pinned;
                old.is_pinned = false;
                store.upsert(&old)?;

                session.current_window = inherited_window;
                session.is_pinned = inherited_pinned;
                session.display_name = old.display_name.clone();
                if let Some(window) = &session.current_window {
                    claimed_this_cycle.insert(window.clone());
                }

                stats.orphaned += 1;
                callbacks.on_session_orphaned(&old.session_id, Some(&session.session_id));
                info!(old_session = %old.session_id, new_session = %session.session_id, "session superseded by slug match");
            }
            None => {
                let base = base_display_name(&session_id, entry.slug.as_deref());
                session.display_name = unique_display_name(&base, existing_display_names);
            }
        }

        if session.current_window.is_none() {
            if let Some(window) = exact_by_path.get(&entry.path) {
                if try_claim_window(store, window, claimed_this_cycle)? {
                    session.current_window = Some(window.clone());
                }
            }
        }

        existing_display_names.push(session.display_name.clone());
        store.upsert(&session)?;
        stats.new_sessions += 1;
        Ok(())
    }

    /// §4.7.4: orphan rematch, run once at startup and then on demand.
    /// Singleton — a second attempt while one is running is a no-op (§5 G3).
    pub fn orphan_rematch<S: SubstringSearch>(
        &self,
        store: &SessionStore,
        windows: &[LiveWindow],
        substring_tool: &S,
        callbacks: &impl PollerCallbacks,
    ) -> Result<PollStats, StoreError> {
        let Some(_guard) = try_enter(&self.orphan_in_flight) else {
            return Ok(PollStats::default());
        };

        let started = Instant::now();
        let mut stats = PollStats::default();

        let mut claimed: HashSet<WindowKey> = HashSet::new();
        for window in windows {
            if store.get_by_window(&window.key)?.is_some() {
                claimed.insert(window.key.clone());
            }
        }

        let orphans = store.list_inactive()?;
        let mut unmatched: Vec<Session> = Vec::with_capacity(orphans.len());

        for orphan in orphans {
            let unclaimed: Vec<WindowCandidate> = windows
                .iter()
                .filter(|w| !claimed.contains(&w.key))
                .map(|w| WindowCandidate { key: w.key.clone(), content: w.content.clone() })
                .collect();

            let content_match = {
                let exact = run_exact_matches(substring_tool, &unclaimed, std::slice::from_ref(&orphan.log_file_path));
                exact
                    .into_iter()
                    .next()
                    .map(|h| h.window)
                    .or_else(|| select_full_transcript(&orphan.log_file_path, &unclaimed, &self.window_select).ok())
            };

            match content_match {
                Some(window) if try_claim_window(store, &window, &mut claimed)? => {
                    let mut activated = orphan.clone();
                    activated.current_window = Some(window.clone());
                    store.upsert(&activated)?;
                    callbacks.on_session_activated(&activated.session_id, &window);
                    stats.activated += 1;
                }
                _ => unmatched.push(orphan),
            }
        }

        // Name fallback: unclaimed managed-source windows keyed by unique name.
        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for window in windows {
            if window.source == WindowSource::Managed && !claimed.contains(&window.key) {
                *name_counts.entry(window.name.as_str()).or_insert(0) += 1;
            }
        }
        let unique_names: HashMap<&str, &WindowKey> = windows
            .iter()
            .filter(|w| w.source == WindowSource::Managed && !claimed.contains(&w.key))
            .filter(|w| name_counts.get(w.name.as_str()) == Some(&1))
            .map(|w| (w.name.as_str(), &w.key))
            .collect();

        for orphan in unmatched {
            let Some(window) = unique_names.get(orphan.display_name.as_str()) else {
                continue;
            };
            let window = (*window).clone();
            if try_claim_window(store, &window, &mut claimed)? {
                let mut activated = orphan.clone();
                activated.current_window = Some(window.clone());
                store.upsert(&activated)?;
                callbacks.on_session_activated(&activated.session_id, &window);
                stats.activated += 1;
            }
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;
        Ok(stats)
    }
}

/// §4.7.5: before claiming a window, re-query "session by window"; if another
/// session already owns it, decline rather than steal it.
fn try_claim_window(
    store: &SessionStore,
    window: &WindowKey,
    claimed_this_cycle: &mut HashSet<WindowKey>,
) -> Result<bool, StoreError> {
    if claimed_this_cycle.contains(window) {
        warn!(window = %window, "log_match_skipped_window_claimed");
        return Ok(false);
    }
    if store.get_by_window(window)?.is_some() {
        warn!(window = %window, "log_match_skipped_window_claimed");
        return Ok(false);
    }
    claimed_this_cycle.insert(window.clone());
    Ok(true)
}

/// §4.7.2: reconcile a freshly observed `LogEntrySnapshot` against the
/// existing `Session` record for the same identity, without touching the
/// store — callers decide when to persist the result.
pub fn apply_log_entry_to_existing_record(
    record: &Session,
    entry: &LogEntrySnapshot,
    last_user_message_locked: bool,
) -> Session {
    let mut next = record.clone();
    next.log_file_path = entry.path.clone();

    if entry.is_exec && !next.is_codex_exec {
        next.is_codex_exec = true;
    }

    if next.slug.is_none() {
        if let Some(slug) = &entry.slug {
            next.slug = Some(slug.clone());
        }
    }

    let has_grown = entry.size > record.last_known_log_size;
    let size_changed = entry.size != record.last_known_log_size;

    if has_grown {
        next.last_activity_at = extract_last_entry_timestamp(&entry.path).unwrap_or(entry.mtime);
    }
    if size_changed {
        next.last_known_log_size = entry.size;
    }

    if let Some(message) = &entry.last_user_message {
        if !last_user_message_locked && !is_tool_notification(message) {
            let record_is_notification =
                record.last_user_message.as_deref().map(is_tool_notification).unwrap_or(false);
            let differs = record.last_user_message.as_deref() != Some(message.as_str());
            if record.last_user_message.is_none() || record_is_notification || (size_changed && differs) {
                next.last_user_message = Some(message.clone());
            }
        }
    }

    next
}
