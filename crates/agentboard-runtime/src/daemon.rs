//! Daemon wiring: registry refresher + log poller + orphan-rematch task,
//! coordinated the way the teacher's poll_loop drives its own background
//! tasks — `tokio::select!` against a `CancellationToken` cancelled by
//! `ctrl_c`/`SIGTERM`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use agentboard_core::WindowKey;
use agentboard_discovery::{KnownSession, VendorRoots, scan_all};
use agentboard_poller::{LiveWindow, LogPoller, PollStats, PollerCallbacks};
use agentboard_registry::{RegistryEntry, SessionRegistry};
use agentboard_status::StatusWatcher;
use agentboard_store::SessionStore;
use agentboard_tmux::{TmuxExecutor, WindowEnumerator};
use agentboard_watch::LogWatcher;
use tokio::sync::{Mutex as TokioMutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::DaemonConfig;
use crate::search_tool::SearchTool;

struct TracingCallbacks;

impl PollerCallbacks for TracingCallbacks {
    fn on_session_orphaned(&self, session_id: &str, superseded_by: Option<&str>) {
        info!(session_id, superseded_by, "session orphaned");
    }

    fn on_session_activated(&self, session_id: &str, window: &WindowKey) {
        info!(session_id, window = %window.as_str(), "session activated");
    }
}

/// Runs the registry refresher and log poller to completion, stopping when
/// `shutdown` is cancelled. Orphan rematch (§4.7.4) runs once, after the
/// first log poll tick completes.
pub async fn run(config: DaemonConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let store = Arc::new(TokioMutex::new(SessionStore::open(&config.db_path)?));
    let registry = Arc::new(SessionRegistry::new());

    let executor = TmuxExecutor::new(config.tmux_bin.clone());
    let enumerator = Arc::new(StdMutex::new(
        WindowEnumerator::new(executor, config.managed_session.clone())
            .with_discover_prefixes(config.discover_prefixes.clone()),
    ));

    let substring_tool = SearchTool::from_config(config.search_bin.as_deref());
    let poller = Arc::new(LogPoller::default());
    let roots = VendorRoots::from_env();
    let live_windows: Arc<TokioMutex<Vec<LiveWindow>>> = Arc::new(TokioMutex::new(Vec::new()));
    let status_watchers: Arc<StdMutex<HashMap<String, StatusWatcher>>> = Arc::new(StdMutex::new(HashMap::new()));
    let callbacks = TracingCallbacks;

    // Watcher-driven polling is the primary path (§5); the interval below is
    // the periodic fallback in case a vendor directory isn't watchable (e.g.
    // it's the forbidden home directory, or inotify runs out of watches).
    let requested_dirs = vec![roots.claude_projects_dir(), roots.codex_sessions_dir(), roots.pi_sessions_dir()];
    let (batch_tx, mut batch_rx) = mpsc::channel::<Vec<PathBuf>>(16);
    let (watch_stop_tx, watch_stop_rx) = oneshot::channel();
    let watcher_handle = match LogWatcher::new(&requested_dirs) {
        Ok(watcher) => Some(tokio::spawn(watcher.run(batch_tx, watch_stop_rx))),
        Err(err) => {
            warn!(error = %err, "log watcher unavailable, relying on periodic scan only");
            None
        }
    };

    let mut refresh_tick = tokio::time::interval(Duration::from_millis(config.refresh_interval_ms));
    let mut poll_tick = tokio::time::interval(Duration::from_millis(config.log_poll_ms));
    let mut orphan_ran = false;

    info!(managed_session = %config.managed_session, db_path = %config.db_path.display(), "agentboard daemon starting");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested, stopping daemon");
                break;
            }
            _ = refresh_tick.tick() => {
                if let Err(err) = registry_refresh_tick(&enumerator, &store, &registry, &status_watchers, &live_windows).await {
                    warn!(error = %err, "registry refresh tick failed");
                }
            }
            Some(paths) = batch_rx.recv() => {
                match poll_changed_tick(&poller, &store, paths, &live_windows, &substring_tool, &callbacks).await {
                    Ok(stats) => log_poll_stats("watcher-driven poll complete", &stats),
                    Err(err) => warn!(error = %err, "watcher-driven poll failed"),
                }
            }
            _ = poll_tick.tick() => {
                match poll_once_tick(&poller, &store, &roots, &live_windows, &substring_tool, &callbacks).await {
                    Ok(stats) => log_poll_stats("poll cycle complete", &stats),
                    Err(err) => warn!(error = %err, "log poll tick failed"),
                }
                if !orphan_ran {
                    orphan_ran = true;
                    if let Err(err) = run_orphan_rematch(&poller, &store, &live_windows, &substring_tool, &callbacks).await {
                        warn!(error = %err, "orphan rematch failed");
                    }
                }
            }
        }
    }

    let _ = watch_stop_tx.send(());
    if let Some(handle) = watcher_handle {
        let _ = handle.await;
    }

    Ok(())
}

fn log_poll_stats(message: &'static str, stats: &PollStats) {
    info!(
        new_sessions = stats.new_sessions,
        updated_sessions = stats.updated_sessions,
        orphaned = stats.orphaned,
        activated = stats.activated,
        skipped_empty = stats.skipped_empty,
        duration_ms = stats.duration_ms,
        "{message}",
    );
}

/// One registry refresh: enumerate live windows (tmux calls run inside
/// `spawn_blocking`, §5), reconcile each window's status against its owning
/// session's `StatusWatcher` when one exists, and publish the result.
async fn registry_refresh_tick(
    enumerator: &Arc<StdMutex<WindowEnumerator<TmuxExecutor>>>,
    store: &Arc<TokioMutex<SessionStore>>,
    registry: &Arc<SessionRegistry>,
    status_watchers: &Arc<StdMutex<HashMap<String, StatusWatcher>>>,
    live_windows: &Arc<TokioMutex<Vec<LiveWindow>>>,
) -> anyhow::Result<()> {
    let enumerator = Arc::clone(enumerator);
    let enumerated = tokio::task::spawn_blocking(move || {
        let mut guard = enumerator.lock().expect("enumerator mutex poisoned");
        guard.enumerate()
    })
    .await??;

    let mut entries = Vec::with_capacity(enumerated.len());
    let mut windows = Vec::with_capacity(enumerated.len());
    {
        let store_guard = store.lock().await;
        let mut watchers = status_watchers.lock().expect("status watcher map poisoned");
        let now = Instant::now();

        for ew in &enumerated {
            let owning_session = store_guard.get_by_window(&ew.window.key)?;
            let status = match &owning_session {
                Some(session) => {
                    let watcher = watchers
                        .entry(session.session_id.clone())
                        .or_insert_with(|| StatusWatcher::attach(session.log_file_path.clone(), now));
                    watcher.poll(now)
                }
                None => ew.status,
            };

            entries.push(RegistryEntry::new(ew.window.clone(), status));
            windows.push(LiveWindow {
                key: ew.window.key.clone(),
                name: ew.window.name.clone(),
                project_path: ew.window.project_path.clone(),
                source: ew.window.source,
                content: ew.content.clone(),
            });
        }

        let live_ids: std::collections::HashSet<&String> =
            store_guard.list_active()?.iter().map(|s| &s.session_id).collect();
        watchers.retain(|session_id, _| live_ids.contains(session_id));
    }

    registry.replace_sessions(entries);
    *live_windows.lock().await = windows;
    Ok(())
}

/// One log poll: rescan every vendor log directory (§4.1) inside
/// `spawn_blocking`, then hand the full path set to `LogPoller::poll_once`.
async fn poll_once_tick(
    poller: &Arc<LogPoller>,
    store: &Arc<TokioMutex<SessionStore>>,
    roots: &VendorRoots,
    live_windows: &Arc<TokioMutex<Vec<LiveWindow>>>,
    substring_tool: &SearchTool,
    callbacks: &TracingCallbacks,
) -> anyhow::Result<PollStats> {
    let roots = roots.clone();
    let discovered = tokio::task::spawn_blocking(move || scan_all(&roots)).await?;
    let paths: Vec<PathBuf> = discovered.into_iter().map(|d| d.path).collect();

    let windows = live_windows.lock().await.clone();
    let store_guard = store.lock().await;
    let known = known_sessions(&store_guard)?;
    let stats = poller.poll_once(&store_guard, &windows, &paths, &known, substring_tool, callbacks)?;
    Ok(stats)
}

/// A watcher-driven poll: `paths` is the debounced batch `LogWatcher` just
/// delivered, so no directory rescan is needed.
async fn poll_changed_tick(
    poller: &Arc<LogPoller>,
    store: &Arc<TokioMutex<SessionStore>>,
    paths: Vec<PathBuf>,
    live_windows: &Arc<TokioMutex<Vec<LiveWindow>>>,
    substring_tool: &SearchTool,
    callbacks: &TracingCallbacks,
) -> anyhow::Result<PollStats> {
    let windows = live_windows.lock().await.clone();
    let store_guard = store.lock().await;
    let known = known_sessions(&store_guard)?;
    let stats = poller.poll_changed(&store_guard, &windows, &paths, &known, substring_tool, callbacks)?;
    Ok(stats)
}

async fn run_orphan_rematch(
    poller: &Arc<LogPoller>,
    store: &Arc<TokioMutex<SessionStore>>,
    live_windows: &Arc<TokioMutex<Vec<LiveWindow>>>,
    substring_tool: &SearchTool,
    callbacks: &TracingCallbacks,
) -> anyhow::Result<()> {
    let windows = live_windows.lock().await.clone();
    let store_guard = store.lock().await;
    let stats = poller.orphan_rematch(&store_guard, &windows, substring_tool, callbacks)?;
    info!(activated = stats.activated, "orphan rematch complete");
    Ok(())
}

fn known_sessions(store: &SessionStore) -> anyhow::Result<HashMap<PathBuf, KnownSession>> {
    let mut known = HashMap::new();
    for session in store.list_all()? {
        known.insert(
            session.log_file_path.clone(),
            KnownSession {
                session_id: Some(session.session_id),
                project_path: session.project_path,
                slug: session.slug,
                agent_family: session.agent_family,
                is_exec: Some(session.is_codex_exec),
            },
        );
    }
    Ok(known)
}
