//! Recursive filesystem watch over a resolved set of directories (§4.2), built on
//! `notify` with a debounce+maxWait batcher bridging its synchronous callback into
//! async land the same way a teacher `FileSource` bridges `notify` events into a
//! tokio channel.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::debounce::{DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_WAIT_MS, DebounceBatcher};
use crate::dirs::resolve_watch_dir;
use crate::error::WatchError;
use crate::filter::accepts_path;

/// Idle poll interval when nothing is pending, just long enough to notice a stop
/// signal promptly without busy-looping.
const IDLE_POLL: Duration = Duration::from_secs(3600);

pub struct LogWatcher {
    notify_rx: mpsc::Receiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
    batcher: DebounceBatcher,
}

impl LogWatcher {
    /// Build a watcher over `requested_dirs` using the default debounce/maxWait.
    pub fn new(requested_dirs: &[PathBuf]) -> Result<Self, WatchError> {
        Self::with_timings(
            requested_dirs,
            Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            Duration::from_millis(DEFAULT_MAX_WAIT_MS),
        )
    }

    pub fn with_timings(requested_dirs: &[PathBuf], debounce: Duration, max_wait: Duration) -> Result<Self, WatchError> {
        let (notify_tx, notify_rx) = mpsc::channel::<notify::Result<Event>>(256);

        let mut watcher: RecommendedWatcher = {
            let tx = notify_tx.clone();
            notify::recommended_watcher(move |res| {
                let _ = tx.blocking_send(res);
            })
            .map_err(WatchError::WatcherInit)?
        };

        for requested in requested_dirs {
            match resolve_watch_dir(requested) {
                Some(resolved) => {
                    if let Err(err) = watcher.watch(&resolved, RecursiveMode::Recursive) {
                        warn!(dir = %resolved.display(), error = %err, "failed to watch directory");
                    }
                }
                None => {
                    warn!(dir = %requested.display(), "watch directory refused (missing ancestor, home, or root)");
                }
            }
        }

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            batcher: DebounceBatcher::new(debounce, max_wait),
        })
    }

    /// Drive the watcher until `stop_rx` fires, sending deduped batches of
    /// accepted paths to `batch_tx`. On stop, flushes any pending batch
    /// synchronously before returning (§4.2: `stop()` flushes synchronously).
    pub async fn run(mut self, batch_tx: mpsc::Sender<Vec<PathBuf>>, mut stop_rx: oneshot::Receiver<()>) {
        loop {
            let now = Instant::now();
            let wait = self.batcher.next_deadline(now).unwrap_or(IDLE_POLL);
            let sleep = tokio::time::sleep(wait);
            tokio::pin!(sleep);

            tokio::select! {
                _ = &mut stop_rx => {
                    self.flush_if_any(&batch_tx).await;
                    break;
                }
                _ = &mut sleep => {
                    if self.batcher.ready_to_flush(Instant::now()) {
                        self.flush_if_any(&batch_tx).await;
                    }
                }
                maybe_event = self.notify_rx.recv() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => warn!(error = %err, "filesystem watcher error"),
                        None => {
                            self.flush_if_any(&batch_tx).await;
                            break;
                        }
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        let now = Instant::now();
        for path in event.paths {
            if accepts_path(&path) {
                self.batcher.record(path, now);
            }
        }
    }

    async fn flush_if_any(&mut self, batch_tx: &mpsc::Sender<Vec<PathBuf>>) {
        if self.batcher.is_empty() {
            return;
        }
        let batch = self.batcher.flush();
        let _ = batch_tx.send(batch).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch_for_test(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(path, b"{}");
    }

    #[tokio::test]
    async fn flushes_batch_after_debounce_quiets() {
        let dir = tempdir().unwrap();
        let watch_dir = dir.path().to_path_buf();

        let watcher = LogWatcher::with_timings(
            &[watch_dir.clone()],
            Duration::from_millis(30),
            Duration::from_secs(5),
        )
        .unwrap();

        let (batch_tx, mut batch_rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = oneshot::channel();

        let handle = tokio::spawn(watcher.run(batch_tx, stop_rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        touch_for_test(&watch_dir.join("session.jsonl"));

        let batch = tokio::time::timeout(Duration::from_secs(2), batch_rx.recv())
            .await
            .expect("batch should arrive before timeout")
            .expect("channel should not close");

        assert_eq!(batch.len(), 1);
        assert!(batch[0].ends_with("session.jsonl"));

        let _ = stop_tx.send(());
        let _ = handle.await;
    }

    #[tokio::test]
    async fn stop_flushes_pending_batch_synchronously() {
        let dir = tempdir().unwrap();
        let watch_dir = dir.path().to_path_buf();

        let watcher = LogWatcher::with_timings(
            &[watch_dir.clone()],
            Duration::from_secs(30),
            Duration::from_secs(60),
        )
        .unwrap();

        let (batch_tx, mut batch_rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = oneshot::channel();

        let handle = tokio::spawn(watcher.run(batch_tx, stop_rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        touch_for_test(&watch_dir.join("session.jsonl"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let _ = stop_tx.send(());
        let _ = handle.await;

        let batch = batch_rx.recv().await.expect("stop should flush pending batch");
        assert_eq!(batch.len(), 1);
    }
}
