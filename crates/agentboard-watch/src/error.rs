use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to construct filesystem watcher: {0}")]
    WatcherInit(#[source] notify::Error),
}
