//! §4.7.1: logs too small to be worth inserting are remembered by size so a
//! following poll that observes the same size can skip them without re-reading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Below this token count a freshly discovered log is parked in the cache
/// instead of inserted as a session.
pub const MIN_LOG_TOKENS_FOR_INSERT: i64 = 1;

#[derive(Debug, Default)]
pub struct EmptyLogCache {
    sizes: HashMap<PathBuf, u64>,
}

impl EmptyLogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `path` was last seen empty at exactly `size` bytes — no point
    /// re-extracting until it grows.
    pub fn should_skip(&self, path: &Path, size: u64) -> bool {
        self.sizes.get(path) == Some(&size)
    }

    pub fn record(&mut self, path: &Path, size: u64) {
        self.sizes.insert(path.to_path_buf(), size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_path_is_not_skipped() {
        let cache = EmptyLogCache::new();
        assert!(!cache.should_skip(Path::new("/tmp/a.jsonl"), 0));
    }

    #[test]
    fn recorded_size_is_skipped_until_it_changes() {
        let mut cache = EmptyLogCache::new();
        cache.record(Path::new("/tmp/a.jsonl"), 12);
        assert!(cache.should_skip(Path::new("/tmp/a.jsonl"), 12));
        assert!(!cache.should_skip(Path::new("/tmp/a.jsonl"), 40));
    }
}
