//! Environment-driven daemon configuration (§6).

use std::env;
use std::path::PathBuf;

const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2000;
const MIN_REFRESH_INTERVAL_MS: u64 = 500;
const DEFAULT_LOG_POLL_MS: u64 = 5000;
const MIN_LOG_POLL_MS: u64 = 2000;

fn home_dir() -> PathBuf {
    env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Daemon-wide configuration, resolved once at startup from the environment
/// (§6: `TMUX_SESSION`, `DISCOVER_PREFIXES`, `REFRESH_INTERVAL_MS`,
/// `AGENTBOARD_LOG_POLL_MS`, `AGENTBOARD_DB_PATH`, `AGENTBOARD_TMUX_BIN`,
/// `AGENTBOARD_SEARCH_BIN`).
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub managed_session: String,
    pub discover_prefixes: Vec<String>,
    pub refresh_interval_ms: u64,
    pub log_poll_ms: u64,
    pub db_path: PathBuf,
    pub tmux_bin: String,
    pub search_bin: Option<String>,
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        let discover_prefixes = env::var("DISCOVER_PREFIXES")
            .ok()
            .map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        let db_path = env::var_os("AGENTBOARD_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir().join(".agentboard").join("agentboard.db"));

        Self {
            managed_session: env::var("TMUX_SESSION").unwrap_or_else(|_| "agentboard".to_string()),
            discover_prefixes,
            refresh_interval_ms: env_u64("REFRESH_INTERVAL_MS", DEFAULT_REFRESH_INTERVAL_MS).max(MIN_REFRESH_INTERVAL_MS),
            log_poll_ms: env_u64("AGENTBOARD_LOG_POLL_MS", DEFAULT_LOG_POLL_MS).max(MIN_LOG_POLL_MS),
            db_path,
            tmux_bin: env::var("AGENTBOARD_TMUX_BIN").unwrap_or_else(|_| "tmux".to_string()),
            search_bin: env::var("AGENTBOARD_SEARCH_BIN").ok(),
        }
    }
}
