//! Vendor root resolution (§4.1): `claude`, `codex`, `pi`, located via environment
//! overrides or OS-default config directories.

use std::env;
use std::path::PathBuf;

/// Resolved filesystem roots for the three recognised transcript layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRoots {
    pub claude: PathBuf,
    pub codex: PathBuf,
    pub pi: PathBuf,
}

fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl VendorRoots {
    /// Resolve roots from `CLAUDE_CONFIG_DIR`, `CODEX_HOME`, `PI_HOME` (§6), falling
    /// back to the vendor's conventional dotfile directory.
    pub fn from_env() -> Self {
        let home = home_dir();
        Self {
            claude: env::var_os("CLAUDE_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".claude")),
            codex: env::var_os("CODEX_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".codex")),
            pi: env::var_os("PI_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".pi")),
        }
    }

    pub fn claude_projects_dir(&self) -> PathBuf {
        self.claude.join("projects")
    }

    pub fn codex_sessions_dir(&self) -> PathBuf {
        self.codex.join("sessions")
    }

    pub fn pi_sessions_dir(&self) -> PathBuf {
        self.pi.join("sessions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_win_over_home_default() {
        // SAFETY: tests run single-threaded per-process here; this crate does not
        // rely on env mutation elsewhere concurrently.
        unsafe {
            env::set_var("CLAUDE_CONFIG_DIR", "/tmp/custom-claude");
        }
        let roots = VendorRoots::from_env();
        assert_eq!(roots.claude, PathBuf::from("/tmp/custom-claude"));
        unsafe {
            env::remove_var("CLAUDE_CONFIG_DIR");
        }
    }

    #[test]
    fn defaults_are_dotfiles_under_home() {
        unsafe {
            env::remove_var("CODEX_HOME");
        }
        let roots = VendorRoots::from_env();
        assert!(roots.codex.ends_with(".codex"));
    }
}
