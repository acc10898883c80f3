//! Read-only diagnostic subcommands (§4.9): `status` and `list-windows`.
//! Each runs a single enumeration/store pass and exits — no daemon loop,
//! no socket. Mirrors the teacher's `agtmux status`/`list-panes` output
//! shape, minus the RPC round trip (this crate has no server component).

use agentboard_store::SessionStore;
use agentboard_tmux::{TmuxExecutor, WindowEnumerator};

use crate::config::DaemonConfig;

/// `agentboard status` — the SessionRegistry/SessionStore join as an ASCII
/// summary: one enumeration pass joined against whichever session owns each
/// window.
pub fn cmd_status(config: &DaemonConfig) -> anyhow::Result<()> {
    let store = SessionStore::open(&config.db_path)?;
    let executor = TmuxExecutor::new(config.tmux_bin.clone());
    let mut enumerator = WindowEnumerator::new(executor, config.managed_session.clone())
        .with_discover_prefixes(config.discover_prefixes.clone());
    let windows = enumerator.enumerate()?;

    let managed_count = windows
        .iter()
        .filter(|w| w.window.source == agentboard_core::WindowSource::Managed)
        .count();
    let external_count = windows.len() - managed_count;

    println!("agentboard status");
    println!(
        "Windows: {} total ({managed_count} managed, {external_count} external)",
        windows.len()
    );
    println!();
    println!("{:<28} {:<10} {:<22} {}", "WINDOW", "STATUS", "SESSION", "PROJECT");

    for ew in &windows {
        let session = store.get_by_window(&ew.window.key)?;
        let (session_label, project) = match &session {
            Some(s) => (s.display_name.clone(), s.project_path.clone().unwrap_or_default()),
            None => ("-".to_string(), ew.window.project_path.clone().unwrap_or_default()),
        };
        println!(
            "{:<28} {:<10} {:<22} {}",
            ew.window.key.as_str(),
            format!("{:?}", ew.status),
            session_label,
            project
        );
    }

    Ok(())
}

/// `agentboard list-windows` — raw `WindowEnumerator` dump, one pass.
pub fn cmd_list_windows(config: &DaemonConfig) -> anyhow::Result<()> {
    let executor = TmuxExecutor::new(config.tmux_bin.clone());
    let mut enumerator = WindowEnumerator::new(executor, config.managed_session.clone())
        .with_discover_prefixes(config.discover_prefixes.clone());
    let windows = enumerator.enumerate()?;

    for ew in &windows {
        println!("{ew:#?}");
    }

    Ok(())
}
