//! agentboard: AI coding agent tmux session correlator runtime binary.
//! Single-process binary embedding discovery, watching, matching, and
//! status tracking in-process.

use clap::Parser;

mod cli;
mod config;
mod daemon;
mod diagnostics;
mod search_tool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = config::DaemonConfig::from_env();

    match args.command {
        cli::Command::Daemon => {
            tracing::info!("agentboard daemon starting");

            let shutdown = tokio_util::sync::CancellationToken::new();
            let shutdown_signal = shutdown.clone();
            tokio::spawn(async move {
                wait_for_shutdown_signal().await;
                shutdown_signal.cancel();
            });

            daemon::run(config, shutdown).await?;
        }
        cli::Command::Status => {
            diagnostics::cmd_status(&config)?;
        }
        cli::Command::ListWindows => {
            diagnostics::cmd_list_windows(&config)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
