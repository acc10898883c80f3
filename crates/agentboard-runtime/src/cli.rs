//! CLI definition using clap derive, mirroring the teacher's `agtmux` shape
//! (§4.9): one mutating subcommand (`Daemon`) and two read-only diagnostics.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agentboard", about = "AI coding agent tmux session correlator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the registry refresher, log poller, and orphan-rematch task to completion.
    Daemon,
    /// Print the current SessionRegistry/SessionStore join as an ASCII table.
    Status,
    /// Dump the raw WindowEnumerator output for the configured session/prefixes.
    ListWindows,
}
