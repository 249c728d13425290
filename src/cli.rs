//! CLI argument parsing for diagstore.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "diagstore",
    about = "Reference-code store for browser network diagnostics",
    version
)]
pub struct Cli {
    /// Path to the data directory (default: ~/.local/share/diagstore)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the diagnostics API server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },

    /// Look up a stored submission by reference code
    Get {
        /// Reference code, e.g. AB2CD-EFGHJ-23456
        id: String,

        /// Print the raw record JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}
