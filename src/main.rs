//! diagstore CLI - serve the diagnostics API or look up stored submissions.

use clap::Parser;
use colored::*;
use diagstore::{Store, server};
use eyre::{Context, Result};
use std::path::PathBuf;

mod cli;

use cli::{Cli, Command};

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn data_dir(cli: &Cli) -> PathBuf {
    cli.dir.clone().unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("diagstore")
    })
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = data_dir(&cli);

    match cli.command {
        Command::Serve { bind } => {
            let store = Store::open(&data_dir).context("Failed to open diagnostics store")?;
            log::info!("Using data directory {}", data_dir.display());

            let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
            rt.block_on(server::serve(store, bind)).context("Server error")?;
        }

        Command::Get { id, json } => {
            let store = Store::open(&data_dir).context("Failed to open diagnostics store")?;
            let record = store.retrieve(&id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{} {}", "Reference:".bold(), record.reference_id.as_str().cyan());
                println!("{} {}", "Submitted:".bold(), record.submitted_at);
                println!("{} {}", "Client IP:".bold(), record.client_ip);
                if let Some(user_agent) = &record.user_agent {
                    println!("{} {}", "User agent:".bold(), user_agent);
                }
                if record.network_headers.is_empty() {
                    println!("{}", "No network headers captured".dimmed());
                } else {
                    println!("{}", "Network headers:".bold());
                    for (name, value) in &record.network_headers {
                        println!("  {}: {}", name.dimmed(), value);
                    }
                }
                println!("{}", "Diagnostics:".bold());
                println!("{}", serde_json::to_string_pretty(&record.diagnostics)?);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();
    run(cli)
}
