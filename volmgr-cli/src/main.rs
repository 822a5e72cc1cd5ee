// SPDX-License-Identifier: GPL-3.0-only

mod render;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use volmgr_core::{Configuration, SetStateOutcome, SetStateRequest, StateService};
use volmgr_sys::{MountTableUsage, TomlFilePersister, load_graph};

#[derive(Debug, Parser)]
#[command(name = "volmgr")]
#[command(about = "Inspect and change object states in a volume configuration")]
struct Cli {
    /// Settings file (defaults to $VOLMGR_SETTINGS, then /etc/volmgr/volmgr.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Configuration graph, overriding the settings file
    #[arg(long, global = true)]
    graph: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Request a drive or subdisk state
    SetState {
        name: String,
        state: String,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        persist: bool,
    },
    /// Print every object with its state
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print aggregate health counters
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Mark a plex as syncing, or clear the mark
    Syncing {
        plex: String,
        #[arg(long)]
        clear: bool,
        #[arg(long)]
        persist: bool,
    },
}

fn report(name: &str, outcome: &SetStateOutcome) {
    if outcome.change.changed {
        println!("{name}: changed");
    } else {
        println!("{name}: unchanged");
    }
    if let Some(warning) = &outcome.persist_warning {
        eprintln!("warning: change applied but not saved: {warning}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load(cli.settings.as_deref())?;

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let graph_path = cli.graph.unwrap_or_else(|| settings.graph_path.clone());
    let description = load_graph(&graph_path)?;
    let config = Configuration::from_description(&description)
        .with_context(|| format!("building configuration from {}", graph_path.display()))?;
    tracing::debug!(
        "Loaded {} drives and {} subdisks from {}",
        config.drives().count(),
        config.subdisks().count(),
        graph_path.display()
    );

    let usage = MountTableUsage::new()
        .with_open_drives(settings.open_drives.clone())
        .with_mount_table(settings.use_mount_table);
    let service = StateService::new(
        config,
        Arc::new(usage),
        Arc::new(TomlFilePersister::new(&graph_path)),
    );

    match cli.command {
        Command::SetState {
            name,
            state,
            force,
            persist,
        } => {
            let mut request = SetStateRequest::new(&name, state);
            if force {
                request = request.force();
            }
            if persist {
                request = request.persist();
            }
            let outcome = service.set_state(&request).await?;
            report(&name, &outcome);
        }
        Command::List { json } => {
            let description = service.describe().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&description)?);
            } else {
                print!("{}", render::render_list(&description));
            }
        }
        Command::Status { json } => {
            let summary = service.summary().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render::render_summary(&summary));
            }
        }
        Command::Syncing {
            plex,
            clear,
            persist,
        } => {
            let outcome = service.set_plex_syncing(&plex, !clear, persist).await?;
            report(&plex, &outcome);
        }
    }

    Ok(())
}
