//! Ephemera - concurrent session store with idle expiry
//!
//! Main entry point for the Ephemera CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

mod commands;
mod logging;

use commands::{config, demo, soak};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Ephemera - concurrent session store with idle expiry
#[derive(Parser)]
#[command(name = "ephemera")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the user config.toml
    #[arg(long, global = true, env = "EPHEMERA_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a session through creation, update, read and reclamation
    Demo(demo::DemoArgs),

    /// Hammer a store from many concurrent workers and verify the result
    Soak(soak::SoakArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = ephemera_config::load_config(None, cli.config_dir.as_deref())
        .context("failed to load configuration")?;

    let _guard = logging::init(cli.verbose, loaded.config.logging.as_ref());

    for warning in &loaded.warnings {
        tracing::warn!("{warning}");
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, shutting down");
                shutdown.cancel();
            }
        });
    }

    let ctx = commands::Context {
        config: loaded,
        config_dir: cli.config_dir,
        json_output: cli.json,
        verbose: cli.verbose,
        shutdown,
    };

    match cli.command {
        Commands::Demo(args) => demo::run(args, &ctx).await,
        Commands::Soak(args) => soak::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
