//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use console::Style;
use ephemera_config::{EphemeraConfig, LayerStatus, StoreSection};
use serde::Serialize;

use super::Context;

/// Project-local config file written by `config init --local`.
const LOCAL_CONFIG_FILE: &str = "ephemera.toml";

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Show which config files are checked and which were loaded
    Which,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./ephemera.toml) instead of user config
        #[arg(long)]
        local: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Config source listing for JSON output.
#[derive(Debug, Serialize)]
struct SourceOutput {
    path: PathBuf,
    status: &'static str,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Init { local, force } => cmd_init(ctx, local, force),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    // Fill in the store defaults so the output shows what a store would use.
    let mut resolved = ctx.config.config.clone();
    let store = resolved.store.get_or_insert_with(StoreSection::default);
    store.validate()?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("# Ephemera Configuration\n");

    let sources = ctx.config.loaded_from();
    if sources.is_empty() {
        println!("{}", dim.apply_to("# No config files loaded (using defaults)\n"));
    } else {
        for path in sources {
            println!("{}", dim.apply_to(format!("# Loaded: {}", path.display())));
        }
        println!();
    }

    if ctx.verbose {
        for warning in &ctx.config.warnings {
            println!("{}", dim.apply_to(format!("# Warning: {warning}")));
        }
    }

    print!("{}", resolved.to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let output: Vec<SourceOutput> = ctx
            .config
            .sources
            .iter()
            .map(|s| SourceOutput {
                path: s.path.clone(),
                status: s.status.as_str(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let yellow = Style::new().yellow();
    let dim = Style::new().dim();

    println!("Config files (lowest precedence first):");
    for source in &ctx.config.sources {
        let marker = match source.status {
            LayerStatus::Loaded => green.apply_to("● loaded"),
            LayerStatus::Rejected => yellow.apply_to("✗ rejected"),
            LayerStatus::Missing => dim.apply_to("○ not found"),
        };
        println!("  {} {}", marker, source.path.display());
    }
    Ok(())
}

fn cmd_init(ctx: &Context, local: bool, force: bool) -> Result<()> {
    let path = if local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        match &ctx.config_dir {
            Some(dir) => dir.join("config.toml"),
            None => ephemera_config::user_config_path()
                .context("could not determine the user config directory")?,
        }
    };

    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = EphemeraConfig {
        store: Some(StoreSection::default()),
        logging: None,
    };
    ephemera_config::save_config(&config, &path)?;

    if ctx.json_output {
        println!("{}", serde_json::json!({ "path": path }));
    } else {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
