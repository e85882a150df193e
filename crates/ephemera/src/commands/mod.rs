//! CLI command handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use ephemera_config::LoadedConfig;
use ephemera_session::StoreConfig;
use tokio_util::sync::CancellationToken;

pub mod config;
pub mod demo;
pub mod soak;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration after layering.
    pub config: LoadedConfig,
    /// Explicit user config directory, if one was given.
    pub config_dir: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Fires on Ctrl-C; stores built by commands hang off it.
    pub shutdown: CancellationToken,
}

impl Context {
    /// Resolve the store configuration, applying CLI overrides in milliseconds.
    pub fn store_config(
        &self,
        idle_ms: Option<u64>,
        reclaim_ms: Option<u64>,
    ) -> Result<StoreConfig> {
        let mut config = self.config.config.store_config()?;
        if let Some(ms) = idle_ms {
            config = config.with_idle_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = reclaim_ms {
            config = config.with_reclaim_interval(Duration::from_millis(ms));
        }
        config.validate()?;
        Ok(config)
    }
}
