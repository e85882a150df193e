//! Configuration system for the Ephemera session store.
//!
//! Provides TOML-based configuration with:
//! - A `[store]` section feeding [`ephemera_session::StoreConfig`]
//! - A `[logging]` section for the optional rolling JSON log file
//! - Config file layering (user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LayerStatus, LoadedConfig, load_config, load_config_file, save_config,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::{EphemeraConfig, LoggingSection, StoreSection};
