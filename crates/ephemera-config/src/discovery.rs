//! Locating and layering config files.
//!
//! Two layers are read, the later one winning section by section:
//! the user file (`$EPHEMERA_CONFIG_DIR/config.toml`, falling back to
//! `<platform config dir>/ephemera/config.toml`), then `./ephemera.toml`.
//! Command-line flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, EphemeraConfig, Result};

const PROJECT_FILE: &str = "ephemera.toml";
const USER_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "EPHEMERA_CONFIG_DIR";

/// What happened to one config layer during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStatus {
    /// No file at the path.
    Missing,
    /// Parsed and merged.
    Loaded,
    /// Present but unreadable or invalid; a warning was recorded.
    Rejected,
}

impl LayerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerStatus::Missing => "missing",
            LayerStatus::Loaded => "loaded",
            LayerStatus::Rejected => "rejected",
        }
    }
}

/// One config layer that was considered.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub status: LayerStatus,
}

impl ConfigSource {
    pub fn is_loaded(&self) -> bool {
        self.status == LayerStatus::Loaded
    }
}

/// The merged configuration plus a record of how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: EphemeraConfig,
    /// Layers in the order they were applied.
    pub sources: Vec<ConfigSource>,
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the layers that actually contributed.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|source| source.is_loaded())
            .map(|source| source.path.as_path())
            .collect()
    }
}

/// Discover and merge the config layers.
///
/// `project_dir` defaults to the working directory. `user_dir`, when given,
/// replaces the user config directory lookup entirely.
///
/// A broken layer never fails the load: it is skipped and reported in
/// [`LoadedConfig::warnings`], so the store can still start on defaults.
pub fn load_config(project_dir: Option<&Path>, user_dir: Option<&Path>) -> Result<LoadedConfig> {
    let user_file = match user_dir {
        Some(dir) => Some(dir.join(USER_FILE)),
        None => user_config_path(),
    };
    let project_file = match project_dir {
        Some(dir) => dir.join(PROJECT_FILE),
        None => PathBuf::from(PROJECT_FILE),
    };

    let mut loaded = LoadedConfig {
        config: EphemeraConfig::new(),
        sources: Vec::with_capacity(2),
        warnings: Vec::new(),
    };
    for path in user_file.into_iter().chain(Some(project_file)) {
        let status = apply_layer(&mut loaded, &path);
        loaded.sources.push(ConfigSource { path, status });
    }
    Ok(loaded)
}

fn apply_layer(loaded: &mut LoadedConfig, path: &Path) -> LayerStatus {
    if !path.is_file() {
        return LayerStatus::Missing;
    }
    match load_config_file(path) {
        Ok(layer) => {
            loaded.config.merge(layer);
            LayerStatus::Loaded
        }
        Err(e) => {
            loaded
                .warnings
                .push(format!("ignoring {}: {e}", path.display()));
            LayerStatus::Rejected
        }
    }
}

/// Read and parse a single config file.
pub fn load_config_file(path: &Path) -> Result<EphemeraConfig> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    EphemeraConfig::from_toml(&text)
}

/// Write `config` to `path`, creating missing parent directories.
pub fn save_config(config: &EphemeraConfig, path: &Path) -> Result<()> {
    let write_err = |at: &Path, source| ConfigError::WriteFile {
        path: at.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }
    fs::write(path, config.to_toml()?).map_err(|e| write_err(path, e))
}

/// The user config file, if a user config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(USER_FILE))
}

/// `$EPHEMERA_CONFIG_DIR` when set and non-empty, else the platform config
/// directory joined with `ephemera`.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|dir| dir.join("ephemera")),
    }
}
