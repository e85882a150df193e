//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [store]
//! idle_timeout_ms = 5000
//! reclaim_interval_ms = 1000
//!
//! [logging]
//! dir = "/var/log/ephemera"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use ephemera_session::{HasStoreConfig, StoreConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemeraConfig {
    /// Session store configuration.
    pub store: Option<StoreSection>,

    /// Logging configuration.
    pub logging: Option<LoggingSection>,
}

impl EphemeraConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not field by field. A `[store]` table in
    /// `other` that sets only `idle_timeout_ms` brings the default
    /// `reclaim_interval_ms` with it, discarding any value set in `self`.
    pub fn merge(&mut self, other: EphemeraConfig) {
        if other.store.is_some() {
            self.store = other.store;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Resolve the session store configuration, falling back to defaults.
    pub fn store_config(&self) -> Result<StoreConfig> {
        let section = self.store.clone().unwrap_or_default();
        section.validate()?;
        Ok(StoreConfig::from_provider(&section))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store configuration.
///
/// ```toml
/// [store]
/// idle_timeout_ms = 5000
/// reclaim_interval_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Milliseconds a session may go without an update before reclamation.
    pub idle_timeout_ms: u64,
    /// Milliseconds between reclamation sweeps.
    pub reclaim_interval_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        let defaults = StoreConfig::default();
        Self {
            idle_timeout_ms: defaults.idle_timeout.as_millis() as u64,
            reclaim_interval_ms: defaults.reclaim_interval.as_millis() as u64,
        }
    }
}

impl StoreSection {
    /// Reject zero durations before they reach the store.
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "store.idle_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.reclaim_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "store.reclaim_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl HasStoreConfig for StoreSection {
    fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    fn reclaim_interval(&self) -> Duration {
        Duration::from_millis(self.reclaim_interval_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Directory for daily-rotated JSON log files. No file logging if unset.
    pub dir: Option<PathBuf>,
    /// File name prefix for the rotated log files.
    pub file_prefix: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            dir: None,
            file_prefix: "ephemera.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = EphemeraConfig::from_toml(
            r#"
[store]
idle_timeout_ms = 200
reclaim_interval_ms = 50

[logging]
dir = "/tmp/ephemera-logs"
"#,
        )
        .unwrap();

        let store = config.store_config().unwrap();
        assert_eq!(store.idle_timeout, Duration::from_millis(200));
        assert_eq!(store.reclaim_interval, Duration::from_millis(50));

        let logging = config.logging.unwrap();
        assert_eq!(logging.dir, Some(PathBuf::from("/tmp/ephemera-logs")));
        assert_eq!(logging.file_prefix, "ephemera.log");
    }

    #[test]
    fn test_empty_config_uses_store_defaults() {
        let config = EphemeraConfig::from_toml("").unwrap();
        assert!(config.store.is_none());
        assert_eq!(config.store_config().unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_partial_store_section() {
        let config = EphemeraConfig::from_toml(
            r#"
[store]
idle_timeout_ms = 60000
"#,
        )
        .unwrap();

        let store = config.store_config().unwrap();
        assert_eq!(store.idle_timeout, Duration::from_secs(60));
        assert_eq!(store.reclaim_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = EphemeraConfig::from_toml(
            r#"
[store]
idle_timeout_ms = 0
"#,
        )
        .unwrap();

        let err = config.store_config().unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "store.idle_timeout_ms"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_merge_overrides_sections() {
        let mut base = EphemeraConfig::from_toml(
            r#"
[store]
idle_timeout_ms = 1000

[logging]
dir = "/var/log/ephemera"
"#,
        )
        .unwrap();

        let overlay = EphemeraConfig::from_toml(
            r#"
[store]
idle_timeout_ms = 9000
"#,
        )
        .unwrap();

        base.merge(overlay);
        assert_eq!(base.store.as_ref().unwrap().idle_timeout_ms, 9000);
        // Untouched sections survive the merge
        assert!(base.logging.is_some());
    }

    #[test]
    fn test_merge_replaces_whole_store_section() {
        let mut base = EphemeraConfig::from_toml(
            r#"
[store]
idle_timeout_ms = 1000
reclaim_interval_ms = 250
"#,
        )
        .unwrap();

        let overlay = EphemeraConfig::from_toml(
            r#"
[store]
idle_timeout_ms = 9000
"#,
        )
        .unwrap();

        base.merge(overlay);
        let store = base.store_config().unwrap();
        assert_eq!(store.idle_timeout, Duration::from_secs(9));
        assert_eq!(store.reclaim_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_to_toml_is_readable_back() {
        let config = EphemeraConfig {
            store: Some(StoreSection {
                idle_timeout_ms: 1500,
                reclaim_interval_ms: 250,
            }),
            logging: None,
        };

        let text = config.to_toml().unwrap();
        assert!(text.contains("idle_timeout_ms = 1500"));
        assert_eq!(EphemeraConfig::from_toml(&text).unwrap(), config);
    }
}
