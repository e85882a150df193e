//! Configuration for the session store.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Default idle timeout after which an untouched session is reclaimed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default period of the background reclamation sweep.
pub const DEFAULT_RECLAIM_INTERVAL: Duration = Duration::from_secs(1);

/// Session store configuration capability.
///
/// Lets configuration sources (e.g. a TOML section) feed the store without
/// this crate knowing their layout.
pub trait HasStoreConfig {
    /// How long a session may go without an update before it is reclaimed.
    fn idle_timeout(&self) -> Duration;

    /// Interval between reclamation sweeps.
    fn reclaim_interval(&self) -> Duration;
}

/// Configuration for the session store.
///
/// Both durations are fixed for the lifetime of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Sessions not updated within this duration are eligible for reclamation.
    pub idle_timeout: Duration,

    /// Period of the background sweep.
    pub reclaim_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            reclaim_interval: DEFAULT_RECLAIM_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from any provider.
    pub fn from_provider<C: HasStoreConfig + ?Sized>(provider: &C) -> Self {
        Self {
            idle_timeout: provider.idle_timeout(),
            reclaim_interval: provider.reclaim_interval(),
        }
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the reclamation interval.
    pub fn with_reclaim_interval(mut self, interval: Duration) -> Self {
        self.reclaim_interval = interval;
        self
    }

    /// Reject configurations the store cannot run with.
    ///
    /// Besides zero durations this rejects intervals so large that the
    /// sweep's deadlines cannot be represented as an [`Instant`].
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "idle timeout must be greater than zero".to_string(),
            ));
        }
        if self.reclaim_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "reclaim interval must be greater than zero".to_string(),
            ));
        }
        // The sweep schedules its first deadline one period out and every
        // later one a period after the last.
        let horizon = self
            .reclaim_interval
            .checked_mul(2)
            .and_then(|span| Instant::now().checked_add(span));
        if horizon.is_none() {
            return Err(Error::InvalidConfig(
                "reclaim interval is too large to schedule".to_string(),
            ));
        }
        Ok(())
    }
}

impl HasStoreConfig for StoreConfig {
    fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn reclaim_interval(&self) -> Duration {
        self.reclaim_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.reclaim_interval, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new()
            .with_idle_timeout(Duration::from_millis(200))
            .with_reclaim_interval(Duration::from_millis(50));
        assert_eq!(config.idle_timeout, Duration::from_millis(200));
        assert_eq!(config.reclaim_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let err = StoreConfig::new()
            .with_idle_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = StoreConfig::new()
            .with_reclaim_interval(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_unschedulable_interval_rejected() {
        let err = StoreConfig::new()
            .with_reclaim_interval(Duration::MAX)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        // Long but representable intervals are fine.
        let config = StoreConfig::new().with_reclaim_interval(Duration::from_secs(86_400 * 365));
        assert!(config.validate().is_ok());

        // A huge idle timeout is only ever compared against, never added.
        let config = StoreConfig::new().with_idle_timeout(Duration::MAX);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_provider() {
        struct Fixed;

        impl HasStoreConfig for Fixed {
            fn idle_timeout(&self) -> Duration {
                Duration::from_secs(30)
            }

            fn reclaim_interval(&self) -> Duration {
                Duration::from_secs(3)
            }
        }

        let config = StoreConfig::from_provider(&Fixed);
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.reclaim_interval, Duration::from_secs(3));
    }
}
