//! Concurrent session store with idle expiry.
//!
//! This crate provides an in-memory store of opaque per-session state:
//! - Unguessable session identifiers drawn from the OS random source
//! - A single exclusive lock serializing every read, write and sweep
//! - A background reclamation task that evicts idle sessions on a fixed tick
//! - Cancellation of the reclamation task via token, `shutdown`, or drop
//!
//! Only [`SessionStore::update`] renews a session. Reads never extend its life.
//!
//! # Example
//!
//! ```rust,ignore
//! use ephemera_session::{SessionStore, StoreConfig};
//!
//! let config = StoreConfig::default()
//!     .with_idle_timeout(Duration::from_secs(300))
//!     .with_reclaim_interval(Duration::from_secs(10));
//!
//! let store = SessionStore::new(config)?;
//! let id = store.create_session()?;
//! ```

mod config;
mod error;
mod id;
mod reaper;
mod session;
mod store;

pub use config::{HasStoreConfig, StoreConfig};
pub use error::{Error, Result};
pub use id::{IdGenerator, OsRandomIds, SESSION_ID_BYTES, new_session_id};
pub use session::{SessionData, SessionInfo};
pub use store::{SessionStore, StoreStats};
