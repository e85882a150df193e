//! Session store with idle expiry and background reclamation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::id::{IdGenerator, OsRandomIds};
use crate::reaper;
use crate::session::{Session, SessionData, SessionInfo};

/// Lifetime counters, kept under the same lock as the map.
#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    created: u64,
    updated: u64,
    removed: u64,
    reclaimed: u64,
}

/// Everything guarded by the store's single lock.
#[derive(Default)]
struct StoreState {
    sessions: HashMap<String, Session>,
    counters: Counters,
}

/// State shared between store handles and the reclamation task.
///
/// The reclamation task only holds a weak reference, so dropping the last
/// store handle drops this value, which cancels the task.
pub(crate) struct Shared<G: IdGenerator> {
    state: Mutex<StoreState>,
    generator: G,
    config: StoreConfig,
    cancel: CancellationToken,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl<G: IdGenerator> Shared<G> {
    /// Delete every session idle for longer than the configured timeout.
    ///
    /// The scan and the deletes happen under one lock acquisition, so no
    /// caller ever observes a session half-way through removal.
    pub(crate) fn reclaim(&self) -> usize {
        let timeout = self.config.idle_timeout;
        let mut state = self.state.lock();
        let now = Instant::now();

        let before = state.sessions.len();
        state
            .sessions
            .retain(|_, session| !session.is_expired(timeout, now));
        let remaining = state.sessions.len();
        let reclaimed = before - remaining;
        state.counters.reclaimed += reclaimed as u64;
        drop(state);

        if reclaimed > 0 {
            debug!(reclaimed, remaining, "Reclaimed idle sessions");
        } else {
            trace!(remaining, "Reclamation sweep found nothing to remove");
        }

        reclaimed
    }
}

impl<G: IdGenerator> Drop for Shared<G> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Concurrent, time-bounded session store.
///
/// This store provides:
/// - Creation of sessions under unguessable identifiers
/// - Copy-out reads and wholesale, renewing updates
/// - A background task reclaiming sessions idle past the timeout
/// - Linearizable access: every operation, the sweep included, goes through
///   one exclusive lock that is never held across an `.await`
///
/// Handles are cheap to clone and all address the same sessions. The
/// reclamation task stops when the cancellation token fires, when
/// [`shutdown`](Self::shutdown) is called, or when the last handle is dropped.
pub struct SessionStore<G: IdGenerator = OsRandomIds> {
    shared: Arc<Shared<G>>,
}

impl SessionStore<OsRandomIds> {
    /// Create a store using OS randomness for identifiers.
    ///
    /// Must be called from within a Tokio runtime; the reclamation task is
    /// spawned onto it.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_generator(config, OsRandomIds)
    }

    /// Create a store whose reclamation task also stops when `parent` is
    /// cancelled.
    pub fn with_cancellation(config: StoreConfig, parent: &CancellationToken) -> Result<Self> {
        Self::spawn(config, OsRandomIds, parent.child_token())
    }
}

impl<G: IdGenerator> SessionStore<G> {
    /// Create a store with a custom identifier generator.
    pub fn with_generator(config: StoreConfig, generator: G) -> Result<Self> {
        Self::spawn(config, generator, CancellationToken::new())
    }

    /// Create a store with a custom generator, stopped by `parent`.
    pub fn with_generator_and_cancellation(
        config: StoreConfig,
        generator: G,
        parent: &CancellationToken,
    ) -> Result<Self> {
        Self::spawn(config, generator, parent.child_token())
    }

    fn spawn(config: StoreConfig, generator: G, cancel: CancellationToken) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|e| Error::Runtime(format!("reclamation needs a Tokio runtime: {e}")))?;

        let shared = Arc::new(Shared {
            state: Mutex::new(StoreState::default()),
            generator,
            config,
            cancel,
            reaper: Mutex::new(None),
        });

        let task = reaper::spawn(
            &runtime,
            Arc::downgrade(&shared),
            shared.config.reclaim_interval,
            shared.cancel.clone(),
        );
        *shared.reaper.lock() = Some(task);

        debug!(
            idle_timeout_ms = shared.config.idle_timeout.as_millis() as u64,
            reclaim_interval_ms = shared.config.reclaim_interval.as_millis() as u64,
            "Session store started"
        );

        Ok(Self { shared })
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    /// Create a new, empty session and return its identifier.
    ///
    /// Fails with [`Error::Generation`] if the identifier generator fails, or
    /// if the generated id is already held by a live session. An existing
    /// session is never overwritten. The id is generated before the lock is
    /// taken.
    pub fn create_session(&self) -> Result<String> {
        let id = self.shared.generator.generate()?;

        let mut guard = self.shared.state.lock();
        let state = &mut *guard;
        if state.sessions.contains_key(&id) {
            return Err(Error::Generation(
                "generated identifier is already in use".to_string(),
            ));
        }
        state.sessions.insert(id.clone(), Session::new(Instant::now()));
        state.counters.created += 1;
        trace!(live = state.sessions.len(), "Session created");
        Ok(id)
    }

    /// Get a copy of a session's data.
    ///
    /// Reading does not renew the session.
    pub fn get(&self, session_id: &str) -> Result<SessionData> {
        let state = self.shared.state.lock();
        state
            .sessions
            .get(session_id)
            .map(|session| session.data.clone())
            .ok_or(Error::NotFound)
    }

    /// Replace a session's data and renew its idle window.
    ///
    /// The previous data is discarded, not merged.
    pub fn update(&self, session_id: &str, data: SessionData) -> Result<()> {
        let mut state = self.shared.state.lock();
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or(Error::NotFound)?;
        session.replace(data, Instant::now());
        state.counters.updated += 1;
        Ok(())
    }

    /// Remove a session explicitly, e.g. on logout.
    pub fn remove(&self, session_id: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        state
            .sessions
            .remove(session_id)
            .ok_or(Error::NotFound)?;
        state.counters.removed += 1;
        trace!(live = state.sessions.len(), "Session removed");
        Ok(())
    }

    /// Check whether a session is currently held.
    pub fn contains(&self, session_id: &str) -> bool {
        self.shared.state.lock().sessions.contains_key(session_id)
    }

    /// Get metadata about a session without renewing it.
    pub fn info(&self, session_id: &str) -> Result<SessionInfo> {
        let state = self.shared.state.lock();
        let session = state.sessions.get(session_id).ok_or(Error::NotFound)?;
        Ok(SessionInfo::snapshot(
            session,
            self.shared.config.idle_timeout,
            Instant::now(),
        ))
    }

    /// Get the current number of sessions.
    pub fn len(&self) -> usize {
        self.shared.state.lock().sessions.len()
    }

    /// Check if the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().sessions.is_empty()
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        let state = self.shared.state.lock();
        StoreStats {
            live: state.sessions.len(),
            created: state.counters.created,
            updated: state.counters.updated,
            removed: state.counters.removed,
            reclaimed: state.counters.reclaimed,
        }
    }

    /// Whether the background reclamation task is still running.
    pub fn is_reclaiming(&self) -> bool {
        self.shared
            .reaper
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop the reclamation task and wait for it to finish.
    ///
    /// Sessions stay readable and writable afterwards but no longer expire.
    pub async fn shutdown(&self) {
        self.shared.cancel.cancel();
        let task = self.shared.reaper.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
        debug!("Session store reclamation stopped");
    }
}

impl<G: IdGenerator> Clone for SessionStore<G> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<G: IdGenerator> fmt::Debug for SessionStore<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.shared.config)
            .field("live", &self.len())
            .finish()
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Sessions currently held.
    pub live: usize,

    /// Sessions created since the store started.
    pub created: u64,

    /// Successful updates since the store started.
    pub updated: u64,

    /// Sessions removed explicitly.
    pub removed: u64,

    /// Sessions reclaimed after going idle.
    pub reclaimed: u64,
}
