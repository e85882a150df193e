//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Session does not exist: never created, reclaimed, or removed.
    ///
    /// The id is deliberately left out of the message; session ids are
    /// bearer secrets and error strings tend to end up in logs.
    #[error("Session not found")]
    NotFound,

    /// No usable session identifier could be produced.
    ///
    /// Raised when the random source fails, and also when a freshly
    /// generated identifier collides with a live session.
    #[error("Session ID generation failed: {0}")]
    Generation(String),

    /// The store was constructed with an unusable configuration.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// The reclamation task could not be started.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Whether the caller should treat this as "no session" and start over.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    /// Whether the error signals an environment problem rather than a
    /// missing session. Fatal errors must not be retried silently.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Generation(_) | Error::InvalidConfig(_) | Error::Runtime(_)
        )
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
