//! Session identifier generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Number of random bytes behind every session identifier.
pub const SESSION_ID_BYTES: usize = 26;

/// Source of session identifiers.
///
/// Implementations must return ids that are unguessable and that never
/// plausibly collide over the lifetime of a store. A failure is reported,
/// never papered over with a weaker source.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce a fresh identifier.
    fn generate(&self) -> Result<String>;
}

/// Generator backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomIds;

impl IdGenerator for OsRandomIds {
    fn generate(&self) -> Result<String> {
        new_session_id()
    }
}

/// Generate a new session identifier.
///
/// Draws [`SESSION_ID_BYTES`] from the OS random source and encodes them as
/// URL-safe base64 without padding, so the id can travel in headers and
/// cookies unescaped.
pub fn new_session_id() -> Result<String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Generation(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
