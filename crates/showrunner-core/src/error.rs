//! Engine error types.

use thiserror::Error;

/// Top-level engine error type.
///
/// No variant is fatal to the process: transport failures degrade the engine
/// to local-only operation, playback failures reroute to the fallback clock,
/// and malformed payloads are discarded where they arrive.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The session store could not be reached or a read/write failed.
    #[error("session transport error: {0}")]
    Transport(String),

    /// The narration track could not start or failed mid-play.
    #[error("narration playback error: {0}")]
    Playback(String),

    /// The slide script violates a structural invariant.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// A remote payload named a beat index outside the valid range.
    #[error("malformed session payload: target beat {0} out of range")]
    MalformedPayload(i64),
}
