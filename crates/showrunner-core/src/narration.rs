//! Narration track boundary.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::EngineError;

/// A signal emitted by a playing narration track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackSignal {
    /// The track's playback position advanced to `seconds` from the start.
    Position(f64),
    /// The track finished playing.
    Ended,
}

/// Abstraction over the host's audio/narration playback.
///
/// Starting playback is an asynchronous request that may be refused (hosts
/// commonly block autonomous playback); the engine treats a refusal as a
/// signal to engage its fallback clock, never as a hard fault.
#[async_trait]
pub trait NarrationTrack: Send + Sync {
    /// Requests playback and returns the stream of position/end signals.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Playback`] if the track cannot start.
    async fn play(&self) -> Result<mpsc::Receiver<TrackSignal>, EngineError>;

    /// Stops playback and rewinds. Safe to call when not playing.
    async fn stop(&self);
}
