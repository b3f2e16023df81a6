//! Test narration tracks — scripted and unavailable `NarrationTrack`s.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use showrunner_core::error::EngineError;
use showrunner_core::narration::{NarrationTrack, TrackSignal};

/// A narration track that replays a fixed list of signals with a fixed
/// gap between them.
#[derive(Debug)]
pub struct ScriptedTrack {
    signals: Vec<TrackSignal>,
    gap: Duration,
    stopped: Mutex<bool>,
}

impl ScriptedTrack {
    /// Creates a track that emits `signals` in order, `gap` apart.
    #[must_use]
    pub fn new(signals: Vec<TrackSignal>, gap: Duration) -> Self {
        Self {
            signals,
            gap,
            stopped: Mutex::new(false),
        }
    }

    /// Whether `stop` has been called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn was_stopped(&self) -> bool {
        *self.stopped.lock().unwrap()
    }
}

#[async_trait]
impl NarrationTrack for ScriptedTrack {
    async fn play(&self) -> Result<mpsc::Receiver<TrackSignal>, EngineError> {
        let (tx, rx) = mpsc::channel(32);
        let signals = self.signals.clone();
        let gap = self.gap;
        tokio::spawn(async move {
            for signal in signals {
                tokio::time::sleep(gap).await;
                if tx.send(signal).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn stop(&self) {
        *self.stopped.lock().unwrap() = true;
    }
}

/// A narration track whose playback request is always refused, the
/// "host blocks autonomous playback" case that sends the engine to its
/// fallback clock.
#[derive(Debug, Default)]
pub struct UnavailableTrack;

#[async_trait]
impl NarrationTrack for UnavailableTrack {
    async fn play(&self) -> Result<mpsc::Receiver<TrackSignal>, EngineError> {
        Err(EngineError::Playback("playback blocked by the host".into()))
    }

    async fn stop(&self) {}
}
