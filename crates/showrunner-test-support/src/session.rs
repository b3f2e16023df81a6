//! Test session stores — mock `SessionStore` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use showrunner_core::error::EngineError;
use showrunner_core::session::{INTRO_BEAT, PositionUpdate, SessionRecord, SessionStore};

/// An in-memory shared session: one record, broadcast change
/// notifications, and a log of every publish.
///
/// Every publish, including the engine's own, is delivered back to all
/// subscribers, which makes this double faithful to the echo behavior of
/// the real store.
#[derive(Debug)]
pub struct InMemorySessionStore {
    record: Mutex<SessionRecord>,
    changes: broadcast::Sender<SessionRecord>,
    published: Mutex<Vec<PositionUpdate>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    /// Creates a store whose record sits at the intro position.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(32);
        Self {
            record: Mutex::new(SessionRecord {
                id: Uuid::new_v4(),
                current_beat: INTRO_BEAT,
                elapsed_seconds: None,
                updated_at: Utc::now(),
            }),
            changes,
            published: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every update published so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<PositionUpdate> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn fetch(&self) -> Result<SessionRecord, EngineError> {
        Ok(self.record.lock().unwrap().clone())
    }

    async fn publish(&self, update: PositionUpdate) -> Result<(), EngineError> {
        let record = {
            let mut record = self.record.lock().unwrap();
            record.current_beat = update.current_beat;
            record.elapsed_seconds = update.elapsed_seconds;
            record.updated_at = Utc::now();
            record.clone()
        };
        self.published.lock().unwrap().push(update);
        let _ = self.changes.send(record);
        Ok(())
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<SessionRecord>, EngineError> {
        let mut changes = self.changes.subscribe();
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            while let Ok(record) = changes.recv().await {
                if tx.send(record).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

/// A session store where every operation fails with a transport error.
/// Useful for asserting the engine degrades to local-only operation.
#[derive(Debug, Default)]
pub struct FailingSessionStore;

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn fetch(&self) -> Result<SessionRecord, EngineError> {
        Err(EngineError::Transport("connection refused".into()))
    }

    async fn publish(&self, _update: PositionUpdate) -> Result<(), EngineError> {
        Err(EngineError::Transport("connection refused".into()))
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<SessionRecord>, EngineError> {
        Err(EngineError::Transport("connection refused".into()))
    }
}
