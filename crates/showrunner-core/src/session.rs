//! Shared session store boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::EngineError;

/// Wire value denoting the pre-start intro position.
pub const INTRO_BEAT: i64 = -1;

/// The shared session record all viewers of one presentation observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier.
    pub id: Uuid,
    /// Current beat index; [`INTRO_BEAT`] means the show has not started.
    pub current_beat: i64,
    /// Narration elapsed time at the last published advance, in seconds.
    pub elapsed_seconds: Option<f64>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

/// A viewer's write to the shared session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Target beat index; [`INTRO_BEAT`] rewinds every viewer to the intro.
    pub current_beat: i64,
    /// Narration elapsed time accompanying a forward advance, in seconds.
    pub elapsed_seconds: Option<f64>,
}

impl PositionUpdate {
    /// An update that rewinds the session to the intro.
    #[must_use]
    pub fn restart() -> Self {
        Self {
            current_beat: INTRO_BEAT,
            elapsed_seconds: None,
        }
    }
}

/// Bidirectional channel to the shared session record.
///
/// There is exactly one record per presentation. Local transitions publish
/// position updates to it; every party's publish, the caller's own
/// included, comes back through the subscription as a change notification.
/// Delivery order matches publish order for the single shared session;
/// nothing else is guaranteed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolves the shared session record.
    ///
    /// Called once at startup; failure disables remote sync for this viewer
    /// but must not prevent local operation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Transport`] if the record cannot be fetched.
    async fn fetch(&self) -> Result<SessionRecord, EngineError>;

    /// Writes the session's current-position fields.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Transport`] on write failure. The engine does
    /// not retry; the next natural transition publishes again.
    async fn publish(&self, update: PositionUpdate) -> Result<(), EngineError>;

    /// Opens the change-notification stream for the session record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Transport`] if the subscription cannot be
    /// established.
    async fn subscribe(&self) -> Result<mpsc::Receiver<SessionRecord>, EngineError>;
}
