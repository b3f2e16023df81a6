//! `PostgreSQL` implementation of the `SessionStore` trait.

use async_trait::async_trait;
use sqlx::postgres::PgListener;
use sqlx::{PgPool, Row};
use tokio::sync::mpsc;
use tracing::warn;

use showrunner_core::error::EngineError;
use showrunner_core::session::{PositionUpdate, SessionRecord, SessionStore};

use crate::schema::SESSION_CHANNEL;

/// PostgreSQL-backed shared session store.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new `PgSessionStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn transport(error: sqlx::Error) -> EngineError {
    EngineError::Transport(error.to_string())
}

/// Decodes a trigger notification payload (the updated row as JSON) into a
/// session record.
///
/// # Errors
///
/// Returns [`EngineError::Transport`] if the payload does not decode.
pub fn parse_notify_payload(payload: &str) -> Result<SessionRecord, EngineError> {
    serde_json::from_str(payload)
        .map_err(|error| EngineError::Transport(format!("undecodable notification: {error}")))
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn fetch(&self) -> Result<SessionRecord, EngineError> {
        let row = sqlx::query(
            "SELECT id, current_beat, elapsed_seconds, updated_at
             FROM presentation_session
             LIMIT 1",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(transport)?;

        Ok(SessionRecord {
            id: row.try_get("id").map_err(transport)?,
            current_beat: row.try_get("current_beat").map_err(transport)?,
            elapsed_seconds: row.try_get("elapsed_seconds").map_err(transport)?,
            updated_at: row.try_get("updated_at").map_err(transport)?,
        })
    }

    async fn publish(&self, update: PositionUpdate) -> Result<(), EngineError> {
        sqlx::query(
            "UPDATE presentation_session
             SET current_beat = $1, elapsed_seconds = $2, updated_at = NOW()
             WHERE id = (SELECT id FROM presentation_session LIMIT 1)",
        )
        .bind(update.current_beat)
        .bind(update.elapsed_seconds)
        .execute(&self.pool)
        .await
        .map_err(transport)?;

        Ok(())
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<SessionRecord>, EngineError> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(transport)?;
        listener.listen(SESSION_CHANNEL).await.map_err(transport)?;

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => match parse_notify_payload(notification.payload()) {
                        Ok(record) => {
                            if tx.send(record).await.is_err() {
                                break;
                            }
                        }
                        Err(error) => warn!(%error, "session notification dropped"),
                    },
                    Err(error) => {
                        warn!(%error, "session listener disconnected");
                        break;
                    }
                }
            }
        });
        Ok(rx)
    }
}
