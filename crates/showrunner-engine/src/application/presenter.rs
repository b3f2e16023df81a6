//! Public control surface for a single viewer's presentation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use showrunner_core::clock::Clock;
use showrunner_core::narration::NarrationTrack;
use showrunner_core::scene::SceneNotifier;
use showrunner_core::session::SessionStore;

use crate::domain::events::PresentationEvent;
use crate::domain::script::Script;
use crate::domain::state::SceneBindings;

use super::runtime::{EngineInput, Runtime};

/// Tuning knobs and scene bindings for a presenter.
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    /// Scene objects toggled around the per-beat media.
    pub bindings: SceneBindings,
    /// How far past the terminal beat's offset the fallback clock waits
    /// before synthesizing completion.
    pub grace: Duration,
    /// Poll period of the fallback wall-clock.
    pub shadow_poll: Duration,
    /// Capacity of the observer event channel.
    pub event_capacity: usize,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            bindings: SceneBindings::default(),
            grace: Duration::from_secs(10),
            shadow_poll: Duration::from_millis(100),
            event_capacity: 64,
        }
    }
}

/// Handle to a running presentation engine.
///
/// All operations enqueue onto the engine's single-threaded event loop and
/// return without waiting for the transition to land; observers watch the
/// [`PresentationEvent`] stream instead.
#[derive(Debug)]
pub struct Presenter {
    inbox: mpsc::Sender<EngineInput>,
    events: broadcast::Sender<PresentationEvent>,
    runtime: JoinHandle<()>,
}

impl Presenter {
    /// Builds the state machine and spawns its event loop.
    ///
    /// When a session store is given, the shared record is fetched and
    /// subscribed once, here; if either step fails the engine logs the
    /// failure and continues local-only. A missing narration track sends
    /// timeline scripts straight to the fallback wall-clock.
    pub async fn spawn(
        script: Script,
        config: PresenterConfig,
        clock: Arc<dyn Clock>,
        scene: Arc<dyn SceneNotifier>,
        track: Option<Arc<dyn NarrationTrack>>,
        store: Option<Arc<dyn SessionStore>>,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel(32);
        let (events_tx, _) = broadcast::channel(config.event_capacity);

        let mut remote_pump = None;
        let store = match store {
            Some(store) => match store.fetch().await {
                Ok(record) => match store.subscribe().await {
                    Ok(mut updates) => {
                        info!(session = %record.id, "joined shared presentation session");
                        let inbox = inbox_tx.clone();
                        remote_pump = Some(tokio::spawn(async move {
                            while let Some(update) = updates.recv().await {
                                if inbox.send(EngineInput::Remote(update)).await.is_err() {
                                    break;
                                }
                            }
                        }));
                        Some(store)
                    }
                    Err(error) => {
                        warn!(%error, "session subscription failed; continuing local-only");
                        None
                    }
                },
                Err(error) => {
                    warn!(%error, "session record unreachable; continuing local-only");
                    None
                }
            },
            None => None,
        };

        let runtime = Runtime::new(
            script,
            config,
            clock,
            scene,
            track,
            store,
            events_tx.clone(),
            inbox_tx.clone(),
            remote_pump,
        );
        let runtime = tokio::spawn(runtime.run(inbox_rx));

        Self {
            inbox: inbox_tx,
            events: events_tx,
            runtime,
        }
    }

    /// Arms the show from the intro. No-op if already started.
    pub async fn start(&self) {
        let _ = self.inbox.send(EngineInput::Start).await;
    }

    /// Rewinds to the intro from any state.
    pub async fn restart(&self) {
        let _ = self.inbox.send(EngineInput::Restart).await;
    }

    /// Subscribes to state-change notifications.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<PresentationEvent> {
        self.events.subscribe()
    }

    /// Stops the event loop and releases every clock and subscription.
    pub async fn shutdown(self) {
        let _ = self.inbox.send(EngineInput::Shutdown).await;
        let _ = self.runtime.await;
    }
}
