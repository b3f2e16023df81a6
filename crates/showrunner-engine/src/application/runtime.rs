//! The engine's single-threaded event loop.
//!
//! One task owns the state machine and drains one inbox; operator input,
//! clock signals, and remote notifications all arrive as [`EngineInput`]
//! messages and are handled strictly one at a time. The loop interprets
//! the side effects each transition returns: scene toggles, session
//! publishes, timer arming, narration control, and observer events.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use showrunner_core::clock::Clock;
use showrunner_core::error::EngineError;
use showrunner_core::narration::{NarrationTrack, TrackSignal};
use showrunner_core::scene::SceneNotifier;
use showrunner_core::session::{SessionRecord, SessionStore};

use crate::domain::effects::{AdvanceSource, Origin, SideEffect};
use crate::domain::events::PresentationEvent;
use crate::domain::script::Script;
use crate::domain::state::Presentation;

use super::presenter::PresenterConfig;
use super::sync::{DiscardReason, RemoteCommand, classify};

/// A message into the event loop.
#[derive(Debug)]
pub(crate) enum EngineInput {
    /// Operator pressed start.
    Start,
    /// Operator pressed restart.
    Restart,
    /// A per-beat hold timer expired.
    HoldElapsed { target: usize, epoch: u64 },
    /// The narration track emitted a signal.
    Track(TrackSignal),
    /// The fallback wall-clock ticked.
    ShadowPoll,
    /// The shared session record changed.
    Remote(SessionRecord),
    /// Stop the loop.
    Shutdown,
}

pub(crate) struct Runtime {
    presentation: Presentation,
    config: PresenterConfig,
    clock: Arc<dyn Clock>,
    scene: Arc<dyn SceneNotifier>,
    track: Option<Arc<dyn NarrationTrack>>,
    store: Option<Arc<dyn SessionStore>>,
    events: broadcast::Sender<PresentationEvent>,
    inbox_tx: mpsc::Sender<EngineInput>,
    suppress_echo: bool,
    hold_timer: Option<JoinHandle<()>>,
    track_pump: Option<JoinHandle<()>>,
    shadow_ticker: Option<JoinHandle<()>>,
    shadow_anchor: Option<DateTime<Utc>>,
    remote_pump: Option<JoinHandle<()>>,
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_seconds(anchor: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - anchor).num_milliseconds() as f64 / 1000.0
}

impl Runtime {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        script: Script,
        config: PresenterConfig,
        clock: Arc<dyn Clock>,
        scene: Arc<dyn SceneNotifier>,
        track: Option<Arc<dyn NarrationTrack>>,
        store: Option<Arc<dyn SessionStore>>,
        events: broadcast::Sender<PresentationEvent>,
        inbox_tx: mpsc::Sender<EngineInput>,
        remote_pump: Option<JoinHandle<()>>,
    ) -> Self {
        let bindings = config.bindings.clone();
        Self {
            presentation: Presentation::new(script, bindings),
            config,
            clock,
            scene,
            track,
            store,
            events,
            inbox_tx,
            suppress_echo: false,
            hold_timer: None,
            track_pump: None,
            shadow_ticker: None,
            shadow_anchor: None,
            remote_pump,
        }
    }

    pub(crate) async fn run(mut self, mut inbox: mpsc::Receiver<EngineInput>) {
        while let Some(input) = inbox.recv().await {
            if matches!(input, EngineInput::Shutdown) {
                break;
            }
            self.handle(input).await;
        }
        self.abort_clocks();
        if let Some(pump) = self.track_pump.take() {
            pump.abort();
        }
        if let Some(pump) = self.remote_pump.take() {
            pump.abort();
        }
    }

    async fn handle(&mut self, input: EngineInput) {
        match input {
            EngineInput::Start => {
                let effects = self.presentation.start(Origin::Local);
                self.apply_local(effects).await;
            }
            EngineInput::Restart => {
                let effects = self.presentation.restart(Origin::Local);
                self.apply_local(effects).await;
            }
            EngineInput::HoldElapsed { target, epoch } => {
                if epoch != self.presentation.epoch() {
                    debug!(target, "hold timer from a previous run discarded");
                    return;
                }
                let effects = self.presentation.advance_to(target, AdvanceSource::HoldTimer);
                self.apply_local(effects).await;
            }
            EngineInput::Track(TrackSignal::Position(elapsed)) => {
                let due = self
                    .presentation
                    .script()
                    .highest_due(elapsed, self.presentation.current());
                if let Some(target) = due {
                    let effects = self.presentation.advance_to(
                        target,
                        AdvanceSource::Narration {
                            elapsed_seconds: elapsed,
                        },
                    );
                    self.apply_local(effects).await;
                }
            }
            EngineInput::Track(TrackSignal::Ended) => {
                let effects = self.presentation.finish();
                if effects.is_empty() {
                    debug!("narration ended away from the terminal beat");
                }
                self.apply_local(effects).await;
            }
            EngineInput::ShadowPoll => self.handle_shadow_poll().await,
            EngineInput::Remote(record) => self.handle_remote(record).await,
            EngineInput::Shutdown => {}
        }
    }

    async fn handle_shadow_poll(&mut self) {
        let Some(anchor) = self.shadow_anchor else {
            return;
        };
        if !self.presentation.is_running() {
            return;
        }

        let elapsed = elapsed_seconds(anchor, self.clock.now());
        if let Some(target) = self
            .presentation
            .script()
            .highest_due(elapsed, self.presentation.current())
        {
            let effects = self
                .presentation
                .advance_to(target, AdvanceSource::ShadowClock);
            self.apply_local(effects).await;
        }

        let at_terminal = self.presentation.current() == Some(self.presentation.script().last_index());
        if at_terminal {
            if let Some(last_offset) = self.presentation.script().last_offset() {
                if elapsed > last_offset + self.config.grace.as_secs_f64() {
                    let effects = self.presentation.finish();
                    self.apply_local(effects).await;
                    self.stop_shadow();
                }
            }
        }
    }

    async fn handle_remote(&mut self, record: SessionRecord) {
        let command = classify(
            record.current_beat,
            self.suppress_echo,
            self.presentation.current(),
            self.presentation.has_started(),
            self.presentation.script(),
        );
        match command {
            RemoteCommand::Restart => {
                let effects = self.presentation.restart(Origin::Remote);
                self.apply(effects).await;
            }
            RemoteCommand::Begin { target } => {
                let effects = self.presentation.start_at(target, Origin::Remote);
                self.apply(effects).await;
                self.rebase_shadow(record.elapsed_seconds);
            }
            RemoteCommand::Jump { target } => {
                let effects = self.presentation.advance_to(target, AdvanceSource::Remote);
                self.apply(effects).await;
                self.rebase_shadow(record.elapsed_seconds);
            }
            RemoteCommand::Discard(DiscardReason::Malformed(target)) => {
                warn!("{}", EngineError::MalformedPayload(target));
            }
            RemoteCommand::Discard(reason) => {
                debug!(?reason, "session notification discarded");
            }
        }
    }

    /// Applies effects of a locally originated transition with the echo
    /// guard raised for the duration, publish included.
    async fn apply_local(&mut self, effects: Vec<SideEffect>) {
        self.suppress_echo = true;
        self.apply(effects).await;
        self.suppress_echo = false;
    }

    async fn apply(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Reveal(object) => self.scene.set_visible(&object, true),
                SideEffect::Conceal(object) => self.scene.set_visible(&object, false),
                SideEffect::Publish(update) => {
                    let Some(store) = &self.store else {
                        continue;
                    };
                    if let Err(error) = store.publish(update).await {
                        // No retry: the next natural transition publishes
                        // again.
                        warn!(%error, "session publish failed");
                    }
                }
                SideEffect::ArmHoldTimer {
                    target,
                    hold,
                    epoch,
                } => self.arm_hold_timer(target, hold, epoch),
                SideEffect::DisarmClocks => self.abort_clocks(),
                SideEffect::BeginNarration => self.begin_narration().await,
                SideEffect::HaltNarration => self.halt_narration().await,
                SideEffect::Announce(event) => {
                    let _ = self.events.send(event);
                }
            }
        }
    }

    fn arm_hold_timer(&mut self, target: usize, hold: Duration, epoch: u64) {
        if let Some(timer) = self.hold_timer.take() {
            timer.abort();
        }
        let inbox = self.inbox_tx.clone();
        self.hold_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            let _ = inbox.send(EngineInput::HoldElapsed { target, epoch }).await;
        }));
    }

    async fn begin_narration(&mut self) {
        let Some(track) = self.track.clone() else {
            self.engage_shadow();
            return;
        };
        match track.play().await {
            Ok(mut signals) => {
                let inbox = self.inbox_tx.clone();
                self.track_pump = Some(tokio::spawn(async move {
                    while let Some(signal) = signals.recv().await {
                        if inbox.send(EngineInput::Track(signal)).await.is_err() {
                            break;
                        }
                    }
                }));
            }
            Err(error) => {
                warn!(%error, "narration refused to start; engaging the fallback clock");
                self.engage_shadow();
            }
        }
    }

    async fn halt_narration(&mut self) {
        if let Some(pump) = self.track_pump.take() {
            pump.abort();
        }
        if let Some(track) = &self.track {
            track.stop().await;
        }
    }

    fn engage_shadow(&mut self) {
        self.shadow_anchor = Some(self.clock.now());
        let inbox = self.inbox_tx.clone();
        let period = self.config.shadow_poll;
        self.shadow_ticker = Some(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                if inbox.send(EngineInput::ShadowPoll).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_shadow(&mut self) {
        if let Some(ticker) = self.shadow_ticker.take() {
            ticker.abort();
        }
        self.shadow_anchor = None;
    }

    fn abort_clocks(&mut self) {
        if let Some(timer) = self.hold_timer.take() {
            timer.abort();
        }
        self.stop_shadow();
    }

    /// Re-anchors the fallback clock on the leader's broadcast elapsed
    /// time, so local polls continue from the shared position.
    #[allow(clippy::cast_possible_truncation)]
    fn rebase_shadow(&mut self, elapsed: Option<f64>) {
        let Some(elapsed) = elapsed else {
            return;
        };
        if self.shadow_anchor.is_none() {
            return;
        }
        let millis = (elapsed * 1000.0) as i64;
        self.shadow_anchor = Some(self.clock.now() - chrono::Duration::milliseconds(millis));
    }
}
