//! The presentation state machine.

use serde::{Deserialize, Serialize};
use showrunner_core::session::PositionUpdate;

use super::effects::{AdvanceSource, Origin, SideEffect};
use super::events::PresentationEvent;
use super::script::{Script, ScriptMode};

/// Scene objects the engine toggles around the per-beat media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBindings {
    /// Object visible before the show starts and again after a restart.
    #[serde(default)]
    pub preshow: Option<String>,
    /// Object visible while the show runs (hidden again on restart).
    #[serde(default)]
    pub cue: Option<String>,
}

/// The state machine that owns a single viewer's presentation position.
///
/// All mutation goes through the transition methods, each of which returns
/// the ordered side effects the runtime must perform. The machine never
/// moves backward except through [`Presentation::restart`].
#[derive(Debug)]
pub struct Presentation {
    script: Script,
    bindings: SceneBindings,
    current: Option<usize>,
    has_started: bool,
    is_running: bool,
    revealed: Vec<String>,
    epoch: u64,
}

#[allow(clippy::cast_possible_wrap)]
fn wire_index(index: usize) -> i64 {
    index as i64
}

impl Presentation {
    /// Creates a machine at the pre-start intro position.
    #[must_use]
    pub fn new(script: Script, bindings: SceneBindings) -> Self {
        Self {
            script,
            bindings,
            current: None,
            has_started: false,
            is_running: false,
            revealed: Vec::new(),
            epoch: 0,
        }
    }

    /// The script being presented.
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Current beat index; `None` is the intro position.
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Whether the show has been armed since the last restart.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// Whether auto-progression is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Media objects revealed so far this run, in reveal order.
    #[must_use]
    pub fn revealed(&self) -> &[String] {
        &self.revealed
    }

    /// Generation counter, bumped on every Start and Restart. Scheduled
    /// callbacks capture it and self-invalidate on mismatch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Starts the show at beat 0. No-op if already started.
    pub fn start(&mut self, origin: Origin) -> Vec<SideEffect> {
        self.start_at(0, origin)
    }

    /// Starts the show directly at `target`: the catch-up path for a
    /// viewer joining a session that is already mid-show. No-op if already
    /// started or `target` is out of range.
    pub fn start_at(&mut self, target: usize, origin: Origin) -> Vec<SideEffect> {
        if self.has_started || target > self.script.last_index() {
            return Vec::new();
        }

        self.has_started = true;
        self.is_running = true;
        self.epoch += 1;

        let mut effects = Vec::new();
        if origin == Origin::Local {
            // The shared session learns about the start before any local
            // side effect lands.
            effects.push(SideEffect::Publish(PositionUpdate {
                current_beat: 0,
                elapsed_seconds: match self.script.mode() {
                    ScriptMode::Timeline => Some(0.0),
                    ScriptMode::Duration => None,
                },
            }));
        }
        if let Some(preshow) = &self.bindings.preshow {
            effects.push(SideEffect::Conceal(preshow.clone()));
        }
        if let Some(cue) = &self.bindings.cue {
            effects.push(SideEffect::Reveal(cue.clone()));
        }
        effects.extend(self.commit_beat(target));
        if self.script.mode() == ScriptMode::Timeline {
            effects.push(SideEffect::BeginNarration);
        }
        effects
    }

    /// Advances to `target`. No-op unless the show has started and
    /// `target` lies strictly beyond the current beat; repeated signals
    /// for an already-reached beat fall through here.
    pub fn advance_to(&mut self, target: usize, source: AdvanceSource) -> Vec<SideEffect> {
        if !self.has_started
            || target > self.script.last_index()
            || self.current.is_some_and(|current| target <= current)
        {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if let AdvanceSource::Narration { elapsed_seconds } = source {
            effects.push(SideEffect::Publish(PositionUpdate {
                current_beat: wire_index(target),
                elapsed_seconds: Some(elapsed_seconds),
            }));
        }
        effects.extend(self.commit_beat(target));
        effects
    }

    /// Completes the show. No-op unless the terminal beat is current and
    /// auto-progression is still running.
    pub fn finish(&mut self) -> Vec<SideEffect> {
        if !self.is_running || self.current != Some(self.script.last_index()) {
            return Vec::new();
        }
        self.finish_effects()
    }

    /// Returns the machine to the intro from any state.
    pub fn restart(&mut self, origin: Origin) -> Vec<SideEffect> {
        self.epoch += 1;

        let mut effects = vec![SideEffect::DisarmClocks];
        if self.script.mode() == ScriptMode::Timeline {
            effects.push(SideEffect::HaltNarration);
        }
        for media in self.revealed.drain(..) {
            effects.push(SideEffect::Conceal(media));
        }
        if let Some(cue) = &self.bindings.cue {
            effects.push(SideEffect::Conceal(cue.clone()));
        }
        if let Some(preshow) = &self.bindings.preshow {
            effects.push(SideEffect::Reveal(preshow.clone()));
        }
        if origin == Origin::Local {
            effects.push(SideEffect::Publish(PositionUpdate::restart()));
        }
        effects.push(SideEffect::Announce(PresentationEvent::Reset));

        self.current = None;
        self.has_started = false;
        self.is_running = false;
        effects
    }

    fn commit_beat(&mut self, index: usize) -> Vec<SideEffect> {
        let beat = self.script.beat(index).cloned();
        let Some(beat) = beat else {
            return Vec::new();
        };

        self.current = Some(index);

        let mut effects = Vec::new();
        if let Some(media) = &beat.media {
            if !self.revealed.iter().any(|shown| shown == media) {
                self.revealed.push(media.clone());
                effects.push(SideEffect::Reveal(media.clone()));
            }
        }
        effects.push(SideEffect::Announce(PresentationEvent::BeatChanged {
            index,
            text: beat.text,
            media: beat.media,
            shown: index + 1,
            total: self.script.len(),
        }));

        if self.script.mode() == ScriptMode::Duration {
            if let Some(hold) = self.script.hold_of(index) {
                effects.push(SideEffect::ArmHoldTimer {
                    target: index + 1,
                    hold,
                    epoch: self.epoch,
                });
            } else {
                // Zero hold marks the terminal beat: completion is
                // immediate on entry.
                effects.extend(self.finish_effects());
            }
        }
        effects
    }

    fn finish_effects(&mut self) -> Vec<SideEffect> {
        self.is_running = false;
        vec![SideEffect::Announce(PresentationEvent::Finished)]
    }
}
