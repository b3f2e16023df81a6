//! Side-effect vocabulary produced by state transitions.
//!
//! Transition methods on the state machine are pure with respect to the
//! outside world: they mutate their own fields and return an ordered list
//! of [`SideEffect`]s for the application layer to interpret. The list
//! plays the role an uncommitted-event buffer plays in a persistence
//! aggregate — produced by the domain, drained by the application.

use std::time::Duration;

use showrunner_core::session::PositionUpdate;

use super::events::PresentationEvent;

/// Where a Start or Restart was initiated.
///
/// Remote-sourced transitions are never re-published: fan-out is one hop,
/// no relay chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Operator input on this viewer.
    Local,
    /// An inbound notification from the shared session.
    Remote,
}

/// The time source behind an Advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvanceSource {
    /// A narration-track position update. Mirrored to the shared session
    /// in timeline mode.
    Narration {
        /// Track elapsed time at the update, in seconds.
        elapsed_seconds: f64,
    },
    /// A fallback wall-clock poll. Never mirrored: a viewer reduced to the
    /// fallback follows the narration leader instead of competing with it.
    ShadowClock,
    /// A per-beat hold timer expiry. Never mirrored.
    HoldTimer,
    /// An authoritative remote instruction. Never re-mirrored.
    Remote,
}

/// An instruction from the state machine to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Show the named scene object.
    Reveal(String),
    /// Hide the named scene object.
    Conceal(String),
    /// Write the position update to the shared session.
    Publish(PositionUpdate),
    /// Arm a one-shot timer that advances to `target` after `hold`.
    /// The timer captures `epoch` and self-invalidates if the epoch has
    /// moved on by the time it fires.
    ArmHoldTimer {
        /// Beat index to advance to when the timer fires.
        target: usize,
        /// How long to wait.
        hold: Duration,
        /// Generation counter at arming time.
        epoch: u64,
    },
    /// Cancel every pending hold timer and fallback clock.
    DisarmClocks,
    /// Request narration playback; on refusal the runtime engages the
    /// fallback wall-clock instead.
    BeginNarration,
    /// Stop narration playback and rewind.
    HaltNarration,
    /// Notify observers of a state change.
    Announce(PresentationEvent),
}
