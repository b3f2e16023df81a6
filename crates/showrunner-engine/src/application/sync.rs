//! Classification of inbound shared-session notifications.
//!
//! Every publish against the shared session — this viewer's own included —
//! comes back through the subscription. This module decides, from the
//! notified target position and the machine's current state, what the
//! runtime should do about it. Remote instructions are authoritative, but
//! echoes, stale targets, and malformed indices are discarded without
//! touching the machine.

use showrunner_core::session::INTRO_BEAT;

use crate::domain::script::Script;

/// What the runtime should do with an inbound session notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Rewind to the intro.
    Restart,
    /// The show has not started here: arm it and land on `target` in one
    /// hop.
    Begin {
        /// Beat index to land on.
        target: usize,
    },
    /// The show is running here: jump forward to `target` in one hop.
    Jump {
        /// Beat index to jump to.
        target: usize,
    },
    /// Nothing to do; the notification carries no new instruction.
    Discard(DiscardReason),
}

/// Why a notification was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The notification is this viewer's own update echoing back.
    OwnEcho,
    /// The target beat has already been reached or passed.
    Stale,
    /// A rewind instruction arrived while already at the intro.
    AlreadyAtIntro,
    /// The target index lies outside the valid range.
    Malformed(i64),
}

/// Classifies an inbound notification against the machine's state.
#[must_use]
pub fn classify(
    target: i64,
    suppress_echo: bool,
    current: Option<usize>,
    has_started: bool,
    script: &Script,
) -> RemoteCommand {
    if suppress_echo {
        return RemoteCommand::Discard(DiscardReason::OwnEcho);
    }
    if !script.contains_wire_index(target) {
        return RemoteCommand::Discard(DiscardReason::Malformed(target));
    }
    if target == INTRO_BEAT {
        if current.is_none() && !has_started {
            return RemoteCommand::Discard(DiscardReason::AlreadyAtIntro);
        }
        return RemoteCommand::Restart;
    }

    // Guarded by the range check above.
    let Ok(target) = usize::try_from(target) else {
        return RemoteCommand::Discard(DiscardReason::Malformed(target));
    };

    if !has_started {
        return RemoteCommand::Begin { target };
    }
    if current.is_some_and(|current| target <= current) {
        return RemoteCommand::Discard(DiscardReason::Stale);
    }
    RemoteCommand::Jump { target }
}
