//! Observer notifications emitted toward the view renderer.

use serde::{Deserialize, Serialize};

/// A state-machine notification for view renderers and other observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresentationEvent {
    /// A beat was committed as the visible beat.
    BeatChanged {
        /// Index of the committed beat.
        index: usize,
        /// The beat's display text.
        text: String,
        /// The beat's media object, if it names one.
        media: Option<String>,
        /// Number of beats shown so far, `index + 1`.
        shown: usize,
        /// Total number of beats in the script.
        total: usize,
    },
    /// The clock exhausted itself on the terminal beat; the view should
    /// surface its end-screen control.
    Finished,
    /// The presentation was reset to the pre-start intro.
    Reset,
}
