//! The slide script: an immutable, validated sequence of beats.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use showrunner_core::error::EngineError;
use showrunner_core::session::INTRO_BEAT;

/// The timing rule attached to a beat. A script uses exactly one variant
/// throughout; mixing them is rejected at validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatTiming {
    /// The beat becomes due once narration elapsed time reaches `seconds`.
    AtOffset {
        /// Absolute elapsed time from the start of the show, in seconds.
        seconds: f64,
    },
    /// The beat holds for `millis` before auto-advancing. Zero means the
    /// beat is terminal: no timer is armed and completion is immediate on
    /// entry.
    HoldFor {
        /// Hold duration in milliseconds.
        millis: u64,
    },
}

/// One unit of the presentation: text, an optional media reveal, and a
/// timing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Display text. May contain embedded newlines (multi-paragraph).
    pub text: String,
    /// Scene object revealed when this beat activates; `None` reveals
    /// nothing new.
    #[serde(default)]
    pub media: Option<String>,
    /// When this beat becomes active.
    #[serde(flatten)]
    pub timing: BeatTiming,
}

impl Beat {
    /// A beat due at an absolute narration offset.
    #[must_use]
    pub fn narrated(text: &str, media: Option<&str>, offset_seconds: f64) -> Self {
        Self {
            text: text.to_owned(),
            media: media.map(str::to_owned),
            timing: BeatTiming::AtOffset {
                seconds: offset_seconds,
            },
        }
    }

    /// A beat that holds for a fixed duration before advancing.
    #[must_use]
    pub fn timed(text: &str, media: Option<&str>, hold_millis: u64) -> Self {
        Self {
            text: text.to_owned(),
            media: media.map(str::to_owned),
            timing: BeatTiming::HoldFor {
                millis: hold_millis,
            },
        }
    }
}

/// The operating mode a script selects through its timing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    /// Beats are due at absolute offsets against a narration track.
    Timeline,
    /// Beats hold for fixed per-beat durations.
    Duration,
}

/// A validated, non-empty, ordered sequence of beats.
///
/// Index 0 is the first real beat; the pre-start intro position has no beat
/// and is represented as `None` in the engine (and as [`INTRO_BEAT`] on the
/// wire). The maximum valid index is `len - 1`, the terminal beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Beat>", into = "Vec<Beat>")]
pub struct Script {
    beats: Vec<Beat>,
    mode: ScriptMode,
}

impl Script {
    /// Validates and wraps a beat sequence.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidScript`] when the sequence is empty,
    /// mixes timing variants, has timeline offsets that are negative or not
    /// strictly increasing, holds for zero before the terminal beat, or
    /// ends a duration script on a non-zero hold.
    pub fn new(beats: Vec<Beat>) -> Result<Self, EngineError> {
        let Some(first) = beats.first() else {
            return Err(EngineError::InvalidScript("script has no beats".into()));
        };

        let mode = match first.timing {
            BeatTiming::AtOffset { .. } => ScriptMode::Timeline,
            BeatTiming::HoldFor { .. } => ScriptMode::Duration,
        };

        let last = beats.len() - 1;
        let mut previous_offset = f64::NEG_INFINITY;
        for (index, beat) in beats.iter().enumerate() {
            match (mode, beat.timing) {
                (ScriptMode::Timeline, BeatTiming::AtOffset { seconds }) => {
                    if seconds < 0.0 {
                        return Err(EngineError::InvalidScript(format!(
                            "beat {index} has a negative offset"
                        )));
                    }
                    if seconds <= previous_offset {
                        return Err(EngineError::InvalidScript(format!(
                            "offsets must be strictly increasing (beat {index})"
                        )));
                    }
                    previous_offset = seconds;
                }
                (ScriptMode::Duration, BeatTiming::HoldFor { millis }) => {
                    if millis == 0 && index < last {
                        return Err(EngineError::InvalidScript(format!(
                            "zero hold before the terminal beat (beat {index})"
                        )));
                    }
                    if millis > 0 && index == last {
                        return Err(EngineError::InvalidScript(
                            "terminal beat of a duration script must hold for zero".into(),
                        ));
                    }
                }
                _ => {
                    return Err(EngineError::InvalidScript(format!(
                        "beat {index} mixes timing variants"
                    )));
                }
            }
        }

        Ok(Self { beats, mode })
    }

    /// Number of beats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.beats.len()
    }

    /// Always false: validation rejects empty scripts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Index of the terminal beat.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.beats.len() - 1
    }

    /// The beat at `index`, if in range.
    #[must_use]
    pub fn beat(&self, index: usize) -> Option<&Beat> {
        self.beats.get(index)
    }

    /// The operating mode this script selects.
    #[must_use]
    pub fn mode(&self) -> ScriptMode {
        self.mode
    }

    /// The highest beat index due at `elapsed_seconds` that lies beyond
    /// `current`, or `None` if nothing new is due. This is the single-jump
    /// rule: a lagging viewer catches up in one hop, never stepping through
    /// intermediate beats.
    #[must_use]
    pub fn highest_due(&self, elapsed_seconds: f64, current: Option<usize>) -> Option<usize> {
        for (index, beat) in self.beats.iter().enumerate().rev() {
            if current.is_some_and(|c| index <= c) {
                return None;
            }
            if let BeatTiming::AtOffset { seconds } = beat.timing {
                if seconds <= elapsed_seconds {
                    return Some(index);
                }
            }
        }
        None
    }

    /// The hold duration of the beat at `index`, if this is a duration
    /// script and the beat holds for a non-zero time.
    #[must_use]
    pub fn hold_of(&self, index: usize) -> Option<Duration> {
        match self.beats.get(index)?.timing {
            BeatTiming::HoldFor { millis } if millis > 0 => Some(Duration::from_millis(millis)),
            _ => None,
        }
    }

    /// The narration offset of the terminal beat, if this is a timeline
    /// script.
    #[must_use]
    pub fn last_offset(&self) -> Option<f64> {
        match self.beats[self.last_index()].timing {
            BeatTiming::AtOffset { seconds } => Some(seconds),
            BeatTiming::HoldFor { .. } => None,
        }
    }

    /// Whether a wire index lies in the valid range `[-1, len - 1]`.
    #[must_use]
    pub fn contains_wire_index(&self, target: i64) -> bool {
        if target == INTRO_BEAT {
            return true;
        }
        usize::try_from(target).is_ok_and(|index| index < self.beats.len())
    }
}

impl From<Script> for Vec<Beat> {
    fn from(script: Script) -> Self {
        script.beats
    }
}

impl TryFrom<Vec<Beat>> for Script {
    type Error = EngineError;

    fn try_from(beats: Vec<Beat>) -> Result<Self, Self::Error> {
        Self::new(beats)
    }
}
