//! Shared test helpers for engine integration tests.
#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::broadcast;
use tokio::time::timeout;

use showrunner_engine::{Beat, PresentationEvent, PresenterConfig, SceneBindings, Script};

/// Fixed show-open instant used across integration tests.
pub fn show_open() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// The six-beat narrated script used by the timeline tests.
pub fn narrated_script() -> Script {
    Script::new(vec![
        Beat::narrated("opening", None, 0.0),
        Beat::narrated("supply twin", Some("Exhibit 1"), 3.0),
        Beat::narrated("the result", Some("Exhibit 2"), 23.0),
        Beat::narrated("simulation", Some("Exhibit 3"), 38.0),
        Beat::narrated("resolution", Some("Exhibit 4"), 63.0),
        Beat::narrated("closing", Some("Exhibit 5"), 87.0),
    ])
    .unwrap()
}

/// A three-beat timeline script with round offsets for fallback tests.
pub fn short_timeline_script() -> Script {
    Script::new(vec![
        Beat::narrated("first", None, 0.0),
        Beat::narrated("second", Some("Exhibit 1"), 10.0),
        Beat::narrated("third", Some("Exhibit 2"), 20.0),
    ])
    .unwrap()
}

/// A two-beat duration script: one hold, then the terminal beat.
pub fn duration_script(first_hold_millis: u64) -> Script {
    Script::new(vec![
        Beat::timed("first", Some("Exhibit 1"), first_hold_millis),
        Beat::timed("last", None, 0),
    ])
    .unwrap()
}

/// Scene bindings shared by the integration rigs.
pub fn bindings() -> SceneBindings {
    SceneBindings {
        preshow: Some("Lobby Scene".to_owned()),
        cue: Some("On Air Lamp".to_owned()),
    }
}

/// A presenter config with test-friendly fallback timing.
pub fn fast_config() -> PresenterConfig {
    PresenterConfig {
        bindings: bindings(),
        shadow_poll: Duration::from_millis(10),
        ..PresenterConfig::default()
    }
}

/// Receives the next event, failing the test after one second of silence.
///
/// # Panics
///
/// Panics if no event arrives in time or the channel closed.
pub async fn next_event(events: &mut broadcast::Receiver<PresentationEvent>) -> PresentationEvent {
    timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Collects events until `Finished` arrives, failing after `deadline`.
///
/// # Panics
///
/// Panics if `Finished` does not arrive before the deadline.
pub async fn collect_until_finished(
    events: &mut broadcast::Receiver<PresentationEvent>,
    deadline: Duration,
) -> Vec<PresentationEvent> {
    let mut collected = Vec::new();
    let run = async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            let done = event == PresentationEvent::Finished;
            collected.push(event);
            if done {
                break;
            }
        }
    };
    timeout(deadline, run)
        .await
        .expect("timed out waiting for Finished");
    collected
}

/// Sleeps for `window`, then drains everything queued on the receiver.
pub async fn drain_after(
    events: &mut broadcast::Receiver<PresentationEvent>,
    window: Duration,
) -> Vec<PresentationEvent> {
    tokio::time::sleep(window).await;
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

/// The beat indices committed across a stream of events.
pub fn beat_indices(events: &[PresentationEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            PresentationEvent::BeatChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}
