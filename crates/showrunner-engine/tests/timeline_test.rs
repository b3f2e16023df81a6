//! Timeline mode: narration-driven advancement and session mirroring.

mod common;

use std::sync::Arc;
use std::time::Duration;

use showrunner_core::clock::SystemClock;
use showrunner_core::narration::TrackSignal;
use showrunner_engine::{PresentationEvent, Presenter};
use showrunner_test_support::{InMemorySessionStore, RecordingSceneNotifier, ScriptedTrack};

use common::{
    beat_indices, collect_until_finished, drain_after, fast_config, narrated_script, next_event,
};

fn positions(elapsed: &[f64]) -> Vec<TrackSignal> {
    elapsed.iter().copied().map(TrackSignal::Position).collect()
}

#[tokio::test]
async fn test_narration_positions_advance_every_beat_in_order_and_finish() {
    let mut signals = positions(&[0.0, 5.0, 25.0, 40.0, 65.0, 90.0]);
    signals.push(TrackSignal::Ended);
    let track = Arc::new(ScriptedTrack::new(signals, Duration::from_millis(10)));

    let presenter = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(SystemClock),
        Arc::new(RecordingSceneNotifier::new()),
        Some(track),
        None,
    )
    .await;
    let mut events = presenter.events();

    presenter.start().await;
    let collected = collect_until_finished(&mut events, Duration::from_secs(2)).await;

    assert_eq!(beat_indices(&collected), vec![0, 1, 2, 3, 4, 5]);
    let finishes = collected
        .iter()
        .filter(|event| **event == PresentationEvent::Finished)
        .count();
    assert_eq!(finishes, 1);

    presenter.shutdown().await;
}

#[tokio::test]
async fn test_narration_advances_are_mirrored_to_the_session() {
    let store = Arc::new(InMemorySessionStore::new());
    let track = Arc::new(ScriptedTrack::new(
        positions(&[5.0]),
        Duration::from_millis(10),
    ));

    let presenter = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(SystemClock),
        Arc::new(RecordingSceneNotifier::new()),
        Some(track),
        Some(store.clone()),
    )
    .await;
    let mut events = presenter.events();

    presenter.start().await;
    let collected = drain_after(&mut events, Duration::from_millis(150)).await;

    assert_eq!(beat_indices(&collected), vec![0, 1]);
    let published = store.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].current_beat, 0);
    assert_eq!(published[0].elapsed_seconds, Some(0.0));
    assert_eq!(published[1].current_beat, 1);
    assert_eq!(published[1].elapsed_seconds, Some(5.0));

    presenter.shutdown().await;
}

#[tokio::test]
async fn test_own_echo_produces_no_additional_transitions() {
    let store = Arc::new(InMemorySessionStore::new());
    // No positions: the only traffic is the start publish and its echo.
    let track = Arc::new(ScriptedTrack::new(vec![], Duration::from_millis(10)));

    let presenter = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(SystemClock),
        Arc::new(RecordingSceneNotifier::new()),
        Some(track),
        Some(store.clone()),
    )
    .await;
    let mut events = presenter.events();

    presenter.start().await;
    let first = next_event(&mut events).await;
    assert!(matches!(
        first,
        PresentationEvent::BeatChanged { index: 0, .. }
    ));

    // The echo of the start publish lands well within this window.
    let extras = drain_after(&mut events, Duration::from_millis(200)).await;
    assert!(extras.is_empty(), "echo caused transitions: {extras:?}");
    assert_eq!(store.published().len(), 1);

    presenter.shutdown().await;
}
