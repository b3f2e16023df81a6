//! Multi-viewer synchronization over a shared session record.

mod common;

use std::sync::Arc;
use std::time::Duration;

use showrunner_core::narration::TrackSignal;
use showrunner_core::session::{PositionUpdate, SessionStore};
use showrunner_engine::{PresentationEvent, Presenter};
use showrunner_test_support::{
    FailingSessionStore, InMemorySessionStore, ManualClock, RecordingSceneNotifier, ScriptedTrack,
    UnavailableTrack,
};

use common::{beat_indices, drain_after, fast_config, narrated_script, next_event, show_open};

#[tokio::test]
async fn test_a_follower_mirrors_the_leaders_advances_one_hop_each() {
    let store = Arc::new(InMemorySessionStore::new());

    // The leader's narration plays; the follower's is blocked, so it can
    // only move on what the session broadcasts.
    let leader_track = Arc::new(ScriptedTrack::new(
        vec![TrackSignal::Position(5.0), TrackSignal::Position(25.0)],
        Duration::from_millis(15),
    ));
    let leader = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(ManualClock::new(show_open())),
        Arc::new(RecordingSceneNotifier::new()),
        Some(leader_track),
        Some(store.clone()),
    )
    .await;
    let follower = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(ManualClock::new(show_open())),
        Arc::new(RecordingSceneNotifier::new()),
        Some(Arc::new(UnavailableTrack)),
        Some(store.clone()),
    )
    .await;
    let mut leader_events = leader.events();
    let mut follower_events = follower.events();

    leader.start().await;
    let leader_seen = drain_after(&mut leader_events, Duration::from_millis(200)).await;
    let follower_seen = drain_after(&mut follower_events, Duration::from_millis(50)).await;

    assert_eq!(beat_indices(&leader_seen), vec![0, 1, 2]);
    assert_eq!(beat_indices(&follower_seen), vec![0, 1, 2]);

    leader.shutdown().await;
    follower.shutdown().await;
}

#[tokio::test]
async fn test_a_late_joiner_lands_on_the_broadcast_beat_in_one_hop() {
    let store = Arc::new(InMemorySessionStore::new());

    let viewer = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(ManualClock::new(show_open())),
        Arc::new(RecordingSceneNotifier::new()),
        Some(Arc::new(UnavailableTrack)),
        Some(store.clone()),
    )
    .await;
    let mut events = viewer.events();

    // The running leader broadcasts beat 3; this viewer is still at the
    // intro and must not step through beats 0-2 on the way there.
    store
        .publish(PositionUpdate {
            current_beat: 3,
            elapsed_seconds: Some(40.0),
        })
        .await
        .unwrap();

    let caught_up = next_event(&mut events).await;
    assert!(matches!(
        caught_up,
        PresentationEvent::BeatChanged { index: 3, .. }
    ));
    let extras = drain_after(&mut events, Duration::from_millis(50)).await;
    assert!(extras.is_empty(), "unexpected events: {extras:?}");

    viewer.shutdown().await;
}

#[tokio::test]
async fn test_a_remote_restart_rewinds_a_running_viewer() {
    let store = Arc::new(InMemorySessionStore::new());

    let viewer = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(ManualClock::new(show_open())),
        Arc::new(RecordingSceneNotifier::new()),
        Some(Arc::new(UnavailableTrack)),
        Some(store.clone()),
    )
    .await;
    let mut events = viewer.events();

    viewer.start().await;
    next_event(&mut events).await;

    store.publish(PositionUpdate::restart()).await.unwrap();

    let reset = next_event(&mut events).await;
    assert_eq!(reset, PresentationEvent::Reset);

    viewer.shutdown().await;
}

#[tokio::test]
async fn test_malformed_and_stale_targets_leave_the_viewer_untouched() {
    let store = Arc::new(InMemorySessionStore::new());

    let viewer = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(ManualClock::new(show_open())),
        Arc::new(RecordingSceneNotifier::new()),
        Some(Arc::new(UnavailableTrack)),
        Some(store.clone()),
    )
    .await;
    let mut events = viewer.events();

    // Out of range for a six-beat script.
    store
        .publish(PositionUpdate {
            current_beat: 11,
            elapsed_seconds: None,
        })
        .await
        .unwrap();
    // A rewind while already at the intro.
    store.publish(PositionUpdate::restart()).await.unwrap();

    let seen = drain_after(&mut events, Duration::from_millis(100)).await;
    assert!(seen.is_empty(), "discarded payloads caused: {seen:?}");

    viewer.shutdown().await;
}

#[tokio::test]
async fn test_an_unreachable_store_degrades_to_local_only_operation() {
    let viewer = Presenter::spawn(
        narrated_script(),
        fast_config(),
        Arc::new(ManualClock::new(show_open())),
        Arc::new(RecordingSceneNotifier::new()),
        Some(Arc::new(UnavailableTrack)),
        Some(Arc::new(FailingSessionStore)),
    )
    .await;
    let mut events = viewer.events();

    viewer.start().await;

    let first = next_event(&mut events).await;
    assert!(matches!(
        first,
        PresentationEvent::BeatChanged { index: 0, .. }
    ));

    viewer.shutdown().await;
}
