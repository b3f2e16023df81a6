//! Test scene notifier — records every visibility toggle.

use std::sync::Mutex;

use showrunner_core::scene::SceneNotifier;

/// A scene notifier that records all `set_visible` calls in call order.
#[derive(Debug, Default)]
pub struct RecordingSceneNotifier {
    calls: Mutex<Vec<(String, bool)>>,
}

impl RecordingSceneNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the last visibility recorded for `object`, if any call
    /// named it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn last_visibility(&self, object: &str) -> Option<bool> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(name, _)| name == object)
            .map(|(_, visible)| *visible)
    }
}

impl SceneNotifier for RecordingSceneNotifier {
    fn set_visible(&self, object: &str, visible: bool) {
        self.calls.lock().unwrap().push((object.to_owned(), visible));
    }
}
