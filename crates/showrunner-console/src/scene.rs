//! Scene notifier that logs visibility toggles.
//!
//! Stands in for the embedding platform's visibility bridge; the real
//! host would translate these calls into its own message protocol.

use showrunner_core::scene::SceneNotifier;

pub struct LoggingSceneNotifier;

impl SceneNotifier for LoggingSceneNotifier {
    fn set_visible(&self, object: &str, visible: bool) {
        tracing::info!(object, visible, "toggle visibility");
    }
}
