//! Scene-visibility boundary.

/// Outbound, fire-and-forget channel to the 3D-scene host.
///
/// Calls carry no acknowledgment and no ordering guarantee beyond call
/// order. Toggling an object to a state it is already in must be safe; the
/// engine calls redundantly rather than tracking the host's view of the
/// scene.
pub trait SceneNotifier: Send + Sync {
    /// Asks the host to show or hide the named scene object.
    fn set_visible(&self, object: &str, visible: bool);
}
