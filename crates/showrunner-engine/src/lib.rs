//! Showrunner — presentation synchronization engine.
//!
//! Drives a narrated, multi-viewer slide presentation: advances through an
//! ordered script of text/media beats, keeps the 3D-scene host informed of
//! which objects should be visible, and keeps every viewer of the same
//! shared session on the same beat.

pub mod application;
pub mod domain;

pub use application::presenter::{Presenter, PresenterConfig};
pub use domain::events::PresentationEvent;
pub use domain::script::{Beat, BeatTiming, Script, ScriptMode};
pub use domain::state::SceneBindings;
