//! Shared test doubles for the Showrunner engine.

mod clock;
mod narration;
mod scene;
mod session;

pub use clock::{FixedClock, ManualClock};
pub use narration::{ScriptedTrack, UnavailableTrack};
pub use scene::RecordingSceneNotifier;
pub use session::{FailingSessionStore, InMemorySessionStore};
