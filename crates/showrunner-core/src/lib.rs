//! Showrunner Core — shared engine abstractions.
//!
//! This crate defines the traits and wire types the presentation engine
//! depends on: the clock, the scene-visibility boundary, the narration
//! track boundary, and the shared session store. It contains no
//! infrastructure code.

pub mod clock;
pub mod error;
pub mod narration;
pub mod scene;
pub mod session;
