//! Deterministic experience core
//!
//! All scene logic lives here. This module must stay pure and deterministic:
//! - Time is a millisecond counter passed in by the caller
//! - Seeded RNG only
//! - Every delayed action is a cancellable timer
//! - No DOM, audio or platform dependencies

pub mod experience;
pub mod rooftop;
pub mod scene;
pub mod scratch;
pub mod timer;
pub mod turntable;
pub mod typewriter;

pub use experience::{Effect, Experience, ExperienceSnapshot, Input, SceneState, SceneView};
pub use rooftop::{BackdropStar, MessagePopup, Rooftop, RooftopSnapshot, ShootingStar};
pub use scene::{Scene, SceneController};
pub use scratch::{CoverageBuffer, PointerSample, ScratchCard, ScratchSnapshot};
pub use timer::{TimerId, Timers};
pub use turntable::{Turntable, TurntableSnapshot};
pub use typewriter::{Typewriter, TypewriterSnapshot};
