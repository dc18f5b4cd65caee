//! Platform abstraction layer
//!
//! Pure helpers shared by the web shell and host tests:
//! - Input: pointer/touch samples in surface coordinates
//! - Time: session clock mapping browser timestamps to core milliseconds

pub mod input;
pub mod time;

pub use input::{SurfaceRect, mouse_sample, touch_sample};
pub use time::SessionClock;
