//! Starlit Letter - a four-scene interactive greeting
//!
//! Core modules:
//! - `sim`: Deterministic experience core (scenes, timers, stars, scratch card)
//! - `content`: Static content tables (records, letter, star messages)
//! - `platform`: Browser input helpers shared with the web shell
//! - `settings`: Session configuration (page JSON + URL query)
//! - `audio`: Background music playback (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod content;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Experience configuration constants (milliseconds unless noted)
pub mod consts {
    /// Delay between dropping a record and the music starting
    pub const DISC_START_DELAY_MS: u64 = 600;
    /// Playback volume requested for background music (0.0 - 1.0)
    pub const MUSIC_VOLUME: f32 = 0.5;

    /// Typewriter speed: one character per interval
    pub const TYPE_INTERVAL_MS: u64 = 100;
    /// How long a typewriter key stays pressed
    pub const KEY_PRESS_MS: u64 = 100;
    /// Number of round keys on the typewriter
    pub const TYPEWRITER_KEYS: u8 = 26;
    /// Paper-tear animation time before the rooftop appears
    pub const TEAR_DELAY_MS: u64 = 1500;

    /// A new shooting star every interval
    pub const STAR_SPAWN_INTERVAL_MS: u64 = 3000;
    /// Shooting stars vanish after this unless collected
    pub const STAR_LIFETIME_MS: u64 = 2500;
    /// Collected message popup duration
    pub const MESSAGE_DURATION_MS: u64 = 2000;
    /// Stars needed to grow the constellation tree
    pub const STARS_NEEDED: u32 = 10;
    /// Delay between the last star and the tree appearing
    pub const TREE_GROW_DELAY_MS: u64 = 1500;
    /// Decorative twinkling stars in the rooftop sky
    pub const BACKDROP_STARS: usize = 100;

    /// Scratch brush radius (canvas pixels)
    pub const ERASE_RADIUS: f32 = 30.0;
    /// Only every Nth pixel is inspected when measuring progress
    pub const SAMPLE_STRIDE: usize = 10;
    /// Pixels below this opacity count as scratched off
    pub const ERASED_ALPHA_THRESHOLD: u8 = 128;
    /// Erased share that reveals the picture
    pub const REVEAL_FRACTION: f32 = 0.6;
}

/// Percentage of `count` out of `total`, clamped to [0, 100]
#[inline]
pub fn progress_percent(count: u32, total: u32) -> f32 {
    if total == 0 {
        return 100.0;
    }
    (count as f32 / total as f32 * 100.0).min(100.0)
}
