//! Session settings
//!
//! Read once at start-up from an optional JSON block in the page
//! (`<script type="application/json" id="settings">`), then overridden by
//! URL query parameters. Nothing is written back.

use serde::{Deserialize, Serialize};

/// Experience settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0), multiplied into the music volume
    pub master_volume: f32,
    /// Never start audio
    pub muted: bool,
    /// Fixed RNG seed (wall clock when unset)
    pub seed: Option<u64>,
    /// Ask the page to tone down animations
    pub reduced_motion: bool,
    /// Verbose logging
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            muted: false,
            seed: None,
            reduced_motion: false,
            debug: false,
        }
    }
}

impl Settings {
    /// DOM id of the embedded JSON block
    pub const ELEMENT_ID: &'static str = "settings";

    /// Parse the embedded JSON block, falling back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings JSON ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Query parameters that override page settings
    pub const QUERY_KEYS: [&'static str; 5] = ["seed", "volume", "muted", "debug", "reduced_motion"];

    /// Apply one already-decoded `key=value` override.
    /// Unparseable values are logged and skipped; unknown keys are ignored.
    pub fn apply_override(&mut self, key: &str, value: &str) {
        match key {
            "seed" => match value.parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => log::warn!("Ignoring bad seed {:?}", value),
            },
            "volume" => match value.parse::<f32>() {
                Ok(v) if v.is_finite() => self.master_volume = v.clamp(0.0, 1.0),
                _ => log::warn!("Ignoring bad volume {:?}", value),
            },
            "muted" => self.muted = parse_flag(value),
            "debug" => self.debug = parse_flag(value),
            "reduced_motion" => self.reduced_motion = parse_flag(value),
            _ => {}
        }
    }

    /// Apply a plain `seed=..&muted=1&volume=0.4&debug&reduced_motion` string
    /// (native runs, no percent-decoding).
    pub fn apply_query(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.apply_override(key, value);
        }
    }

    /// Volume to hand to the audio element for a requested level
    pub fn effective_volume(&self, requested: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            (requested * self.master_volume).clamp(0.0, 1.0)
        }
    }

    /// Log level for `console_log` / `env_logger`
    pub fn log_level(&self) -> log::Level {
        if self.debug {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }

    /// Load from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };

        let mut settings = window
            .document()
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content())
            .map(|json| Self::from_json(&json))
            .unwrap_or_default();

        let params = window
            .location()
            .search()
            .and_then(|query| web_sys::UrlSearchParams::new_with_str(&query));
        match params {
            Ok(params) => {
                for key in Self::QUERY_KEYS {
                    if let Some(value) = params.get(key) {
                        settings.apply_override(key, &value);
                    }
                }
            }
            Err(_) => log::warn!("Could not read URL query, using page settings"),
        }
        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Ok(query) = std::env::var("STARLIT_QUERY") {
            settings.apply_query(&query);
        }
        settings
    }
}

/// Bare key, `1`, `true`, `yes` and `on` all mean enabled
fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.master_volume, 1.0);
        assert!(!s.muted);
        assert_eq!(s.seed, None);
        assert_eq!(s.log_level(), log::Level::Info);
    }

    #[test]
    fn test_from_json_partial() {
        let s = Settings::from_json(r#"{"seed": 42, "master_volume": 3.0}"#);
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.master_volume, 1.0);
        assert!(!s.debug);
    }

    #[test]
    fn test_from_json_invalid() {
        assert_eq!(Settings::from_json("{not json"), Settings::default());
    }

    #[test]
    fn test_query_overrides() {
        let mut s = Settings::from_json(r#"{"seed": 1}"#);
        s.apply_query("?seed=99&volume=0.25&muted&debug=0&reduced_motion=yes");
        assert_eq!(s.seed, Some(99));
        assert_eq!(s.master_volume, 0.25);
        assert!(s.muted);
        assert!(!s.debug);
        assert!(s.reduced_motion);
    }

    #[test]
    fn test_query_bad_values_skipped() {
        let mut s = Settings::default();
        s.apply_query("seed=abc&volume=loud&unknown=1");
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_effective_volume() {
        let mut s = Settings::default();
        s.master_volume = 0.5;
        assert_eq!(s.effective_volume(0.5), 0.25);
        s.muted = true;
        assert_eq!(s.effective_volume(0.5), 0.0);
    }

    #[test]
    fn test_apply_override_takes_decoded_values() {
        let mut s = Settings::default();
        // What URLSearchParams hands back for `?seed=%34%32&volume=0%2E5&muted`
        s.apply_override("seed", "42");
        s.apply_override("volume", "0.5");
        s.apply_override("muted", "");
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.master_volume, 0.5);
        assert!(s.muted);
    }

    #[test]
    fn test_query_keys_all_recognised() {
        for key in Settings::QUERY_KEYS {
            let mut s = Settings::default();
            s.apply_override(key, if key == "volume" { "0.5" } else { "1" });
            assert_ne!(s, Settings::default(), "{} had no effect", key);
        }
    }
}
