//! Background music using an HTML audio element
//!
//! One looping track per session. Browsers may reject `play()` when there
//! has been no user gesture yet; that is logged and otherwise ignored.

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlAudioElement;

use crate::Settings;

/// Music player for the experience
pub struct MusicPlayer {
    element: Option<HtmlAudioElement>,
    settings: Settings,
}

impl MusicPlayer {
    pub fn new(settings: Settings) -> Self {
        let element = HtmlAudioElement::new().ok();
        match &element {
            Some(el) => el.set_loop(true),
            None => log::warn!("Failed to create audio element - music disabled"),
        }
        Self { element, settings }
    }

    /// Switch to `src` and start playing
    pub fn play(&self, src: &str, looping: bool, volume: f32) {
        let Some(el) = &self.element else { return };
        if self.settings.muted {
            log::info!("Muted, not starting {}", src);
            return;
        }

        el.set_src(src);
        el.set_loop(looping);
        el.set_volume(self.settings.effective_volume(volume) as f64);

        let Ok(promise) = el.play() else {
            log::warn!("Audio play() threw synchronously");
            return;
        };
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Audio play failed (likely autoplay policy): {}", describe(&e));
            }
        });
    }

    /// Stop playback (page teardown)
    pub fn stop(&self) {
        if let Some(el) = &self.element {
            let _ = el.pause();
        }
    }
}

impl Drop for MusicPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
