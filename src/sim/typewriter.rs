//! Typewriter letter scene
//!
//! The letter is typed one character per tick while a random key on the
//! machine dips. When typing is done the user may tear the page off, which
//! hands over to the rooftop after the tear animation.

use rand::Rng;
use serde::Serialize;

use super::timer::{TimerId, Timers};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LetterEvent {
    TypeNext,
    ReleaseKey,
    TearDone,
}

/// Typewriter scene state
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    typed: usize,
    pressed_key: Option<u8>,
    tearing: bool,
    typing_timer: Option<TimerId>,
    release_timer: Option<TimerId>,
    timers: Timers<LetterEvent>,
}

/// View data for the letter
#[derive(Debug, Clone, Serialize)]
pub struct TypewriterSnapshot {
    pub text: String,
    pub pressed_key: Option<u8>,
    pub complete: bool,
    pub tearing: bool,
}

impl Typewriter {
    /// Start typing `text` at `now_ms`
    pub fn new(now_ms: u64, text: &str) -> Self {
        let mut timers = Timers::new();
        let chars: Vec<char> = text.chars().collect();
        let typing_timer = if chars.is_empty() {
            None
        } else {
            Some(timers.schedule_every(now_ms, TYPE_INTERVAL_MS, LetterEvent::TypeNext))
        };
        Self {
            chars,
            typed: 0,
            pressed_key: None,
            tearing: false,
            typing_timer,
            release_timer: None,
            timers,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.typed >= self.chars.len()
    }

    pub fn is_tearing(&self) -> bool {
        self.tearing
    }

    pub fn typed_text(&self) -> String {
        self.chars[..self.typed].iter().collect()
    }

    /// Tear the finished page off. Ignored while still typing or already
    /// tearing; a started tear cannot be undone.
    pub fn tear(&mut self, now_ms: u64) -> bool {
        if !self.is_complete() || self.tearing {
            return false;
        }
        self.tearing = true;
        self.timers.schedule(now_ms, TEAR_DELAY_MS, LetterEvent::TearDone);
        log::debug!("Letter torn, leaving in {}ms", TEAR_DELAY_MS);
        true
    }

    /// Fire due timers. Returns true once the tear animation has finished.
    pub fn tick<R: Rng>(&mut self, now_ms: u64, rng: &mut R) -> bool {
        let mut done = false;
        while let Some((due, event)) = self.timers.pop_due(now_ms) {
            match event {
                LetterEvent::TypeNext => self.type_next(due, rng),
                LetterEvent::ReleaseKey => {
                    self.release_timer = None;
                    self.pressed_key = None;
                }
                LetterEvent::TearDone => done = true,
            }
        }
        done
    }

    fn type_next<R: Rng>(&mut self, due_ms: u64, rng: &mut R) {
        if self.is_complete() {
            return;
        }
        self.typed += 1;

        if let Some(id) = self.release_timer.take() {
            self.timers.cancel(id);
        }
        self.pressed_key = Some(rng.random_range(0..TYPEWRITER_KEYS));
        self.release_timer = Some(self.timers.schedule(due_ms, KEY_PRESS_MS, LetterEvent::ReleaseKey));

        if self.is_complete() {
            if let Some(id) = self.typing_timer.take() {
                self.timers.cancel(id);
            }
            log::debug!("Letter fully typed ({} chars)", self.chars.len());
        }
    }

    /// Cancel outstanding timers. Returns how many were pending.
    pub fn teardown(&mut self) -> usize {
        self.typing_timer = None;
        self.release_timer = None;
        self.timers.cancel_all()
    }

    pub fn snapshot(&self) -> TypewriterSnapshot {
        TypewriterSnapshot {
            text: self.typed_text(),
            pressed_key: self.pressed_key,
            complete: self.is_complete(),
            tearing: self.tearing,
        }
    }
}
