//! Record player scene
//!
//! The user drops (or clicks) a record onto the platter; after a short
//! needle-drop delay the record starts spinning and the music request goes
//! out. Once something is playing the "begin" button leads to the letter.

use serde::Serialize;

use super::timer::{TimerId, Timers};
use crate::consts::*;
use crate::content::{MUSIC_DISCS, MusicDisc, find_disc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurntableEvent {
    StartPlaying,
}

/// Turntable scene state
#[derive(Debug, Clone, Default)]
pub struct Turntable {
    placed: Option<&'static MusicDisc>,
    playing: bool,
    dragging_over: bool,
    pending_start: Option<TimerId>,
    timers: Timers<TurntableEvent>,
}

/// View data for the record player
#[derive(Debug, Clone, Serialize)]
pub struct TurntableSnapshot {
    pub placed: Option<&'static MusicDisc>,
    pub playing: bool,
    pub dragging_over: bool,
    /// Records still on the shelf, in display order
    pub shelf: Vec<&'static MusicDisc>,
}

impl Turntable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placed(&self) -> Option<&'static MusicDisc> {
        self.placed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_dragging_over(&mut self, over: bool) {
        self.dragging_over = over;
    }

    /// Put a record on the platter. Unknown ids and the record already on
    /// the platter are ignored.
    pub fn place_disc(&mut self, now_ms: u64, disc_id: &str) -> bool {
        self.dragging_over = false;
        let Some(disc) = find_disc(disc_id) else {
            log::warn!("Dropped unknown record id {:?}", disc_id);
            return false;
        };
        if self.placed.map(|d| d.id) == Some(disc.id) {
            return false;
        }

        if let Some(id) = self.pending_start.take() {
            self.timers.cancel(id);
        }
        self.placed = Some(disc);
        self.playing = false;
        self.pending_start =
            Some(self.timers.schedule(now_ms, DISC_START_DELAY_MS, TurntableEvent::StartPlaying));
        log::debug!("Record {:?} placed", disc.title);
        true
    }

    /// Lift the record off. The music already requested keeps playing.
    pub fn change_record(&mut self) {
        if let Some(id) = self.pending_start.take() {
            self.timers.cancel(id);
        }
        self.placed = None;
        self.playing = false;
    }

    /// Begin the letter. Only honoured while a record is playing.
    pub fn begin(&self) -> bool {
        self.playing
    }

    /// Fire due timers. Returns the record that just started playing.
    pub fn tick(&mut self, now_ms: u64) -> Option<&'static MusicDisc> {
        let mut started = None;
        while let Some((_, event)) = self.timers.pop_due(now_ms) {
            match event {
                TurntableEvent::StartPlaying => {
                    self.pending_start = None;
                    if let Some(disc) = self.placed {
                        self.playing = true;
                        started = Some(disc);
                    }
                }
            }
        }
        started
    }

    /// Cancel outstanding timers. Returns how many were pending.
    pub fn teardown(&mut self) -> usize {
        self.pending_start = None;
        self.timers.cancel_all()
    }

    pub fn snapshot(&self) -> TurntableSnapshot {
        let placed_id = self.placed.map(|d| d.id);
        TurntableSnapshot {
            placed: self.placed,
            playing: self.playing,
            dragging_over: self.dragging_over,
            shelf: MUSIC_DISCS
                .iter()
                .filter(|d| Some(d.id) != placed_id)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_then_play_after_delay() {
        let mut tt = Turntable::new();
        assert!(tt.place_disc(0, "1"));
        assert!(tt.tick(DISC_START_DELAY_MS - 1).is_none());
        assert!(!tt.is_playing());
        assert!(!tt.begin());

        let started = tt.tick(DISC_START_DELAY_MS).map(|d| d.id);
        assert_eq!(started, Some("1"));
        assert!(tt.is_playing());
        assert!(tt.begin());
    }

    #[test]
    fn test_unknown_and_duplicate_ignored() {
        let mut tt = Turntable::new();
        assert!(!tt.place_disc(0, "nope"));
        assert!(tt.placed().is_none());
        assert!(tt.place_disc(0, "2"));
        assert!(!tt.place_disc(100, "2"));
        // Start time not pushed back by the duplicate
        assert!(tt.tick(DISC_START_DELAY_MS).is_some());
    }

    #[test]
    fn test_swap_restarts_delay() {
        let mut tt = Turntable::new();
        tt.place_disc(0, "1");
        tt.place_disc(400, "3");
        assert!(tt.tick(DISC_START_DELAY_MS).is_none());
        assert_eq!(tt.tick(400 + DISC_START_DELAY_MS).map(|d| d.id), Some("3"));
    }

    #[test]
    fn test_change_record_cancels_pending() {
        let mut tt = Turntable::new();
        tt.place_disc(0, "1");
        tt.change_record();
        assert!(tt.tick(10_000).is_none());
        assert!(tt.placed().is_none());
        assert!(!tt.begin());
    }

    #[test]
    fn test_shelf_hides_placed_record() {
        let mut tt = Turntable::new();
        assert_eq!(tt.snapshot().shelf.len(), 3);
        tt.place_disc(0, "2");
        let shelf: Vec<_> = tt.snapshot().shelf.iter().map(|d| d.id).collect();
        assert_eq!(shelf, vec!["1", "3"]);
    }

    #[test]
    fn test_drop_clears_drag_highlight() {
        let mut tt = Turntable::new();
        tt.set_dragging_over(true);
        assert!(tt.snapshot().dragging_over);
        tt.place_disc(0, "1");
        assert!(!tt.snapshot().dragging_over);
    }

    #[test]
    fn test_teardown() {
        let mut tt = Turntable::new();
        tt.place_disc(0, "1");
        assert_eq!(tt.teardown(), 1);
        assert!(tt.tick(10_000).is_none());
    }
}
