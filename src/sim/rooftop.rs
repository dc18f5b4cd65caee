//! Rooftop star-collecting scene
//!
//! Shooting stars appear on a fixed interval and burn out after a short
//! lifetime. Catching one shows its message and fills the stardust meter;
//! a full meter grows the constellation tree, which leads to the finale.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::timer::{TimerId, Timers};
use crate::consts::*;
use crate::content::STAR_MESSAGES;
use crate::progress_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RooftopEvent {
    Spawn,
    Expire(u32),
    DismissMessage,
    GrowTree,
}

/// A clickable shooting star
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShootingStar {
    pub id: u32,
    /// Percent of the sky from the top
    pub top: f32,
    /// Percent of the sky from the left
    pub left: f32,
    pub message: &'static str,
}

/// Decorative twinkling star
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackdropStar {
    pub top: f32,
    pub left: f32,
    /// Diameter in pixels
    pub size: f32,
    /// Twinkle animation delay in seconds
    pub delay: f32,
}

/// Message shown where a star was caught
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePopup {
    pub star_id: u32,
    pub text: &'static str,
    pub pos: Vec2,
}

/// Rooftop scene state
#[derive(Debug, Clone)]
pub struct Rooftop {
    stars: Vec<ShootingStar>,
    backdrop: Vec<BackdropStar>,
    collected: u32,
    message: Option<MessagePopup>,
    tree_grown: bool,
    tree_scheduled: bool,
    next_id: u32,
    spawner: Option<TimerId>,
    dismiss: Option<TimerId>,
    timers: Timers<RooftopEvent>,
}

/// View data for the rooftop
#[derive(Debug, Clone, Serialize)]
pub struct RooftopSnapshot {
    pub stars: Vec<ShootingStar>,
    pub backdrop: Vec<BackdropStar>,
    pub collected: u32,
    pub needed: u32,
    pub progress_percent: f32,
    pub message: Option<MessagePopup>,
    pub tree_grown: bool,
}

impl Rooftop {
    /// Set up the sky and start the spawner at `now_ms`
    pub fn new<R: Rng>(now_ms: u64, rng: &mut R) -> Self {
        let backdrop = (0..BACKDROP_STARS)
            .map(|_| BackdropStar {
                top: rng.random_range(0.0..60.0),
                left: rng.random_range(0.0..100.0),
                size: rng.random_range(1.0..4.0),
                delay: rng.random_range(0.0..3.0),
            })
            .collect();

        let mut rooftop = Self {
            stars: Vec::new(),
            backdrop,
            collected: 0,
            message: None,
            tree_grown: false,
            tree_scheduled: false,
            next_id: 1,
            spawner: None,
            dismiss: None,
            timers: Timers::new(),
        };
        rooftop.restart_spawner(now_ms);
        rooftop
    }

    pub fn stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn message(&self) -> Option<&MessagePopup> {
        self.message.as_ref()
    }

    pub fn is_tree_grown(&self) -> bool {
        self.tree_grown
    }

    pub fn is_spawning(&self) -> bool {
        self.spawner.is_some()
    }

    pub fn progress_percent(&self) -> f32 {
        progress_percent(self.collected, STARS_NEEDED)
    }

    fn restart_spawner(&mut self, now_ms: u64) {
        if let Some(id) = self.spawner.take() {
            self.timers.cancel(id);
        }
        if self.collected < STARS_NEEDED {
            self.spawner = Some(
                self.timers
                    .schedule_every(now_ms, STAR_SPAWN_INTERVAL_MS, RooftopEvent::Spawn),
            );
        }
    }

    /// Launch one shooting star at `now_ms`. Returns its id.
    pub fn spawn_star<R: Rng>(&mut self, now_ms: u64, rng: &mut R) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let message = STAR_MESSAGES[rng.random_range(0..STAR_MESSAGES.len())];
        self.stars.push(ShootingStar {
            id,
            top: rng.random_range(0.0..40.0),
            left: rng.random_range(20.0..100.0),
            message,
        });
        self.timers
            .schedule(now_ms, STAR_LIFETIME_MS, RooftopEvent::Expire(id));
        log::debug!("Star {} spawned", id);
        id
    }

    /// Catch star `id` at pointer position `pos`.
    ///
    /// Returns false if the star is gone (already caught or burnt out).
    pub fn collect(&mut self, now_ms: u64, id: u32, pos: Vec2) -> bool {
        let Some(idx) = self.stars.iter().position(|s| s.id == id) else {
            return false;
        };
        let star = self.stars.remove(idx);

        if let Some(timer) = self.dismiss.take() {
            self.timers.cancel(timer);
        }
        self.message = Some(MessagePopup {
            star_id: star.id,
            text: star.message,
            pos,
        });
        self.dismiss = Some(
            self.timers
                .schedule(now_ms, MESSAGE_DURATION_MS, RooftopEvent::DismissMessage),
        );

        self.collected += 1;
        log::debug!("Star {} collected ({}/{})", id, self.collected, STARS_NEEDED);

        if self.collected >= STARS_NEEDED && !self.tree_scheduled {
            self.tree_scheduled = true;
            self.timers
                .schedule(now_ms, TREE_GROW_DELAY_MS, RooftopEvent::GrowTree);
        }
        self.restart_spawner(now_ms);
        true
    }

    /// The grown tree was clicked. Returns true when the scene is finished.
    pub fn click_tree(&self) -> bool {
        self.tree_grown
    }

    /// Fire due timers
    pub fn tick<R: Rng>(&mut self, now_ms: u64, rng: &mut R) {
        while let Some((due, event)) = self.timers.pop_due(now_ms) {
            match event {
                RooftopEvent::Spawn => {
                    self.spawn_star(due, rng);
                }
                RooftopEvent::Expire(id) => {
                    let before = self.stars.len();
                    self.stars.retain(|s| s.id != id);
                    if self.stars.len() != before {
                        log::debug!("Star {} burnt out", id);
                    }
                }
                RooftopEvent::DismissMessage => {
                    self.dismiss = None;
                    self.message = None;
                }
                RooftopEvent::GrowTree => {
                    self.tree_grown = true;
                    log::info!("Constellation tree grown");
                }
            }
        }
    }

    /// Cancel outstanding timers. Returns how many were pending.
    pub fn teardown(&mut self) -> usize {
        self.spawner = None;
        self.dismiss = None;
        self.timers.cancel_all()
    }

    pub fn snapshot(&self) -> RooftopSnapshot {
        RooftopSnapshot {
            stars: self.stars.clone(),
            backdrop: self.backdrop.clone(),
            collected: self.collected,
            needed: STARS_NEEDED,
            progress_percent: self.progress_percent(),
            message: self.message.clone(),
            tree_grown: self.tree_grown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rooftop() -> (Rooftop, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(2024);
        let rooftop = Rooftop::new(0, &mut rng);
        (rooftop, rng)
    }

    #[test]
    fn test_backdrop_generated_in_bounds() {
        let (roof, _) = rooftop();
        let snap = roof.snapshot();
        assert_eq!(snap.backdrop.len(), BACKDROP_STARS);
        assert!(snap.backdrop.iter().all(|s| s.top < 60.0 && s.size >= 1.0));
    }

    #[test]
    fn test_spawns_on_interval() {
        let (mut roof, mut rng) = rooftop();
        roof.tick(STAR_SPAWN_INTERVAL_MS - 1, &mut rng);
        assert!(roof.stars().is_empty());
        roof.tick(STAR_SPAWN_INTERVAL_MS, &mut rng);
        assert_eq!(roof.stars().len(), 1);
        let star = &roof.stars()[0];
        assert!((0.0..40.0).contains(&star.top));
        assert!((20.0..100.0).contains(&star.left));
        assert!(STAR_MESSAGES.contains(&star.message));
    }

    #[test]
    fn test_uncollected_star_expires() {
        let (mut roof, mut rng) = rooftop();
        let id = roof.spawn_star(0, &mut rng);
        roof.tick(STAR_LIFETIME_MS - 1, &mut rng);
        assert!(roof.stars().iter().any(|s| s.id == id));
        roof.tick(STAR_LIFETIME_MS + 1, &mut rng);
        assert!(roof.stars().iter().all(|s| s.id != id));
        assert_eq!(roof.collected(), 0);
    }

    #[test]
    fn test_collect_once() {
        let (mut roof, mut rng) = rooftop();
        let id = roof.spawn_star(0, &mut rng);
        assert!(roof.collect(100, id, Vec2::new(10.0, 20.0)));
        assert!(!roof.collect(101, id, Vec2::ZERO));
        assert_eq!(roof.collected(), 1);

        let popup = roof.message().cloned();
        assert_eq!(popup.as_ref().map(|m| m.star_id), Some(id));
        assert_eq!(popup.map(|m| m.pos), Some(Vec2::new(10.0, 20.0)));

        // Expiry of a collected star changes nothing
        roof.tick(STAR_LIFETIME_MS, &mut rng);
        assert_eq!(roof.collected(), 1);
    }

    #[test]
    fn test_collect_after_expiry_is_noop() {
        let (mut roof, mut rng) = rooftop();
        let id = roof.spawn_star(0, &mut rng);
        roof.tick(STAR_LIFETIME_MS, &mut rng);
        assert!(!roof.collect(STAR_LIFETIME_MS, id, Vec2::ZERO));
        assert_eq!(roof.collected(), 0);
        assert!(roof.message().is_none());
    }

    #[test]
    fn test_message_dismissed() {
        let (mut roof, mut rng) = rooftop();
        let id = roof.spawn_star(0, &mut rng);
        roof.collect(500, id, Vec2::ZERO);
        roof.tick(500 + MESSAGE_DURATION_MS - 1, &mut rng);
        assert!(roof.message().is_some());
        roof.tick(500 + MESSAGE_DURATION_MS, &mut rng);
        assert!(roof.message().is_none());
    }

    #[test]
    fn test_newer_message_not_hidden_by_older_timer() {
        let (mut roof, mut rng) = rooftop();
        let a = roof.spawn_star(0, &mut rng);
        let b = roof.spawn_star(0, &mut rng);
        roof.collect(100, a, Vec2::ZERO);
        roof.collect(1500, b, Vec2::ZERO);
        roof.tick(100 + MESSAGE_DURATION_MS, &mut rng);
        assert_eq!(roof.message().map(|m| m.star_id), Some(b));
    }

    #[test]
    fn test_collect_restarts_spawn_interval() {
        let (mut roof, mut rng) = rooftop();
        let id = roof.spawn_star(0, &mut rng);
        roof.collect(2000, id, Vec2::ZERO);
        roof.tick(STAR_SPAWN_INTERVAL_MS, &mut rng);
        assert!(roof.stars().is_empty());
        roof.tick(2000 + STAR_SPAWN_INTERVAL_MS, &mut rng);
        assert_eq!(roof.stars().len(), 1);
    }

    #[test]
    fn test_tree_grows_once_after_delay() {
        let (mut roof, mut rng) = rooftop();
        let ids: Vec<u32> = (0..STARS_NEEDED).map(|_| roof.spawn_star(0, &mut rng)).collect();
        for id in &ids {
            roof.collect(1000, *id, Vec2::ZERO);
        }
        let extra = roof.spawn_star(2000, &mut rng);
        assert_eq!(roof.collected(), STARS_NEEDED);
        assert!(!roof.is_spawning());
        assert!(!roof.click_tree());

        roof.tick(1000 + TREE_GROW_DELAY_MS - 1, &mut rng);
        assert!(!roof.is_tree_grown());
        roof.tick(1000 + TREE_GROW_DELAY_MS, &mut rng);
        assert!(roof.is_tree_grown());
        assert!(roof.click_tree());

        // A star caught past the threshold does not schedule another growth
        assert!(roof.collect(2600, extra, Vec2::ZERO));
        assert_eq!(roof.collected(), STARS_NEEDED + 1);
        assert_eq!(roof.progress_percent(), 100.0);
        assert!(!roof.is_spawning());
        roof.tick(2600 + MESSAGE_DURATION_MS, &mut rng);
        assert_eq!(roof.teardown(), 0);
    }

    #[test]
    fn test_no_spawns_after_threshold() {
        let (mut roof, mut rng) = rooftop();
        for _ in 0..STARS_NEEDED {
            let id = roof.spawn_star(0, &mut rng);
            roof.collect(0, id, Vec2::ZERO);
        }
        roof.tick(60_000, &mut rng);
        assert!(roof.stars().is_empty());
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let (mut roof, mut rng) = rooftop();
        roof.spawn_star(0, &mut rng);
        assert!(roof.teardown() >= 2);
        roof.tick(60_000, &mut rng);
        assert_eq!(roof.stars().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_collect_or_expire_never_both(
            seed in any::<u64>(),
            clicks in proptest::collection::vec((0u64..5000, 1u32..6), 0..20),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut roof = Rooftop::new(0, &mut rng);
            for _ in 0..5 {
                roof.spawn_star(0, &mut rng);
            }
            let mut clicks = clicks;
            clicks.sort();
            let mut collected = std::collections::HashSet::new();
            for (t, id) in clicks {
                roof.tick(t, &mut rng);
                let alive = roof.stars().iter().any(|s| s.id == id);
                let got = roof.collect(t, id, Vec2::ZERO);
                prop_assert_eq!(got, alive);
                if got {
                    prop_assert!(collected.insert(id));
                }
            }
            prop_assert_eq!(roof.collected() as usize, collected.len());
        }
    }
}
