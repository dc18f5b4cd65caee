//! Top-level experience controller
//!
//! Owns everything that lives for the session: the scene controller, the
//! chosen music, the random source and the live scene. The web shell feeds
//! it inputs and clock ticks, applies the returned effects and renders
//! `snapshot()`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::rooftop::{Rooftop, RooftopSnapshot};
use super::scene::{Scene, SceneController};
use super::scratch::{PointerSample, ScratchCard, ScratchSnapshot};
use super::turntable::{Turntable, TurntableSnapshot};
use super::typewriter::{Typewriter, TypewriterSnapshot};
use crate::consts::*;
use crate::content::{LETTER_TEXT, MusicDisc};

/// A user action, routed to the scene it belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Record dropped or clicked onto the platter
    PlaceDisc { disc_id: String },
    /// A dragged record is hovering over the platter
    DragOver(bool),
    /// Lift the record off the platter
    ChangeRecord,
    /// "Begin" button under the record player
    Begin,
    /// Tear the finished letter off the typewriter
    Tear,
    /// Click/tap on a shooting star at pointer position
    CollectStar { id: u32, x: f32, y: f32 },
    /// Click the grown constellation tree
    ClickTree,
    /// Pointer/touch sample over the scratch card
    Scratch(PointerSample),
    /// The scratch surface was resized
    Resize { width: u32, height: u32 },
}

/// Something the shell must do on the core's behalf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    /// Start background music
    PlayMusic {
        src: &'static str,
        title: &'static str,
        looping: bool,
        volume: f32,
    },
    /// A new scene is live
    SceneChanged(Scene),
}

/// Live state of the current scene
#[derive(Debug, Clone)]
pub enum SceneState {
    Intro(Turntable),
    Letter(Typewriter),
    Collection(Rooftop),
    Finale(ScratchCard),
}

impl SceneState {
    pub fn scene(&self) -> Scene {
        match self {
            SceneState::Intro(_) => Scene::Intro,
            SceneState::Letter(_) => Scene::Letter,
            SceneState::Collection(_) => Scene::Collection,
            SceneState::Finale(_) => Scene::Finale,
        }
    }

    /// Cancel the scene's pending timers
    fn teardown(&mut self) -> usize {
        match self {
            SceneState::Intro(s) => s.teardown(),
            SceneState::Letter(s) => s.teardown(),
            SceneState::Collection(s) => s.teardown(),
            SceneState::Finale(_) => 0,
        }
    }
}

/// Per-scene view data
#[derive(Debug, Clone, Serialize)]
pub enum SceneView {
    Intro(TurntableSnapshot),
    Letter(TypewriterSnapshot),
    Collection(RooftopSnapshot),
    Finale(ScratchSnapshot),
}

/// Immutable view of the whole experience for rendering
#[derive(Debug, Clone, Serialize)]
pub struct ExperienceSnapshot {
    pub scene: Scene,
    pub selection: Option<&'static MusicDisc>,
    pub view: SceneView,
}

/// The whole session
#[derive(Debug, Clone)]
pub struct Experience {
    seed: u64,
    rng: Pcg32,
    controller: SceneController,
    selection: Option<&'static MusicDisc>,
    state: SceneState,
    /// Last known scratch surface size, used when the finale starts
    surface: (u32, u32),
}

impl Experience {
    /// Start a session with a seeded random source
    pub fn new(seed: u64) -> Self {
        Self::with_rng(seed, Pcg32::seed_from_u64(seed))
    }

    pub fn with_rng(seed: u64, rng: Pcg32) -> Self {
        Self {
            seed,
            rng,
            controller: SceneController::new(),
            selection: None,
            state: SceneState::Intro(Turntable::new()),
            surface: (0, 0),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scene(&self) -> Scene {
        self.controller.current()
    }

    pub fn selection(&self) -> Option<&'static MusicDisc> {
        self.selection
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Handle one user input at `now_ms`
    ///
    /// Timers due by `now_ms` fire first, so the input sees the same state a
    /// frame tick at `now_ms` would have produced.
    pub fn handle(&mut self, input: Input, now_ms: u64) -> Vec<Effect> {
        let mut effects = self.tick(now_ms);

        if let Input::Resize { width, height } = input {
            self.surface = (width, height);
            if let SceneState::Finale(card) = &mut self.state {
                card.resize(width, height);
            }
            return effects;
        }

        let advance = match (&mut self.state, input) {
            (SceneState::Intro(tt), Input::PlaceDisc { disc_id }) => {
                tt.place_disc(now_ms, &disc_id);
                false
            }
            (SceneState::Intro(tt), Input::DragOver(over)) => {
                tt.set_dragging_over(over);
                false
            }
            (SceneState::Intro(tt), Input::ChangeRecord) => {
                tt.change_record();
                false
            }
            (SceneState::Intro(tt), Input::Begin) => tt.begin(),
            (SceneState::Letter(tw), Input::Tear) => {
                tw.tear(now_ms);
                false
            }
            (SceneState::Collection(roof), Input::CollectStar { id, x, y }) => {
                roof.collect(now_ms, id, Vec2::new(x, y));
                false
            }
            (SceneState::Collection(roof), Input::ClickTree) => roof.click_tree(),
            (SceneState::Finale(card), Input::Scratch(sample)) => {
                card.scratch(sample);
                false
            }
            (state, input) => {
                log::debug!("Ignoring {:?} in {:?}", input, state.scene());
                false
            }
        };

        if advance {
            self.advance(now_ms, &mut effects);
        }
        effects
    }

    /// Fire due timers in the live scene
    pub fn tick(&mut self, now_ms: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        let advance = match &mut self.state {
            SceneState::Intro(tt) => {
                if let Some(disc) = tt.tick(now_ms) {
                    self.selection = Some(disc);
                    log::info!("Now playing: {}", disc.title);
                    effects.push(Effect::PlayMusic {
                        src: disc.src,
                        title: disc.title,
                        looping: true,
                        volume: MUSIC_VOLUME,
                    });
                }
                false
            }
            SceneState::Letter(tw) => tw.tick(now_ms, &mut self.rng),
            SceneState::Collection(roof) => {
                roof.tick(now_ms, &mut self.rng);
                false
            }
            SceneState::Finale(_) => false,
        };

        if advance {
            self.advance(now_ms, &mut effects);
        }
        effects
    }

    fn advance(&mut self, now_ms: u64, effects: &mut Vec<Effect>) {
        let Some(next) = self.controller.current().next() else {
            return;
        };
        if !self.controller.advance_to(next) {
            return;
        }

        let cancelled = self.state.teardown();
        log::debug!(
            "Tore down {:?}, cancelled {} timers",
            self.state.scene(),
            cancelled
        );

        self.state = match next {
            Scene::Intro => SceneState::Intro(Turntable::new()),
            Scene::Letter => SceneState::Letter(Typewriter::new(now_ms, LETTER_TEXT)),
            Scene::Collection => SceneState::Collection(Rooftop::new(now_ms, &mut self.rng)),
            Scene::Finale => SceneState::Finale(ScratchCard::new(self.surface.0, self.surface.1)),
        };
        effects.push(Effect::SceneChanged(next));
    }

    /// Replay is offered only once the scratch card is revealed
    pub fn can_replay(&self) -> bool {
        matches!(&self.state, SceneState::Finale(card) if card.is_revealed())
    }

    pub fn snapshot(&self) -> ExperienceSnapshot {
        let view = match &self.state {
            SceneState::Intro(s) => SceneView::Intro(s.snapshot()),
            SceneState::Letter(s) => SceneView::Letter(s.snapshot()),
            SceneState::Collection(s) => SceneView::Collection(s.snapshot()),
            SceneState::Finale(s) => SceneView::Finale(s.snapshot()),
        };
        ExperienceSnapshot {
            scene: self.scene(),
            selection: self.selection,
            view,
        }
    }
}
