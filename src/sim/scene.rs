//! Scene sequence and the forward-only controller

use serde::{Deserialize, Serialize};

/// One full-screen stage of the experience, in playing order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Scene {
    /// Record player: pick the music
    #[default]
    Intro,
    /// Typewriter letter
    Letter,
    /// Rooftop star collecting
    Collection,
    /// Scratch-card reveal
    Finale,
}

impl Scene {
    pub const ALL: [Scene; 4] = [Scene::Intro, Scene::Letter, Scene::Collection, Scene::Finale];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The scene that follows this one, `None` for the finale
    pub fn next(self) -> Option<Scene> {
        match self {
            Scene::Intro => Some(Scene::Letter),
            Scene::Letter => Some(Scene::Collection),
            Scene::Collection => Some(Scene::Finale),
            Scene::Finale => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// DOM id of the scene container
    pub fn element_id(self) -> &'static str {
        match self {
            Scene::Intro => "scene-intro",
            Scene::Letter => "scene-letter",
            Scene::Collection => "scene-collection",
            Scene::Finale => "scene-finale",
        }
    }
}

/// Holds the current scene. Only ever moves one step forward.
#[derive(Debug, Clone, Default)]
pub struct SceneController {
    current: Scene,
}

impl SceneController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Scene {
        self.current
    }

    /// Move to `next` if it is exactly the following scene.
    ///
    /// Returns whether the scene changed. Backward, repeated and skipping
    /// requests leave the controller untouched.
    pub fn advance_to(&mut self, next: Scene) -> bool {
        if self.current.next() != Some(next) {
            log::warn!(
                "Ignoring scene request {:?} while in {:?}",
                next,
                self.current
            );
            return false;
        }
        log::info!("Scene {:?} -> {:?}", self.current, next);
        self.current = next;
        true
    }
}
