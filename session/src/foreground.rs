//! Closed set of foreground games a session can host.

use std::time::Duration;

use vision_drill_core::{AnimationMode, ColorTheme, Command, GameId, GameSnapshot, StagePoint};
use vision_drill_rendering::{NodeId, Scene, SceneError};
use vision_drill_system_rotation_digital::{RotationDigital, TapOutcome};

/// Foreground game bound to the foreground layer.
#[derive(Debug)]
pub enum ForegroundLayer {
    /// Tap the numbered ring cells in ascending order.
    RotationDigital(RotationDigital),
}

impl ForegroundLayer {
    /// Creates the layer implementing `game`.
    #[must_use]
    pub fn for_game(game: GameId, mode: AnimationMode, seed: u64) -> Self {
        match game {
            GameId::RotationDigital => Self::RotationDigital(RotationDigital::new(mode, seed)),
        }
    }

    /// Rebuilds the play objects for the current level and speed.
    pub fn build(
        &mut self,
        scene: &mut Scene,
        snapshot: &GameSnapshot,
        theme: &ColorTheme,
    ) -> Result<(), SceneError> {
        match self {
            Self::RotationDigital(game) => game.build(scene, snapshot.level, snapshot.speed, theme),
        }
    }

    /// Starts the foreground animation from rest.
    pub fn animate(&mut self) {
        match self {
            Self::RotationDigital(game) => game.animate(),
        }
    }

    /// Continues the foreground animation after a pause.
    pub fn resume_animate(&mut self) {
        match self {
            Self::RotationDigital(game) => game.resume_animate(),
        }
    }

    /// Stops the foreground animation.
    pub fn stop_animate(&mut self) -> bool {
        match self {
            Self::RotationDigital(game) => game.stop_animate(),
        }
    }

    /// Stops animating and releases every play object.
    pub fn clear(&mut self, scene: &mut Scene) {
        match self {
            Self::RotationDigital(game) => game.clear(scene),
        }
    }

    /// Advances the foreground animation.
    pub fn tick(&mut self, scene: &mut Scene, dt: Duration) {
        match self {
            Self::RotationDigital(game) => game.tick(scene, dt),
        }
    }

    /// Routes a tap that landed on `node`.
    pub fn on_tap(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        at: StagePoint,
        level: u32,
        out: &mut Vec<Command>,
    ) -> TapOutcome {
        match self {
            Self::RotationDigital(game) => game.on_tap(scene, node, at, level, out),
        }
    }

    /// Reports whether the current round is complete.
    pub fn check_round_complete(&mut self) -> bool {
        match self {
            Self::RotationDigital(game) => game.check_round_complete(),
        }
    }

    /// Group holding every play object.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        match self {
            Self::RotationDigital(game) => game.root(),
        }
    }

    /// Reports whether the foreground is animating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        match self {
            Self::RotationDigital(game) => game.is_animating(),
        }
    }

    /// Dims or restores the foreground and toggles its input.
    pub fn set_dimmed(&self, scene: &mut Scene, opacity: f32, listening: bool) -> Result<(), SceneError> {
        match self {
            Self::RotationDigital(game) => {
                game.set_opacity(scene, opacity)?;
                game.set_listening(scene, listening)
            }
        }
    }
}
