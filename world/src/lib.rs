#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for Vision Drill.
//!
//! The state is mutated exclusively through [`apply`]. Every mutation writes
//! all affected fields first and only then pushes the corresponding events, so
//! listeners that read several fields observe a consistent snapshot.

use log::debug;
use vision_drill_core::{
    BackgroundSelector, Command, Event, GameId, RoundSetup, StagePoint, StyleSelector,
    ThemeSelector,
};

const FIRST_LEVEL: u32 = 1;
const FIRST_SPEED: u32 = 0;

/// Represents the authoritative state of a single play-through.
#[derive(Debug)]
pub struct GameState {
    game: GameId,
    score: u32,
    level: u32,
    speed: u32,
    max_level: u32,
    max_speed: u32,
    background: BackgroundSelector,
    style: StyleSelector,
    theme: ThemeSelector,
    time_secs: u32,
    is_finished: bool,
    win_score: u32,
    pointer: StagePoint,
}

impl GameState {
    /// Creates a state configured for the provided round.
    #[must_use]
    pub fn new(setup: RoundSetup) -> Self {
        let mut state = Self {
            game: setup.game,
            score: 0,
            level: FIRST_LEVEL,
            speed: FIRST_SPEED,
            max_level: FIRST_LEVEL,
            max_speed: FIRST_SPEED,
            background: BackgroundSelector::default(),
            style: StyleSelector::default(),
            theme: ThemeSelector::default(),
            time_secs: 0,
            is_finished: false,
            win_score: 0,
            pointer: StagePoint::default(),
        };
        state.reset(setup);
        state
    }

    fn reset(&mut self, setup: RoundSetup) {
        let RoundSetup {
            game,
            time_secs,
            max_level,
            max_speed,
            background,
            style,
            theme,
        } = setup;
        self.game = game;
        self.time_secs = time_secs;
        self.max_level = max_level.max(FIRST_LEVEL);
        self.max_speed = max_speed;
        self.background = background;
        self.style = style;
        self.theme = theme;
        self.score = 0;
        self.level = FIRST_LEVEL;
        self.speed = FIRST_SPEED;
        self.is_finished = false;
        self.win_score = 0;
        self.pointer = StagePoint::default();
    }
}

/// Applies the provided command to the state, mutating it deterministically.
pub fn apply(state: &mut GameState, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureRound { setup } => {
            state.reset(setup);
            debug!(
                "round configured: game={} time={}s caps=({}, {})",
                state.game, state.time_secs, state.max_level, state.max_speed
            );
            out_events.push(Event::RoundConfigured {
                game: state.game,
                time_secs: state.time_secs,
            });
        }
        Command::AwardScore { win_score, at } => {
            state.win_score = win_score;
            state.pointer = at;
            state.score = state.score.saturating_add(win_score);
            out_events.push(Event::ScoreChanged {
                score: state.score,
                win_score,
                at,
            });
        }
        Command::SetProgression { level, speed } => {
            let level = level.clamp(FIRST_LEVEL, state.max_level);
            let speed = speed.min(state.max_speed);
            let level_changed = level != state.level;
            let speed_changed = speed != state.speed;
            state.level = level;
            state.speed = speed;

            if level_changed {
                out_events.push(Event::LevelChanged { level });
            }
            if speed_changed {
                out_events.push(Event::SpeedChanged { speed });
            }
        }
        Command::MarkFinished { finished } => {
            if state.is_finished != finished {
                state.is_finished = finished;
                out_events.push(Event::FinishedChanged { finished });
            }
        }
    }
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use super::GameState;
    use vision_drill_core::{
        BackgroundSelector, GameId, GameSnapshot, StagePoint, StyleSelector, ThemeSelector,
    };

    /// Captures an immutable snapshot of the scalar round fields.
    #[must_use]
    pub fn snapshot(state: &GameState) -> GameSnapshot {
        GameSnapshot {
            game: state.game,
            score: state.score,
            level: state.level,
            speed: state.speed,
            max_level: state.max_level,
            max_speed: state.max_speed,
            time_secs: state.time_secs,
        }
    }

    /// Game selected for the round.
    #[must_use]
    pub fn game(state: &GameState) -> GameId {
        state.game
    }

    /// Current score.
    #[must_use]
    pub fn score(state: &GameState) -> u32 {
        state.score
    }

    /// Current level.
    #[must_use]
    pub fn level(state: &GameState) -> u32 {
        state.level
    }

    /// Current speed.
    #[must_use]
    pub fn speed(state: &GameState) -> u32 {
        state.speed
    }

    /// Countdown length in seconds.
    #[must_use]
    pub fn time_secs(state: &GameState) -> u32 {
        state.time_secs
    }

    /// Background variant selection.
    #[must_use]
    pub fn background(state: &GameState) -> BackgroundSelector {
        state.background
    }

    /// Background animation style selection.
    #[must_use]
    pub fn style(state: &GameState) -> StyleSelector {
        state.style
    }

    /// Color theme selection.
    #[must_use]
    pub fn theme(state: &GameState) -> &ThemeSelector {
        &state.theme
    }

    /// Whether the round has been flagged as finished.
    #[must_use]
    pub fn is_finished(state: &GameState) -> bool {
        state.is_finished
    }

    /// Points credited by the most recent correct answer.
    #[must_use]
    pub fn win_score(state: &GameState) -> u32 {
        state.win_score
    }

    /// Anchor recorded by the most recent correct answer.
    #[must_use]
    pub fn pointer(state: &GameState) -> StagePoint {
        state.pointer
    }
}
