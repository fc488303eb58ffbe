#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session controller.
//!
//! A [`Session`] owns the scene, the authoritative [`GameState`] and every
//! layer system. Each frame it routes taps, ticks the countdown and the layer
//! animations, and turns finished tweens into the next step of the round:
//! score label faded, progression computed, overlay revealed, reward counted.

mod context;
mod foreground;
mod hud;

use std::time::Duration;

use glam::Vec2;
use log::{debug, error, info};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use vision_drill_core::{
    AudioCue, BackgroundKind, BackgroundSelector, ColorTheme, Command, Event, GameId,
    GameSnapshot, RoundSetup, Setting, StagePoint,
};
use vision_drill_rendering::{
    Easing, FrameDirective, FrameInput, FrameSource, LayerId, Scene, SceneError, TweenTarget,
    Tweens,
};
use vision_drill_system_background::{BackgroundConfig, BackgroundLayer};
use vision_drill_system_countdown::{Config as CountdownConfig, Countdown, CountdownTick};
use vision_drill_system_progression::Progression;
use vision_drill_system_reward::{RewardReveal, RewardStep};
use vision_drill_system_rotation_digital::TapOutcome;
use vision_drill_world::{self as world, query, GameState};

pub use context::{AudioSink, MemoryStore, SessionContext, SilentAudio, Store, StoreError};
pub use foreground::ForegroundLayer;
pub use hud::{Hud, ScoreOverlay};

const SCORE_FADE: Duration = Duration::from_secs(1);
const PANEL_SLIDE: Duration = Duration::from_secs(1);
const OVERLAY_FADE: Duration = Duration::from_secs(1);
const DIMMED_BACKGROUND: f32 = 0.1;
const DIMMED_FOREGROUND: f32 = 0.3;

/// Parameters of a round handed to [`Session::set_game`].
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Game, time, caps and selectors fixed for the round.
    pub setup: RoundSetup,
    /// Seed for every random choice made during the round.
    pub seed: u64,
}

impl GameConfig {
    /// Creates a round configuration.
    #[must_use]
    pub fn new(setup: RoundSetup, seed: u64) -> Self {
        Self { setup, seed }
    }
}

/// Failures raised while driving a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A scene node owned by the session was missing or of the wrong kind.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Lifecycle of the current round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No round is being played.
    Idle,
    /// The countdown is ticking and taps reach the foreground.
    Running,
    /// Animations and the countdown are frozen.
    Paused,
    /// The score card is fading in.
    Revealing,
    /// The bonus counter is climbing.
    Rewarding,
    /// Totals are persisted and the back control is live.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TweenTag {
    ScoreLabelFaded,
    PanelSlid,
    OverlayRevealed,
    OverlayDismissed,
}

/// Controller running rounds on a scene.
#[derive(Debug)]
pub struct Session {
    context: SessionContext,
    scene: Scene,
    rng: ChaCha8Rng,
    state: GameState,
    theme: Option<ColorTheme>,
    background: Option<BackgroundLayer>,
    foreground: Option<ForegroundLayer>,
    hud: Hud,
    overlay: ScoreOverlay,
    tweens: Tweens<TweenTag>,
    countdown: Countdown,
    progression: Progression,
    reward: Option<RewardReveal>,
    phase: SessionPhase,
    panel_expanded: bool,
    exit_requested: bool,
    layer_builds: u32,
}

impl Session {
    /// Creates the stage with its four layers and the HUD.
    pub fn init_canvas(
        width: f32,
        height: f32,
        context: SessionContext,
    ) -> Result<Self, SessionError> {
        let mut scene = Scene::new(width, height);
        let hud = Hud::build(&mut scene)?;
        let overlay = ScoreOverlay::build(&mut scene)?;
        debug!("canvas initialised: {width}x{height}");
        Ok(Self {
            context,
            scene,
            rng: ChaCha8Rng::seed_from_u64(0),
            state: GameState::new(RoundSetup::for_game(GameId::RotationDigital)),
            theme: None,
            background: None,
            foreground: None,
            hud,
            overlay,
            tweens: Tweens::new(),
            countdown: Countdown::new(CountdownConfig::default()),
            progression: Progression,
            reward: None,
            phase: SessionPhase::Idle,
            panel_expanded: true,
            exit_requested: false,
            layer_builds: 0,
        })
    }

    /// Starts a fresh round: builds both layers and starts the countdown.
    pub fn set_game(&mut self, config: GameConfig) -> Result<(), SessionError> {
        self.teardown_layers();
        self.tweens.clear();
        self.overlay.reset(&mut self.scene)?;
        self.scene.set_layer_visible(LayerId::Control, true);
        self.scene.attrs_mut(self.hud.panel())?.position.x = self.hud.expanded_x();
        self.panel_expanded = true;
        self.reward = None;
        self.exit_requested = false;
        self.rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut events = Vec::new();
        world::apply(
            &mut self.state,
            Command::ConfigureRound {
                setup: config.setup,
            },
            &mut events,
        );
        self.dispatch(events)?;

        let settings = self.context.store().settings().clone();
        let theme = self
            .context
            .themes()
            .resolve_or_default(query::theme(&self.state), &mut self.rng);
        let kind = self.background_kind(settings.debug);
        self.background = match kind {
            Some(kind) => Some(BackgroundLayer::new(
                kind,
                BackgroundConfig::default(),
                settings.anim,
                self.rng.gen(),
            )),
            None => None,
        };
        self.foreground = Some(ForegroundLayer::for_game(
            query::game(&self.state),
            settings.anim,
            self.rng.gen(),
        ));
        info!(
            "round started: game={} theme={} background={:?} anim={:?}",
            query::game(&self.state),
            theme.name(),
            kind,
            settings.anim
        );
        self.theme = Some(theme);
        self.render()?;

        self.countdown.start(query::time_secs(&self.state));
        self.refresh_hud()?;
        self.phase = SessionPhase::Running;
        Ok(())
    }

    /// Advances the session by one frame.
    pub fn advance(&mut self, dt: Duration, input: FrameInput) -> Result<(), SessionError> {
        if input.pause_toggle {
            self.pause_game()?;
        }
        if let Some(point) = input.tap {
            self.tap(point)?;
        }
        if self.phase == SessionPhase::Paused {
            return Ok(());
        }

        let builds = self.layer_builds;
        for tag in self.tweens.advance(&mut self.scene, dt) {
            self.on_tween_finished(tag)?;
        }
        let mut ticks = Vec::new();
        self.countdown.advance(dt, &mut ticks);
        for tick in ticks {
            match tick {
                CountdownTick::Display { remaining } => {
                    self.scene
                        .set_text(self.hud.time_text(), remaining.to_string())?;
                }
                CountdownTick::Expired => self.game_over()?,
            }
        }

        // Layers rebuilt this frame start from rest.
        if self.layer_builds == builds {
            if let Some(background) = self.background.as_mut() {
                background.tick(&mut self.scene, dt);
            }
            if let Some(foreground) = self.foreground.as_mut() {
                foreground.tick(&mut self.scene, dt);
            }
        }
        if self.phase == SessionPhase::Rewarding {
            self.step_reward()?;
        }
        Ok(())
    }

    /// Toggles between running and paused.
    ///
    /// Pausing stops both layer animations and the countdown and dims the
    /// layers; resuming restores them. Other phases ignore the toggle.
    pub fn pause_game(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Running => {
                let _ = self.countdown.stop();
                self.dim_layers()?;
                self.phase = SessionPhase::Paused;
                info!("round paused with {}s left", self.countdown.remaining());
            }
            SessionPhase::Paused => {
                if let Some(background) = self.background.as_mut() {
                    background.set_opacity(&mut self.scene, 1.0)?;
                    background.start();
                }
                if let Some(foreground) = self.foreground.as_mut() {
                    foreground.set_dimmed(&mut self.scene, 1.0, true)?;
                    foreground.resume_animate();
                }
                self.countdown.resume();
                self.phase = SessionPhase::Running;
                info!("round resumed");
            }
            other => debug!("pause toggle ignored while {other:?}"),
        }
        Ok(())
    }

    /// Ends the round and starts revealing the score card.
    pub fn game_over(&mut self) -> Result<(), SessionError> {
        if !matches!(self.phase, SessionPhase::Running | SessionPhase::Paused) {
            return Ok(());
        }
        let _ = self.countdown.stop();
        let mut events = Vec::new();
        world::apply(
            &mut self.state,
            Command::MarkFinished { finished: true },
            &mut events,
        );
        self.dispatch(events)?;
        self.context.play(AudioCue::Victory);
        self.dim_layers()?;
        self.scene.set_layer_visible(LayerId::Control, false);

        let group = self.overlay.group();
        self.scene.attrs_mut(group)?.visible = true;
        self.tweens.play(
            &self.scene,
            group,
            TweenTarget::opacity(1.0),
            OVERLAY_FADE,
            Easing::EaseIn,
            TweenTag::OverlayRevealed,
        )?;
        self.phase = SessionPhase::Revealing;
        info!("game over: score={}", query::score(&self.state));
        Ok(())
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Scene drawn by the backend.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Snapshot of the round state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        query::snapshot(&self.state)
    }

    /// Injected collaborators.
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Control panel nodes.
    #[must_use]
    pub const fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Score label and score card nodes.
    #[must_use]
    pub const fn overlay(&self) -> &ScoreOverlay {
        &self.overlay
    }

    /// Foreground game of the current round.
    #[must_use]
    pub const fn foreground(&self) -> Option<&ForegroundLayer> {
        self.foreground.as_ref()
    }

    /// Background layer of the current round, absent for `none`.
    #[must_use]
    pub const fn background(&self) -> Option<&BackgroundLayer> {
        self.background.as_ref()
    }

    /// Bonus counter, present once the score card is revealed.
    #[must_use]
    pub const fn reward(&self) -> Option<&RewardReveal> {
        self.reward.as_ref()
    }

    /// Whether the control panel is expanded.
    #[must_use]
    pub const fn is_panel_expanded(&self) -> bool {
        self.panel_expanded
    }

    /// Whether the player dismissed the score card.
    #[must_use]
    pub const fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Number of times both layers were built.
    #[must_use]
    pub const fn layer_builds(&self) -> u32 {
        self.layer_builds
    }

    /// Seconds the countdown will display next.
    #[must_use]
    pub fn remaining_time(&self) -> u32 {
        self.countdown.remaining()
    }

    fn background_kind(&mut self, debug: bool) -> Option<BackgroundKind> {
        if debug {
            return Some(BackgroundKind::Radial);
        }
        match query::background(&self.state) {
            BackgroundSelector::None => None,
            BackgroundSelector::Random => BackgroundKind::ALL.choose(&mut self.rng).copied(),
            BackgroundSelector::Kind(kind) => Some(kind),
        }
    }

    fn render(&mut self) -> Result<(), SessionError> {
        let Some(theme) = self.theme.as_ref() else {
            return Ok(());
        };
        let snapshot = query::snapshot(&self.state);
        if let Some(background) = self.background.as_mut() {
            background.build(
                &mut self.scene,
                snapshot.level,
                snapshot.speed,
                theme,
                query::style(&self.state),
            )?;
        }
        if let Some(foreground) = self.foreground.as_mut() {
            foreground.build(&mut self.scene, &snapshot, theme)?;
        }
        self.layer_builds += 1;
        debug!(
            "layers built: level={} speed={} builds={}",
            snapshot.level, snapshot.speed, self.layer_builds
        );
        Ok(())
    }

    fn teardown_layers(&mut self) {
        let _ = self.countdown.stop();
        if let Some(mut background) = self.background.take() {
            background.teardown(&mut self.scene);
        }
        if let Some(mut foreground) = self.foreground.take() {
            foreground.clear(&mut self.scene);
        }
    }

    fn dim_layers(&mut self) -> Result<(), SessionError> {
        if let Some(background) = self.background.as_mut() {
            let _ = background.stop();
            background.set_opacity(&mut self.scene, DIMMED_BACKGROUND)?;
        }
        if let Some(foreground) = self.foreground.as_mut() {
            let _ = foreground.stop_animate();
            foreground.set_dimmed(&mut self.scene, DIMMED_FOREGROUND, false)?;
        }
        Ok(())
    }

    fn today_score(&self) -> u64 {
        self.context.store().settings().today_score
    }

    fn refresh_hud(&mut self) -> Result<(), SessionError> {
        let snapshot = query::snapshot(&self.state);
        let total = self.today_score() + u64::from(snapshot.score);
        self.scene
            .set_text(self.hud.time_text(), snapshot.time_secs.to_string())?;
        self.scene
            .set_text(self.hud.score_text(), format!("Score: {}", snapshot.score))?;
        self.scene
            .set_text(self.hud.total_text(), format!("Total: {total}"))?;
        let lines = snapshot.game.descriptor().instructions;
        for (node, line) in self.hud.instructions().into_iter().zip(lines) {
            self.scene.set_text(node, line)?;
        }
        Ok(())
    }

    fn tap(&mut self, point: Vec2) -> Result<(), SessionError> {
        let Some(node) = self.scene.hit_test(point) else {
            return Ok(());
        };
        if self.scene.is_within(node, self.hud.grab()) {
            return self.toggle_panel();
        }
        if self.scene.is_within(node, self.overlay.back()) {
            if self.phase == SessionPhase::Finished {
                self.dismiss_overlay()?;
            }
            return Ok(());
        }
        if self.phase != SessionPhase::Running {
            return Ok(());
        }
        let Some(foreground) = self.foreground.as_mut() else {
            return Ok(());
        };

        let level = query::level(&self.state);
        let mut commands = Vec::new();
        let outcome = foreground.on_tap(
            &mut self.scene,
            node,
            StagePoint::new(point.x, point.y),
            level,
            &mut commands,
        );
        match outcome {
            TapOutcome::Correct { win_score } => {
                debug!("correct tap worth {win_score}");
                self.context.play(AudioCue::Success);
            }
            TapOutcome::Wrong => self.context.play(AudioCue::Wrong),
            TapOutcome::Ignored => {}
        }
        self.apply_commands(commands)
    }

    fn toggle_panel(&mut self) -> Result<(), SessionError> {
        self.context.play(AudioCue::Click);
        self.panel_expanded = !self.panel_expanded;
        let (x, easing) = if self.panel_expanded {
            (self.hud.expanded_x(), Easing::EaseOut)
        } else {
            (self.hud.collapsed_x(), Easing::EaseIn)
        };
        self.tweens.play(
            &self.scene,
            self.hud.panel(),
            TweenTarget::x(x),
            PANEL_SLIDE,
            easing,
            TweenTag::PanelSlid,
        )?;
        Ok(())
    }

    fn apply_commands(&mut self, commands: Vec<Command>) -> Result<(), SessionError> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.state, command, &mut events);
        }
        self.dispatch(events)
    }

    fn dispatch(&mut self, events: Vec<Event>) -> Result<(), SessionError> {
        let mut rebuild = false;
        for event in events {
            match event {
                Event::RoundConfigured { game, time_secs } => {
                    info!("round configured: game={game} time={time_secs}s");
                }
                Event::ScoreChanged {
                    score,
                    win_score,
                    at,
                } => self.show_score(score, win_score, at)?,
                Event::LevelChanged { level } => {
                    debug!("level changed to {level}");
                    rebuild = true;
                }
                Event::SpeedChanged { speed } => {
                    debug!("speed changed to {speed}");
                    rebuild = true;
                }
                Event::FinishedChanged { finished } => {
                    info!("round finished flag is now {finished}");
                }
            }
        }
        if rebuild {
            self.render()?;
        }
        Ok(())
    }

    fn show_score(&mut self, score: u32, win_score: u32, at: StagePoint) -> Result<(), SessionError> {
        let total = self.today_score() + u64::from(score);
        self.scene
            .set_text(self.hud.score_text(), format!("Score: {score}"))?;
        self.scene
            .set_text(self.hud.total_text(), format!("Total: {total}"))?;

        let label = self.overlay.label();
        self.scene.set_text(label, format!("+{win_score}"))?;
        let attrs = self.scene.attrs_mut(label)?;
        attrs.position = Vec2::new(at.x, at.y);
        attrs.visible = true;
        attrs.opacity = 1.0;
        self.tweens.play(
            &self.scene,
            label,
            TweenTarget::opacity(0.0),
            SCORE_FADE,
            Easing::EaseOut,
            TweenTag::ScoreLabelFaded,
        )?;
        Ok(())
    }

    fn on_tween_finished(&mut self, tag: TweenTag) -> Result<(), SessionError> {
        match tag {
            TweenTag::ScoreLabelFaded => self.on_score_label_faded(),
            TweenTag::PanelSlid => Ok(()),
            TweenTag::OverlayRevealed => self.begin_reward(),
            TweenTag::OverlayDismissed => self.on_overlay_dismissed(),
        }
    }

    fn on_score_label_faded(&mut self) -> Result<(), SessionError> {
        self.scene.attrs_mut(self.overlay.label())?.visible = false;
        if self.phase != SessionPhase::Running {
            return Ok(());
        }
        let Some(foreground) = self.foreground.as_mut() else {
            return Ok(());
        };
        let complete = foreground.check_round_complete();
        let mut commands = Vec::new();
        self.progression
            .handle(complete, &query::snapshot(&self.state), &mut commands);
        if complete {
            info!("round complete at level {}", query::level(&self.state));
        }
        self.apply_commands(commands)
    }

    fn begin_reward(&mut self) -> Result<(), SessionError> {
        let score = query::score(&self.state);
        let total = self.today_score() + u64::from(score);
        self.scene
            .set_text(self.overlay.base_text(), format!("Win score: {score}"))?;
        self.scene
            .set_text(self.overlay.award_text(), "Award score: 0")?;
        self.scene
            .set_text(self.overlay.total_text(), format!("Total score: {total}"))?;
        self.reward = Some(RewardReveal::new(score, self.rng.gen()));
        self.phase = SessionPhase::Rewarding;
        Ok(())
    }

    fn step_reward(&mut self) -> Result<(), SessionError> {
        let Some(reward) = self.reward.as_mut() else {
            return Ok(());
        };
        let base = reward.base_score();
        let (bonus, finished) = match reward.step() {
            RewardStep::Running { bonus } => (bonus, false),
            RewardStep::Finished { bonus } => (bonus, true),
        };
        let total = self.today_score() + u64::from(base) + u64::from(bonus);
        self.scene
            .set_text(self.overlay.award_text(), format!("Award score: {bonus}"))?;
        self.scene
            .set_text(self.overlay.total_text(), format!("Total score: {total}"))?;
        if finished {
            self.finish_reward(base, bonus)?;
        }
        Ok(())
    }

    fn finish_reward(&mut self, base: u32, bonus: u32) -> Result<(), SessionError> {
        let back = self.scene.attrs_mut(self.overlay.back())?;
        back.opacity = 1.0;
        back.listening = true;

        let settings = self.context.store().settings();
        let today_score = settings.today_score + u64::from(base) + u64::from(bonus);
        let today_time = settings.today_time + u64::from(query::time_secs(&self.state));
        let patch = [
            Setting::TodayScore(today_score),
            Setting::TodayTime(today_time),
        ];
        match self.context.store_mut().save(&patch) {
            Ok(()) => info!("daily totals saved: score={today_score} time={today_time}s"),
            Err(error) => error!("daily totals were not saved: {error}"),
        }
        self.phase = SessionPhase::Finished;
        Ok(())
    }

    fn dismiss_overlay(&mut self) -> Result<(), SessionError> {
        self.context.play(AudioCue::SoftClick);
        self.scene.attrs_mut(self.overlay.back())?.listening = false;
        self.tweens.play(
            &self.scene,
            self.overlay.group(),
            TweenTarget::opacity(0.0),
            OVERLAY_FADE,
            Easing::EaseOut,
            TweenTag::OverlayDismissed,
        )?;
        Ok(())
    }

    fn on_overlay_dismissed(&mut self) -> Result<(), SessionError> {
        self.overlay.reset(&mut self.scene)?;
        self.scene.set_layer_visible(LayerId::Control, true);
        self.phase = SessionPhase::Idle;
        self.exit_requested = true;
        info!("score card dismissed");
        Ok(())
    }
}

impl FrameSource for Session {
    fn update(&mut self, dt: Duration, input: FrameInput) -> FrameDirective {
        if let Err(error) = self.advance(dt, input) {
            error!("session frame failed: {error}");
        }
        if self.exit_requested {
            FrameDirective::Exit
        } else {
            FrameDirective::Continue
        }
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }
}
