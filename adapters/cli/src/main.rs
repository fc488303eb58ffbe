#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that launches a Vision Drill round.

mod settings_store;

use std::{
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use vision_drill_core::{
    AudioCue, BackgroundSelector, GameId, RoundSetup, StyleSelector, ThemeSelector,
    DEFAULT_MAX_LEVEL, DEFAULT_MAX_SPEED,
};
use vision_drill_rendering::{Color, FrameInput, Presentation, RenderingBackend};
use vision_drill_rendering_macroquad::MacroquadBackend;
use vision_drill_session::{AudioSink, GameConfig, Session, SessionContext, SessionPhase};

use self::settings_store::TomlFileStore;

const HEADLESS_FRAME: Duration = Duration::from_millis(16);
const HEADLESS_GRACE_SECS: u64 = 60;

#[derive(Debug, Parser)]
#[command(name = "vision-drill")]
#[command(about = "Timed visual discrimination drills")]
struct Cli {
    /// Game to play.
    #[arg(long, default_value = "rotationDigital")]
    game: GameId,
    /// Round length in seconds. Defaults to the game's catalog time.
    #[arg(long)]
    time: Option<u32>,
    /// Highest reachable level.
    #[arg(long, default_value_t = DEFAULT_MAX_LEVEL, value_parser = clap::value_parser!(u32).range(1..))]
    max_level: u32,
    /// Highest reachable speed.
    #[arg(long, default_value_t = DEFAULT_MAX_SPEED)]
    max_speed: u32,
    /// Background: none, random, radial, grid or grating.
    #[arg(long, default_value = "random")]
    background: BackgroundSelector,
    /// Background animation style, or random.
    #[arg(long, default_value = "random")]
    style: StyleSelector,
    /// Color theme name, or random.
    #[arg(long, default_value = "random")]
    theme: ThemeSelector,
    /// Seed for every random choice of the round.
    #[arg(long)]
    seed: Option<u64>,
    /// Settings and daily totals file.
    #[arg(long, default_value = "vision-drill.toml")]
    settings: PathBuf,
    /// Stage width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,
    /// Stage height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Log frames per second once per second.
    #[arg(long)]
    show_fps: bool,
    /// Disable vertical sync.
    #[arg(long)]
    no_vsync: bool,
    /// Play the round without a window or input and exit once totals are saved.
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn round_setup(&self) -> RoundSetup {
        let mut setup = RoundSetup::for_game(self.game);
        if let Some(time) = self.time {
            setup.time_secs = time;
        }
        setup.max_level = self.max_level;
        setup.max_speed = self.max_speed;
        setup.background = self.background;
        setup.style = self.style;
        setup.theme = self.theme.clone();
        setup
    }
}

/// Audio sink that reports cues through the log.
#[derive(Debug, Default)]
struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: AudioCue) {
        info!("sound: {}", cue.name());
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn run_headless(mut session: Session, time_secs: u32) -> Result<()> {
    let budget = Duration::from_secs(u64::from(time_secs) + HEADLESS_GRACE_SECS);
    let mut elapsed = Duration::ZERO;
    while session.phase() != SessionPhase::Finished {
        if elapsed > budget {
            bail!("round did not finish within {}s", budget.as_secs());
        }
        session
            .advance(HEADLESS_FRAME, FrameInput::default())
            .context("headless frame failed")?;
        elapsed += HEADLESS_FRAME;
    }
    let snapshot = session.snapshot();
    let bonus = session.reward().map_or(0, |reward| reward.bonus());
    info!(
        "headless round finished: score={} bonus={} level={} speed={}",
        snapshot.score, bonus, snapshot.level, snapshot.speed
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let store = TomlFileStore::open(&cli.settings)?;
    info!("settings loaded from {}", store.path().display());
    let context = SessionContext::new(store, LogAudio);
    let mut session = Session::init_canvas(cli.width as f32, cli.height as f32, context)
        .context("failed to build the stage")?;

    let setup = cli.round_setup();
    let time_secs = setup.time_secs;
    let seed = cli.seed.unwrap_or_else(clock_seed);
    info!("starting {} with seed {seed}", cli.game.descriptor().name);
    session
        .set_game(GameConfig::new(setup, seed))
        .context("failed to start the round")?;

    if cli.headless {
        return run_headless(session, time_secs);
    }

    let presentation = Presentation::new(
        format!("Vision Drill - {}", cli.game.descriptor().name),
        Color::from_rgb_u8(0, 0, 0),
        cli.width,
        cli.height,
    );
    let backend = MacroquadBackend::new()
        .with_vsync(!cli.no_vsync)
        .with_show_fps(cli.show_fps);
    backend.run(presentation, session)
}
