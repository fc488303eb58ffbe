#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Vision Drill engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game state, and the pure systems. The session controller
//! submits [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values that the controller reacts to synchronously, in emission order.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default highest level a round may progress to.
pub const DEFAULT_MAX_LEVEL: u32 = 5;

/// Default highest speed a level may progress to before advancing the level.
pub const DEFAULT_MAX_SPEED: u32 = 3;

/// Shortest animation period any background layer may use.
pub const MIN_ANIMATION_PERIOD: Duration = Duration::from_millis(2_000);

/// Computes the background animation period for the provided speed.
///
/// The period shortens by two seconds per speed step starting from ten
/// seconds and never drops below [`MIN_ANIMATION_PERIOD`], including for speeds
/// outside the configured range.
#[must_use]
pub fn animation_period(speed: u32) -> Duration {
    let millis = 1_000_i64 * (10 - 2 * i64::from(speed));
    let floor = MIN_ANIMATION_PERIOD.as_millis() as i64;
    Duration::from_millis(millis.max(floor) as u64)
}

/// Errors raised while validating session configuration values.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The game identifier does not name an implemented game.
    #[error("unknown game '{0}'")]
    UnknownGame(String),
    /// The background selector does not name a background kind.
    #[error("unknown background type '{0}'")]
    UnknownBackground(String),
    /// The animation style selector does not name a style.
    #[error("unknown background animation style '{0}'")]
    UnknownStyle(String),
    /// The animation mode does not name a driver policy.
    #[error("unknown animation mode '{0}'")]
    UnknownAnimationMode(String),
    /// The palette color could not be parsed.
    #[error("unrecognised color '{0}'")]
    UnknownColor(String),
}

/// Games available in the suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameId {
    /// Tap the numbered cells of a rotating hexagon ring in ascending order.
    RotationDigital,
}

impl GameId {
    /// Every game that can be launched.
    pub const ALL: [GameId; 1] = [GameId::RotationDigital];

    /// Stable identifier used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RotationDigital => "rotationDigital",
        }
    }

    /// Static catalog entry describing the game.
    #[must_use]
    pub const fn descriptor(self) -> GameDescriptor {
        match self {
            Self::RotationDigital => GameDescriptor {
                name: "Rotation digital",
                description: "Click the rotating numbers from smallest to largest",
                tag: "Visual discrimination",
                default_time_secs: 30,
                instructions: ["Click the smallest", "digital to start!"],
            },
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameId {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "rotationDigital" | "rotation-digital" | "rotation_digital" => {
                Ok(Self::RotationDigital)
            }
            other => Err(ConfigError::UnknownGame(other.to_owned())),
        }
    }
}

/// Catalog entry presented to players for a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameDescriptor {
    /// Human readable game name.
    pub name: &'static str,
    /// One sentence description of the game.
    pub description: &'static str,
    /// Skill category trained by the game.
    pub tag: &'static str,
    /// Round length used when no explicit time is configured.
    pub default_time_secs: u32,
    /// Two short instruction lines shown in the HUD.
    pub instructions: [&'static str; 2],
}

/// Interchangeable backdrop variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackgroundKind {
    /// Concentric circles or wedges centred on the stage.
    Radial,
    /// Checkerboard tiling.
    Grid,
    /// Tilted stripes.
    Grating,
}

impl BackgroundKind {
    /// Every background kind, in the order used for random picks.
    pub const ALL: [BackgroundKind; 3] = [
        BackgroundKind::Radial,
        BackgroundKind::Grid,
        BackgroundKind::Grating,
    ];
}

/// Background selection stored on the game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BackgroundSelector {
    /// Build no background layer.
    None,
    /// Pick one of [`BackgroundKind::ALL`] whenever the layer is built.
    #[default]
    Random,
    /// Always build the named kind.
    Kind(BackgroundKind),
}

impl FromStr for BackgroundSelector {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "none" => Ok(Self::None),
            "random" => Ok(Self::Random),
            "circle" | "radial" => Ok(Self::Kind(BackgroundKind::Radial)),
            "grid" => Ok(Self::Kind(BackgroundKind::Grid)),
            "grating" => Ok(Self::Kind(BackgroundKind::Grating)),
            other => Err(ConfigError::UnknownBackground(other.to_owned())),
        }
    }
}

/// Animation styles a background layer can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationStyle {
    /// Rotates nodes through a full turn per period.
    Rotate,
    /// Scales nodes as a function of the period phase.
    ScalePulse,
    /// Rotates a single wedge while its opacity flickers.
    OpacityFlicker,
    /// Swaps the two theme fills at a fixed fraction of the period.
    ColorSwap,
    /// Scrolls the whole layer horizontally once per period.
    HorizontalScroll,
}

/// Animation style selection stored on the game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StyleSelector {
    /// Let the layer pick one of its supported styles.
    #[default]
    Random,
    /// Use the named style when the layer supports it.
    Named(AnimationStyle),
}

impl FromStr for StyleSelector {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let style = match value.trim() {
            "random" => return Ok(Self::Random),
            "rotate" | "wedge" => AnimationStyle::Rotate,
            "scale" | "circle" | "scale-pulse" => AnimationStyle::ScalePulse,
            "onewedge" | "flicker" | "opacity-flicker" => AnimationStyle::OpacityFlicker,
            "color" | "color-swap" => AnimationStyle::ColorSwap,
            "move" | "scroll" | "horizontal-scroll" => AnimationStyle::HorizontalScroll,
            other => return Err(ConfigError::UnknownStyle(other.to_owned())),
        };
        Ok(Self::Named(style))
    }
}

/// Color theme selection stored on the game state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ThemeSelector {
    /// Pick a theme uniformly at random.
    #[default]
    Random,
    /// Use the theme registered under the provided name.
    Named(String),
}

impl FromStr for ThemeSelector {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "random" => Ok(Self::Random),
            name => Ok(Self::Named(name.to_owned())),
        }
    }
}

/// Opaque RGB color used by palettes and themes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaletteColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl PaletteColor {
    /// Creates a new palette color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Looks up one of the CSS color names used by the built-in palettes.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let rgb = match name.to_ascii_lowercase().as_str() {
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "blue" => (0, 0, 255),
            "yellow" => (255, 255, 0),
            "green" => (0, 128, 0),
            "orange" => (255, 165, 0),
            "pink" => (255, 192, 203),
            "gray" | "grey" => (128, 128, 128),
            "darkred" => (139, 0, 0),
            "darkblue" => (0, 0, 139),
            "lightgreen" => (144, 238, 144),
            _ => return None,
        };
        Some(Self::from_rgb(rgb.0, rgb.1, rgb.2))
    }

    fn from_hex(digits: &str) -> Option<Self> {
        let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
        let chars: Vec<char> = digits.chars().collect();
        match chars.len() {
            3 => {
                let r = nibble(chars[0])?;
                let g = nibble(chars[1])?;
                let b = nibble(chars[2])?;
                Some(Self::from_rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let byte = |hi: char, lo: char| Some(nibble(hi)? * 16 + nibble(lo)?);
                Some(Self::from_rgb(
                    byte(chars[0], chars[1])?,
                    byte(chars[2], chars[3])?,
                    byte(chars[4], chars[5])?,
                ))
            }
            _ => None,
        }
    }
}

impl FromStr for PaletteColor {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let parsed = match trimmed.strip_prefix('#') {
            Some(digits) => Self::from_hex(digits),
            None => Self::from_name(trimmed),
        };
        parsed.ok_or_else(|| ConfigError::UnknownColor(trimmed.to_owned()))
    }
}

/// Small palette shared by the background and foreground layers of a round.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTheme {
    name: String,
    color1: PaletteColor,
    color2: PaletteColor,
    color3: PaletteColor,
    border_color: PaletteColor,
    border_width: f32,
}

impl ColorTheme {
    /// Creates a new named theme.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        colors: [PaletteColor; 3],
        border_color: PaletteColor,
        border_width: f32,
    ) -> Self {
        let [color1, color2, color3] = colors;
        Self {
            name: name.into(),
            color1,
            color2,
            color3,
            border_color,
            border_width,
        }
    }

    /// Name the theme is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary fill.
    #[must_use]
    pub const fn color1(&self) -> PaletteColor {
        self.color1
    }

    /// Secondary fill, alternated with [`Self::color1`].
    #[must_use]
    pub const fn color2(&self) -> PaletteColor {
        self.color2
    }

    /// Accent color.
    #[must_use]
    pub const fn color3(&self) -> PaletteColor {
        self.color3
    }

    /// Stroke color applied to outlined shapes.
    #[must_use]
    pub const fn border_color(&self) -> PaletteColor {
        self.border_color
    }

    /// Stroke width applied to outlined shapes.
    #[must_use]
    pub const fn border_width(&self) -> f32 {
        self.border_width
    }

    /// Alternating fill for the item at `index`.
    #[must_use]
    pub const fn alternating_fill(&self, index: usize) -> PaletteColor {
        if index % 2 == 0 {
            self.color1
        } else {
            self.color2
        }
    }
}

/// Policy used to drive layer animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationMode {
    /// Advance animations once per rendered frame.
    #[default]
    #[serde(rename = "animation")]
    Frame,
    /// Advance animations on a fixed interval timer.
    #[serde(rename = "interval")]
    Interval,
}

impl FromStr for AnimationMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "animation" | "frame" => Ok(Self::Frame),
            "interval" => Ok(Self::Interval),
            other => Err(ConfigError::UnknownAnimationMode(other.to_owned())),
        }
    }
}

/// Fire-and-forget sound signals emitted by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Generic button press.
    Click,
    /// Correct answer.
    Success,
    /// Wrong answer.
    Wrong,
    /// Round over.
    Victory,
    /// Soft click used by the reward overlay.
    SoftClick,
}

impl AudioCue {
    /// Asset name of the cue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Success => "success",
            Self::Wrong => "wrong",
            Self::Victory => "victory",
            Self::SoftClick => "sclick",
        }
    }
}

/// Persisted application settings and daily totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether background music plays.
    pub is_bg_sound: bool,
    /// Whether sound effects play.
    pub is_sound_effect: bool,
    /// Whether message notifications make a sound.
    pub message_sound: bool,
    /// Animation driver policy.
    pub anim: AnimationMode,
    /// Forces the radial background for troubleshooting.
    pub debug: bool,
    /// Points accumulated by completed rounds today.
    pub today_score: u64,
    /// Seconds of play accumulated by completed rounds today.
    pub today_time: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_bg_sound: false,
            is_sound_effect: true,
            message_sound: true,
            anim: AnimationMode::Frame,
            debug: false,
            today_score: 0,
            today_time: 0,
        }
    }
}

impl Settings {
    /// Reads the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Setting {
        match key {
            SettingKey::BackgroundSound => Setting::BackgroundSound(self.is_bg_sound),
            SettingKey::SoundEffect => Setting::SoundEffect(self.is_sound_effect),
            SettingKey::MessageSound => Setting::MessageSound(self.message_sound),
            SettingKey::Animation => Setting::Animation(self.anim),
            SettingKey::Debug => Setting::Debug(self.debug),
            SettingKey::TodayScore => Setting::TodayScore(self.today_score),
            SettingKey::TodayTime => Setting::TodayTime(self.today_time),
        }
    }

    /// Overwrites the value addressed by `setting`.
    pub fn set(&mut self, setting: Setting) {
        match setting {
            Setting::BackgroundSound(value) => self.is_bg_sound = value,
            Setting::SoundEffect(value) => self.is_sound_effect = value,
            Setting::MessageSound(value) => self.message_sound = value,
            Setting::Animation(value) => self.anim = value,
            Setting::Debug(value) => self.debug = value,
            Setting::TodayScore(value) => self.today_score = value,
            Setting::TodayTime(value) => self.today_time = value,
        }
    }
}

/// Addresses a single persisted setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// `isBgSound`.
    BackgroundSound,
    /// `isSoundEffect`.
    SoundEffect,
    /// `messageSound`.
    MessageSound,
    /// `anim`.
    Animation,
    /// `debug`.
    Debug,
    /// `todayScore`.
    TodayScore,
    /// `todayTime`.
    TodayTime,
}

/// A persisted setting together with its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    /// Whether background music plays.
    BackgroundSound(bool),
    /// Whether sound effects play.
    SoundEffect(bool),
    /// Whether message notifications make a sound.
    MessageSound(bool),
    /// Animation driver policy.
    Animation(AnimationMode),
    /// Troubleshooting override.
    Debug(bool),
    /// Points accumulated today.
    TodayScore(u64),
    /// Seconds played today.
    TodayTime(u64),
}

impl Setting {
    /// Key addressed by the setting.
    #[must_use]
    pub const fn key(&self) -> SettingKey {
        match self {
            Self::BackgroundSound(_) => SettingKey::BackgroundSound,
            Self::SoundEffect(_) => SettingKey::SoundEffect,
            Self::MessageSound(_) => SettingKey::MessageSound,
            Self::Animation(_) => SettingKey::Animation,
            Self::Debug(_) => SettingKey::Debug,
            Self::TodayScore(_) => SettingKey::TodayScore,
            Self::TodayTime(_) => SettingKey::TodayTime,
        }
    }
}

/// Position on the stage expressed in stage pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StagePoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl StagePoint {
    /// Creates a new stage point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Round parameters fixed when a round is configured.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSetup {
    /// Foreground game to play.
    pub game: GameId,
    /// Countdown length in seconds.
    pub time_secs: u32,
    /// Highest reachable level.
    pub max_level: u32,
    /// Highest reachable speed.
    pub max_speed: u32,
    /// Background variant selection.
    pub background: BackgroundSelector,
    /// Background animation style selection.
    pub style: StyleSelector,
    /// Color theme selection.
    pub theme: ThemeSelector,
}

impl RoundSetup {
    /// Creates a setup for `game` using its catalog time and the default caps.
    #[must_use]
    pub fn for_game(game: GameId) -> Self {
        Self {
            game,
            time_secs: game.descriptor().default_time_secs,
            max_level: DEFAULT_MAX_LEVEL,
            max_speed: DEFAULT_MAX_SPEED,
            background: BackgroundSelector::Random,
            style: StyleSelector::Random,
            theme: ThemeSelector::Random,
        }
    }
}

/// Commands that express all permissible game state mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh round: score 0, level 1, speed 0.
    ConfigureRound {
        /// Parameters fixed for the round.
        setup: RoundSetup,
    },
    /// Credits a correct answer and records where the player tapped.
    AwardScore {
        /// Points earned by the answer.
        win_score: u32,
        /// Anchor of the floating score label.
        at: StagePoint,
    },
    /// Moves the round to a new level and speed.
    SetProgression {
        /// Requested level, clamped to `1..=max_level`.
        level: u32,
        /// Requested speed, clamped to `0..=max_speed`.
        speed: u32,
    },
    /// Flags the round as finished.
    MarkFinished {
        /// New flag value.
        finished: bool,
    },
}

/// Events broadcast by the game state after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new round was configured.
    RoundConfigured {
        /// Game selected for the round.
        game: GameId,
        /// Countdown length in seconds.
        time_secs: u32,
    },
    /// The score changed after a correct answer.
    ScoreChanged {
        /// Score after the change.
        score: u32,
        /// Points added by the answer.
        win_score: u32,
        /// Anchor of the floating score label.
        at: StagePoint,
    },
    /// The level changed.
    LevelChanged {
        /// Level after the change.
        level: u32,
    },
    /// The speed changed.
    SpeedChanged {
        /// Speed after the change.
        speed: u32,
    },
    /// The finished flag changed.
    FinishedChanged {
        /// Flag value after the change.
        finished: bool,
    },
}

/// Immutable view of the game state consumed by systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Game being played.
    pub game: GameId,
    /// Current score.
    pub score: u32,
    /// Current level.
    pub level: u32,
    /// Current speed.
    pub speed: u32,
    /// Highest reachable level.
    pub max_level: u32,
    /// Highest reachable speed.
    pub max_speed: u32,
    /// Countdown length in seconds.
    pub time_secs: u32,
}
