#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ambient animated backdrops drawn beneath the play objects.
//!
//! Each [`BackgroundLayer`] owns its nodes and its [`AnimationDriver`]. A
//! rebuild always tears the previous node set and driver down first, so stale
//! nodes are never animated.

use std::{f32::consts::TAU, time::Duration};

use glam::Vec2;
use log::{debug, warn};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vision_drill_core::{
    animation_period, AnimationMode, AnimationStyle, BackgroundKind, ColorTheme, StyleSelector,
};
use vision_drill_rendering::{Color, LayerId, NodeAttrs, NodeId, Scene, SceneError, Shape};
use vision_drill_system_animation::{AnimationDriver, AnimationError, Phase};

const RADIAL_STYLES: [AnimationStyle; 4] = [
    AnimationStyle::ScalePulse,
    AnimationStyle::Rotate,
    AnimationStyle::OpacityFlicker,
    AnimationStyle::ColorSwap,
];
const GRID_STYLES: [AnimationStyle; 4] = [
    AnimationStyle::HorizontalScroll,
    AnimationStyle::ScalePulse,
    AnimationStyle::ColorSwap,
    AnimationStyle::Rotate,
];
const GRATING_STYLES: [AnimationStyle; 3] = [
    AnimationStyle::HorizontalScroll,
    AnimationStyle::ScalePulse,
    AnimationStyle::Rotate,
];
const RADIAL_RADIUS_FACTOR: f32 = 0.6;
const RADIAL_WEDGE_DEG: f32 = 60.0;
const RADIAL_SWAP_FRACTION: f32 = 0.05;
const GRID_SWAP_FRACTION: f32 = 0.1;
const GRATING_MAX_TILT_DEG: f32 = 45.0;
const TILE_REPEAT: usize = 3;
const SCALE_EPSILON: f32 = 0.001;

/// Styles a background kind can run when named explicitly.
#[must_use]
pub fn supported_styles(kind: BackgroundKind) -> &'static [AnimationStyle] {
    match kind {
        BackgroundKind::Radial => &RADIAL_STYLES,
        BackgroundKind::Grid => &GRID_STYLES,
        BackgroundKind::Grating => &GRATING_STYLES,
    }
}

/// Styles a background kind picks from when the selector is random.
///
/// Gratings only rotate when asked to.
#[must_use]
pub fn random_styles(kind: BackgroundKind) -> &'static [AnimationStyle] {
    match kind {
        BackgroundKind::Grating => &GRATING_STYLES[..2],
        other => supported_styles(other),
    }
}

/// Tunables shared by every background kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundConfig {
    base_count: u32,
    items_per_level: u32,
}

impl BackgroundConfig {
    /// Creates a configuration with the provided density parameters.
    #[must_use]
    pub const fn new(base_count: u32, items_per_level: u32) -> Self {
        Self {
            base_count,
            items_per_level,
        }
    }

    /// Item count for `level`: radial wedges, grid columns or grating bars.
    #[must_use]
    pub const fn item_count(&self, level: u32) -> u32 {
        self.base_count + level * self.items_per_level
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self::new(5, 2)
    }
}

#[derive(Clone, Copy, Debug)]
struct BackdropNode {
    id: NodeId,
    fill_index: usize,
    base_rotation: f32,
    size: Vec2,
}

#[derive(Debug)]
struct Backdrop {
    kind: BackgroundKind,
    style: AnimationStyle,
    theme: ColorTheme,
    root: NodeId,
    nodes: Vec<BackdropNode>,
    stage_width: f32,
    long_width: f32,
}

impl Backdrop {
    fn apply<R>(&self, scene: &mut Scene, phase: Phase, rng: &mut R) -> Result<(), AnimationError>
    where
        R: Rng + ?Sized,
    {
        let t = phase.fraction();
        let flicker = self.kind == BackgroundKind::Grating;
        match (self.kind, self.style) {
            (_, AnimationStyle::HorizontalScroll) => {
                scene.attrs_mut(self.root)?.position.x =
                    -self.long_width + self.stage_width * t;
                if flicker {
                    for node in &self.nodes {
                        scene.attrs_mut(node.id)?.opacity = rng.gen::<f32>();
                    }
                }
            }
            (BackgroundKind::Radial, AnimationStyle::ScalePulse) => {
                for node in &self.nodes {
                    scene.attrs_mut(node.id)?.scale = Vec2::splat(1.0 + t);
                }
            }
            (_, AnimationStyle::ScalePulse) => {
                let scale_x = (TAU * t).sin() + SCALE_EPSILON;
                for node in &self.nodes {
                    let attrs = scene.attrs_mut(node.id)?;
                    attrs.scale = Vec2::new(scale_x, 1.0);
                    if flicker {
                        attrs.opacity = rng.gen::<f32>();
                    }
                }
            }
            (BackgroundKind::Radial, AnimationStyle::Rotate) => {
                for node in &self.nodes {
                    scene.attrs_mut(node.id)?.rotation_deg = node.base_rotation + 360.0 * t;
                }
            }
            (_, AnimationStyle::Rotate) => {
                for node in &self.nodes {
                    let attrs = scene.attrs_mut(node.id)?;
                    attrs.offset = node.size / 2.0;
                    attrs.rotation_deg = 360.0 * t;
                    attrs.opacity = rng.gen::<f32>();
                }
            }
            (_, AnimationStyle::OpacityFlicker) => {
                for node in &self.nodes {
                    let attrs = scene.attrs_mut(node.id)?;
                    attrs.rotation_deg = 360.0 * t;
                    attrs.opacity = 0.4 + 0.6 * rng.gen::<f32>();
                }
            }
            (_, AnimationStyle::ColorSwap) => {
                let fraction = match self.kind {
                    BackgroundKind::Radial => RADIAL_SWAP_FRACTION,
                    _ => GRID_SWAP_FRACTION,
                };
                let swapped = (t / fraction) as usize % 2;
                for node in &self.nodes {
                    let fill = self.theme.alternating_fill(node.fill_index + swapped);
                    scene.attrs_mut(node.id)?.fill = Some(fill.into());
                }
            }
        }
        Ok(())
    }
}

/// One interchangeable backdrop variant bound to the background layer.
#[derive(Debug)]
pub struct BackgroundLayer {
    kind: BackgroundKind,
    config: BackgroundConfig,
    driver: AnimationDriver,
    rng: ChaCha8Rng,
    built: Option<Backdrop>,
}

impl BackgroundLayer {
    /// Creates an empty layer of the provided kind.
    #[must_use]
    pub fn new(kind: BackgroundKind, config: BackgroundConfig, mode: AnimationMode, seed: u64) -> Self {
        Self {
            kind,
            config,
            driver: AnimationDriver::new(mode, animation_period(0)),
            rng: ChaCha8Rng::seed_from_u64(seed),
            built: None,
        }
    }

    /// Variant drawn by the layer.
    #[must_use]
    pub const fn kind(&self) -> BackgroundKind {
        self.kind
    }

    /// Style chosen by the most recent build.
    #[must_use]
    pub fn style(&self) -> Option<AnimationStyle> {
        self.built.as_ref().map(|built| built.style)
    }

    /// Group holding every node of the layer.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.built.as_ref().map(|built| built.root)
    }

    /// Number of animated nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.built.as_ref().map_or(0, |built| built.nodes.len())
    }

    /// Animation cycle length.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.driver.period()
    }

    /// Reports whether the layer is animating.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Rebuilds the node set for `level` and `speed` and starts animating.
    pub fn build(
        &mut self,
        scene: &mut Scene,
        level: u32,
        speed: u32,
        theme: &ColorTheme,
        selector: StyleSelector,
    ) -> Result<(), SceneError> {
        self.teardown(scene);
        let style = self.resolve_style(selector);
        let count = self.config.item_count(level) as usize;
        let backdrop = match self.kind {
            BackgroundKind::Radial => build_radial(scene, theme, style, count)?,
            BackgroundKind::Grid => build_grid(scene, theme, style, count)?,
            BackgroundKind::Grating => {
                let tilt = self.rng.gen_range(0.0..GRATING_MAX_TILT_DEG);
                build_grating(scene, theme, style, count, tilt)?
            }
        };
        debug!(
            "background built: kind={:?} style={:?} nodes={} level={} speed={}",
            self.kind,
            style,
            backdrop.nodes.len(),
            level,
            speed
        );
        self.built = Some(backdrop);
        self.driver = AnimationDriver::new(self.driver.mode(), animation_period(speed));
        self.start();
        Ok(())
    }

    fn resolve_style(&mut self, selector: StyleSelector) -> AnimationStyle {
        if let StyleSelector::Named(style) = selector {
            if supported_styles(self.kind).contains(&style) {
                return style;
            }
            warn!(
                "{:?} background does not support {:?}; picking another style",
                self.kind, style
            );
        }
        random_styles(self.kind)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(AnimationStyle::Rotate)
    }

    /// Restarts the animation cycle from zero.
    ///
    /// A driver that refuses to start is logged and the layer stays static.
    pub fn start(&mut self) {
        if self.built.is_none() {
            return;
        }
        if let Err(error) = self.driver.start() {
            warn!("background animation could not start: {error}");
        }
    }

    /// Stops the animation, keeping the nodes. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        self.driver.stop()
    }

    /// Stops the animation and releases every node.
    pub fn teardown(&mut self, scene: &mut Scene) {
        let _ = self.driver.stop();
        if let Some(built) = self.built.take() {
            if let Err(error) = scene.destroy(built.root) {
                debug!("background root already released: {error}");
            }
        }
    }

    /// Sets the opacity of the whole layer.
    pub fn set_opacity(&self, scene: &mut Scene, opacity: f32) -> Result<(), SceneError> {
        if let Some(root) = self.root() {
            scene.attrs_mut(root)?.opacity = opacity;
        }
        Ok(())
    }

    /// Advances the animation by `dt` and applies the new phase.
    pub fn tick(&mut self, scene: &mut Scene, dt: Duration) {
        let Some(built) = self.built.as_ref() else {
            return;
        };
        let rng = &mut self.rng;
        self.driver
            .tick(dt, "background", |phase| built.apply(scene, phase, rng));
    }
}

fn theme_fill(theme: &ColorTheme, index: usize) -> Color {
    theme.alternating_fill(index).into()
}

fn build_radial(
    scene: &mut Scene,
    theme: &ColorTheme,
    style: AnimationStyle,
    count: usize,
) -> Result<Backdrop, SceneError> {
    let (width, height) = (scene.width(), scene.height());
    let root = scene.add(
        LayerId::Background,
        Shape::Group,
        NodeAttrs::at(width / 2.0, height / 2.0),
    );
    let count = if style == AnimationStyle::OpacityFlicker {
        1
    } else {
        count.max(1)
    };
    let radius = width * RADIAL_RADIUS_FACTOR;
    let mut nodes = Vec::with_capacity(count);
    for index in 0..count {
        let fill = theme_fill(theme, index);
        let (shape, rotation) = match style {
            AnimationStyle::ScalePulse => (
                Shape::Circle {
                    radius: radius * (count - index) as f32 / count as f32,
                },
                0.0,
            ),
            AnimationStyle::Rotate => {
                let angle_deg = 360.0 / count as f32;
                (
                    Shape::Wedge { radius, angle_deg },
                    angle_deg * index as f32,
                )
            }
            _ => (
                Shape::Wedge {
                    radius,
                    angle_deg: RADIAL_WEDGE_DEG,
                },
                RADIAL_WEDGE_DEG * index as f32,
            ),
        };
        let id = scene.add_child(
            root,
            shape,
            NodeAttrs::default()
                .with_fill(fill)
                .with_stroke(fill, theme.border_width())
                .with_rotation(rotation),
        )?;
        nodes.push(BackdropNode {
            id,
            fill_index: index,
            base_rotation: rotation,
            size: Vec2::ZERO,
        });
    }
    Ok(Backdrop {
        kind: BackgroundKind::Radial,
        style,
        theme: theme.clone(),
        root,
        nodes,
        stage_width: width,
        long_width: width.max(height),
    })
}

fn build_grid(
    scene: &mut Scene,
    theme: &ColorTheme,
    style: AnimationStyle,
    columns: usize,
) -> Result<Backdrop, SceneError> {
    let (width, height) = (scene.width(), scene.height());
    let long_width = width.max(height);
    let columns = columns.max(1);
    let cell = width / columns as f32;
    let rows = (height / cell).floor() as usize;
    let root = scene.add(
        LayerId::Background,
        Shape::Group,
        NodeAttrs::at(-long_width, 0.0),
    );
    let mut nodes = Vec::with_capacity(TILE_REPEAT * rows * TILE_REPEAT * columns);
    for row in 0..TILE_REPEAT * rows {
        for column in 0..TILE_REPEAT * columns {
            let id = scene.add_child(
                root,
                Shape::Rect {
                    width: cell,
                    height: cell,
                },
                NodeAttrs::at(column as f32 * cell, row as f32 * cell)
                    .with_fill(theme_fill(theme, row + column)),
            )?;
            nodes.push(BackdropNode {
                id,
                fill_index: row + column,
                base_rotation: 0.0,
                size: Vec2::splat(cell),
            });
        }
    }
    Ok(Backdrop {
        kind: BackgroundKind::Grid,
        style,
        theme: theme.clone(),
        root,
        nodes,
        stage_width: width,
        long_width,
    })
}

fn build_grating(
    scene: &mut Scene,
    theme: &ColorTheme,
    style: AnimationStyle,
    bars: usize,
    tilt_deg: f32,
) -> Result<Backdrop, SceneError> {
    let (width, height) = (scene.width(), scene.height());
    let long_width = width.max(height);
    let bars = bars.max(1);
    let bar = Vec2::new(width / bars as f32, height * TILE_REPEAT as f32);
    let root = scene.add(
        LayerId::Background,
        Shape::Group,
        NodeAttrs::at(-long_width, 0.0),
    );
    let border: Color = theme.border_color().into();
    let mut nodes = Vec::with_capacity(TILE_REPEAT * bars);
    for index in 0..TILE_REPEAT * bars {
        let id = scene.add_child(
            root,
            Shape::Rect {
                width: bar.x,
                height: bar.y,
            },
            NodeAttrs::at(index as f32 * bar.x, -height)
                .with_fill(theme_fill(theme, index))
                .with_stroke(border, theme.border_width())
                .with_rotation(tilt_deg),
        )?;
        nodes.push(BackdropNode {
            id,
            fill_index: index,
            base_rotation: tilt_deg,
            size: bar,
        });
    }
    Ok(Backdrop {
        kind: BackgroundKind::Grating,
        style,
        theme: theme.clone(),
        root,
        nodes,
        stage_width: width,
        long_width,
    })
}
