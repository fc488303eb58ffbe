#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! "Rotation digital" foreground game.
//!
//! Numbered hexagonal cells are laid out in concentric hexagonal rings around
//! the stage centre. The player taps them in ascending order while the whole
//! ring optionally rotates at a speed-dependent rate.

use std::time::Duration;

use glam::Vec2;
use log::{debug, warn};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vision_drill_core::{AnimationMode, ColorTheme, Command, StagePoint};
use vision_drill_rendering::{Color, LayerId, NodeAttrs, NodeId, Scene, SceneError, Shape};
use vision_drill_system_animation::AnimationDriver;

const CELL_SIDES: u32 = 6;
const FONT_SIZE: f32 = 30.0;
const WIN_SCORE_PER_LEVEL: u32 = 5;
const LABEL_LIFT: f32 = 20.0;
const MIN_OPACITY: f32 = 0.4;
const OPACITY_SPREAD: f32 = 0.4;
const SQRT_3: f32 = 1.732_050_8;

/// Number of cells laid out for `level`.
#[must_use]
pub const fn item_count(level: u32) -> usize {
    match level {
        2 => 18,
        3 => 36,
        4 => 60,
        5 => 90,
        _ => 6,
    }
}

/// Rotation rate of the ring in degrees per second for `speed`.
#[must_use]
pub const fn angular_speed(speed: u32) -> u32 {
    match speed {
        2 => 45,
        3 => 60,
        4 => 90,
        5 => 180,
        _ => 30,
    }
}

/// Time the ring needs for a full turn at `speed`.
#[must_use]
pub fn rotation_period(speed: u32) -> Duration {
    Duration::from_millis(360_000 / u64::from(angular_speed(speed)))
}

/// Circumradius of a cell so that `level` rings fit inside `max_radius`.
#[must_use]
pub fn cell_radius(max_radius: f32, level: u32) -> f32 {
    max_radius * 2.0 / ((2 * level + 1) as f32 * SQRT_3)
}

/// Produces the labels `1..=count` in random order.
pub fn shuffled_labels<R>(count: usize, rng: &mut R) -> Vec<u32>
where
    R: Rng + ?Sized,
{
    let mut labels: Vec<u32> = (1..=count as u32).collect();
    labels.shuffle(rng);
    labels
}

/// Placement of a cell on the ring layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSlot {
    /// One-based ring number.
    pub ring: u32,
    /// Rotation of the slot around the ring centre, in degrees.
    pub arc_deg: f32,
    /// Cell centre before the slot rotation is applied.
    pub offset: Vec2,
}

/// Computes the placement of the cell at `index` for cells of `radius`.
///
/// Ring `k` holds `6k` cells; its cells step by `60/k` degrees and sit `k`
/// cell diameters out from the centre.
#[must_use]
pub fn ring_slot(index: usize, radius: f32) -> RingSlot {
    let mut ring = 1_u32;
    while index >= (3 * ring * (ring + 1)) as usize {
        ring += 1;
    }
    let k = ring as f32;
    RingSlot {
        ring,
        arc_deg: 60.0 / k * index as f32,
        offset: Vec2::new(-k * SQRT_3 / 2.0 * radius, -1.5 * k * radius),
    }
}

/// One numbered cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayItem {
    label: u32,
    slot: usize,
    is_answered: bool,
    arc_deg: f32,
    opacity: f32,
    node: NodeId,
    cell: NodeId,
    text: NodeId,
}

impl PlayItem {
    /// Number displayed on the cell.
    #[must_use]
    pub const fn label(&self) -> u32 {
        self.label
    }

    /// Layout slot index.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Whether the cell was already tapped in order.
    #[must_use]
    pub const fn is_answered(&self) -> bool {
        self.is_answered
    }

    /// Slot rotation in degrees.
    #[must_use]
    pub const fn arc_deg(&self) -> f32 {
        self.arc_deg
    }

    /// Initial opacity of the cell.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Group holding the cell and its label.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Hexagon node.
    #[must_use]
    pub const fn cell(&self) -> NodeId {
        self.cell
    }

    /// Label text node.
    #[must_use]
    pub const fn text(&self) -> NodeId {
        self.text
    }
}

/// Result of routing a tap to the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tap missed every unanswered cell.
    Ignored,
    /// The expected cell was tapped.
    Correct {
        /// Points credited for the answer.
        win_score: u32,
    },
    /// An unanswered cell was tapped out of order.
    Wrong,
}

/// Foreground layer running the rotation digital game.
#[derive(Debug)]
pub struct RotationDigital {
    rng: ChaCha8Rng,
    driver: AnimationDriver,
    items: Vec<PlayItem>,
    current_answer: u32,
    speed: u32,
    root: Option<NodeId>,
}

impl RotationDigital {
    /// Creates an empty layer.
    #[must_use]
    pub fn new(mode: AnimationMode, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            driver: AnimationDriver::new(mode, rotation_period(0)),
            items: Vec::new(),
            current_answer: 1,
            speed: 0,
            root: None,
        }
    }

    /// Cells of the current build.
    #[must_use]
    pub fn items(&self) -> &[PlayItem] {
        &self.items
    }

    /// Cell showing `label`.
    #[must_use]
    pub fn item_for_label(&self, label: u32) -> Option<&PlayItem> {
        self.items.iter().find(|item| item.label == label)
    }

    /// Label the player must tap next.
    #[must_use]
    pub const fn current_answer(&self) -> u32 {
        self.current_answer
    }

    /// Group holding every cell.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Reports whether the ring is rotating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.driver.is_running()
    }

    /// Rebuilds the ring for `level` and starts rotating it when `speed > 0`.
    pub fn build(
        &mut self,
        scene: &mut Scene,
        level: u32,
        speed: u32,
        theme: &ColorTheme,
    ) -> Result<(), SceneError> {
        self.clear(scene);
        let (width, height) = (scene.width(), scene.height());
        let max_radius = width.min(height) / 2.0;
        let radius = cell_radius(max_radius, level);
        let count = item_count(level);
        let labels = shuffled_labels(count, &mut self.rng);

        let root = scene.add(
            LayerId::Foreground,
            Shape::Group,
            NodeAttrs::at(width / 2.0, height / 2.0),
        );
        self.root = Some(root);
        let stroke: Color = theme.border_color().into();
        let mut items = Vec::with_capacity(count);
        for (slot, label) in labels.into_iter().enumerate() {
            let placement = ring_slot(slot, radius);
            let opacity = MIN_OPACITY + self.rng.gen::<f32>() * OPACITY_SPREAD;
            let node = scene.add_child(
                root,
                Shape::Group,
                NodeAttrs::default()
                    .with_offset(-placement.offset.x, -placement.offset.y)
                    .with_rotation(placement.arc_deg),
            )?;
            let cell = scene.add_child(
                node,
                Shape::RegularPolygon {
                    sides: CELL_SIDES,
                    radius,
                },
                NodeAttrs::default()
                    .with_fill(theme.alternating_fill(slot).into())
                    .with_stroke(stroke, theme.border_width())
                    .with_opacity(opacity)
                    .with_rotation(-placement.arc_deg),
            )?;
            let content = label.to_string();
            let text_shape = Shape::text(content, FONT_SIZE);
            let size = text_shape.text_size().unwrap_or(Vec2::ZERO);
            let text = scene.add_child(
                node,
                text_shape,
                NodeAttrs::default()
                    .with_fill(stroke)
                    .with_offset(size.x / 2.0, size.y / 2.0)
                    .with_rotation(-placement.arc_deg),
            )?;
            items.push(PlayItem {
                label,
                slot,
                is_answered: false,
                arc_deg: placement.arc_deg,
                opacity,
                node,
                cell,
                text,
            });
        }
        debug!(
            "rotation digital built: level={} speed={} cells={} radius={:.1}",
            level, speed, count, radius
        );
        self.items = items;
        self.current_answer = 1;
        self.speed = speed;
        self.animate();
        Ok(())
    }

    /// Starts rotating the ring from its rest angle when the speed is non-zero.
    pub fn animate(&mut self) {
        let _ = self.driver.stop();
        if self.speed == 0 || self.root.is_none() {
            return;
        }
        self.driver = AnimationDriver::new(self.driver.mode(), rotation_period(self.speed));
        if let Err(error) = self.driver.start() {
            warn!("rotation digital animation could not start: {error}");
        }
    }

    /// Continues rotating from the current angle after a pause.
    pub fn resume_animate(&mut self) {
        if self.speed == 0 || self.root.is_none() {
            return;
        }
        if let Err(error) = self.driver.resume() {
            warn!("rotation digital animation could not resume: {error}");
        }
    }

    /// Stops rotating. Returns whether the ring was rotating.
    pub fn stop_animate(&mut self) -> bool {
        self.driver.stop()
    }

    /// Stops rotating and releases every cell.
    pub fn clear(&mut self, scene: &mut Scene) {
        let _ = self.stop_animate();
        self.items.clear();
        if let Some(root) = self.root.take() {
            if let Err(error) = scene.destroy(root) {
                debug!("rotation digital root already released: {error}");
            }
        }
    }

    /// Sets the opacity of the whole ring.
    pub fn set_opacity(&self, scene: &mut Scene, opacity: f32) -> Result<(), SceneError> {
        if let Some(root) = self.root {
            scene.attrs_mut(root)?.opacity = opacity;
        }
        Ok(())
    }

    /// Enables or disables taps on the whole ring.
    pub fn set_listening(&self, scene: &mut Scene, listening: bool) -> Result<(), SceneError> {
        if let Some(root) = self.root {
            scene.attrs_mut(root)?.listening = listening;
        }
        Ok(())
    }

    /// Advances the ring rotation by `dt`.
    pub fn tick(&mut self, scene: &mut Scene, dt: Duration) {
        let Some(root) = self.root else {
            return;
        };
        self.driver.tick(dt, "rotation digital", |phase| {
            scene.attrs_mut(root)?.rotation_deg = 360.0 * phase.fraction();
            Ok(())
        });
    }

    /// Routes a tap on `node` at stage point `at`.
    ///
    /// A correct answer pushes the score award into `out`.
    pub fn on_tap(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        at: StagePoint,
        level: u32,
        out: &mut Vec<Command>,
    ) -> TapOutcome {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| scene.is_within(node, item.node))
        else {
            return TapOutcome::Ignored;
        };
        if item.is_answered {
            return TapOutcome::Ignored;
        }
        if item.label != self.current_answer {
            return TapOutcome::Wrong;
        }

        item.is_answered = true;
        if let Err(error) = scene.set_text(item.text, "") {
            warn!("answered cell label could not be cleared: {error}");
        }
        self.current_answer += 1;
        let win_score = WIN_SCORE_PER_LEVEL * level;
        out.push(Command::AwardScore {
            win_score,
            at: StagePoint::new(at.x, at.y - LABEL_LIFT),
        });
        TapOutcome::Correct { win_score }
    }

    /// Reports whether every cell has been answered.
    ///
    /// A completed round resets the expected label to 1.
    pub fn check_round_complete(&mut self) -> bool {
        let complete = self.items.iter().all(PlayItem::is_answered);
        if complete {
            self.current_answer = 1;
        }
        complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_boundaries_follow_hexagonal_numbers() {
        assert_eq!(ring_slot(0, 1.0).ring, 1);
        assert_eq!(ring_slot(5, 1.0).ring, 1);
        assert_eq!(ring_slot(6, 1.0).ring, 2);
        assert_eq!(ring_slot(17, 1.0).ring, 2);
        assert_eq!(ring_slot(18, 1.0).ring, 3);
        assert_eq!(ring_slot(59, 1.0).ring, 4);
        assert_eq!(ring_slot(89, 1.0).ring, 5);
    }

    #[test]
    fn ring_steps_shrink_with_ring_number() {
        assert_eq!(ring_slot(1, 1.0).arc_deg, 60.0);
        assert_eq!(ring_slot(7, 1.0).arc_deg, 210.0);
        assert_eq!(ring_slot(19, 1.0).arc_deg, 380.0);
        assert_eq!(ring_slot(61, 1.0).arc_deg, 732.0);
    }

    #[test]
    fn inner_ring_sits_one_cell_diameter_out() {
        let slot = ring_slot(0, 10.0);
        assert!((slot.offset.length() - SQRT_3 * 10.0).abs() < 1e-3);
    }

    #[test]
    fn rotation_period_matches_angular_speed() {
        assert_eq!(rotation_period(1), Duration::from_secs(12));
        assert_eq!(rotation_period(5), Duration::from_secs(2));
        assert_eq!(rotation_period(9), Duration::from_secs(12));
    }

    #[test]
    fn cell_radius_shrinks_with_level() {
        let first = cell_radius(300.0, 1);
        assert!((first - 600.0 / (3.0 * SQRT_3)).abs() < 1e-3);
        assert!(cell_radius(300.0, 5) < first);
    }
}
