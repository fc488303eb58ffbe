//! Score and time HUD plus the end-of-round score overlay.

use glam::Vec2;
use vision_drill_rendering::{
    Color, LayerId, NodeAttrs, NodeId, Scene, SceneError, Shape, TextAlign,
};

const WHITE: Color = Color::from_rgb_u8(255, 255, 255);
const LIGHT_GREEN: Color = Color::from_rgb_u8(144, 238, 144);
const ORANGE: Color = Color::from_rgb_u8(255, 165, 0);
const OVERLAY_FILL: Color = Color::from_rgb_u8(0x55, 0x55, 0x55);
const OVERLAY_STROKE: Color = Color::from_rgb_u8(0x66, 0x66, 0x66);
const BUTTON_FILL: Color = Color::from_rgb_u8(0xee, 0xee, 0xee);

const PANEL_EXPANDED_INSET: f32 = 175.0;
const PANEL_COLLAPSED_INSET: f32 = 25.0;
const PANEL_TOP: f32 = 30.0;
const PANEL_OPACITY: f32 = 0.5;
const PANEL_SIZE: Vec2 = Vec2::new(150.0, 260.0);
const GRAB_RADIUS: f32 = 25.0;
const TEXT_LEFT: f32 = 50.0;

const OVERLAY_SIZE: Vec2 = Vec2::new(400.0, 350.0);
const OVERLAY_HIDDEN_OPACITY: f32 = 0.01;
const BUTTON_PADDING: f32 = 15.0;
const SCORE_LABEL_WIDTH: f32 = 200.0;

const SCORE_LABEL_FONT: f32 = 30.0;

fn label(content: impl Into<String>, font_size: f32) -> Shape {
    Shape::text(content, font_size)
}

fn centred(content: impl Into<String>, font_size: f32, width: f32) -> Shape {
    Shape::Text {
        content: content.into(),
        font_size,
        width: Some(width),
        align: TextAlign::Center,
    }
}

/// Collapsible control panel showing time, totals and instructions.
#[derive(Clone, Debug)]
pub struct Hud {
    panel: NodeId,
    grab: NodeId,
    time_text: NodeId,
    total_text: NodeId,
    score_text: NodeId,
    instructions: [NodeId; 2],
    expanded_x: f32,
    collapsed_x: f32,
}

impl Hud {
    pub(crate) fn build(scene: &mut Scene) -> Result<Self, SceneError> {
        let width = scene.width();
        let expanded_x = width - PANEL_EXPANDED_INSET;
        let collapsed_x = width - PANEL_COLLAPSED_INSET;
        let root = scene.add(LayerId::Control, Shape::Group, NodeAttrs::default());
        let panel = scene.add_child(
            root,
            Shape::Group,
            NodeAttrs::at(expanded_x, PANEL_TOP).with_opacity(PANEL_OPACITY),
        )?;
        let _ = scene.add_child(
            panel,
            Shape::Rect {
                width: PANEL_SIZE.x,
                height: PANEL_SIZE.y,
            },
            NodeAttrs::at(GRAB_RADIUS, 0.0)
                .with_fill(LIGHT_GREEN)
                .with_stroke(WHITE, 1.0),
        )?;
        let grab = scene.add_child(
            panel,
            Shape::Wedge {
                radius: GRAB_RADIUS,
                angle_deg: 180.0,
            },
            NodeAttrs::at(GRAB_RADIUS, 45.0)
                .with_rotation(90.0)
                .with_fill(LIGHT_GREEN)
                .with_stroke(WHITE, 1.0),
        )?;
        let text = |y: f32| NodeAttrs::at(TEXT_LEFT, y).with_fill(WHITE);
        let time_text = scene.add_child(panel, label("0", 40.0), text(30.0))?;
        let total_text = scene.add_child(panel, label("Total", 20.0), text(90.0))?;
        let score_text = scene.add_child(panel, label("Score", 20.0), text(130.0))?;
        let first = scene.add_child(panel, label("", 14.0), text(180.0))?;
        let second = scene.add_child(panel, label("", 14.0), text(200.0))?;
        Ok(Self {
            panel,
            grab,
            time_text,
            total_text,
            score_text,
            instructions: [first, second],
            expanded_x,
            collapsed_x,
        })
    }

    /// Group that slides in and out.
    #[must_use]
    pub const fn panel(&self) -> NodeId {
        self.panel
    }

    /// Handle that toggles the panel.
    #[must_use]
    pub const fn grab(&self) -> NodeId {
        self.grab
    }

    /// Remaining-time text.
    #[must_use]
    pub const fn time_text(&self) -> NodeId {
        self.time_text
    }

    /// Running total text.
    #[must_use]
    pub const fn total_text(&self) -> NodeId {
        self.total_text
    }

    /// Round score text.
    #[must_use]
    pub const fn score_text(&self) -> NodeId {
        self.score_text
    }

    /// Instruction lines.
    #[must_use]
    pub const fn instructions(&self) -> [NodeId; 2] {
        self.instructions
    }

    /// Panel position while expanded.
    #[must_use]
    pub const fn expanded_x(&self) -> f32 {
        self.expanded_x
    }

    /// Panel position while collapsed.
    #[must_use]
    pub const fn collapsed_x(&self) -> f32 {
        self.collapsed_x
    }
}

/// Floating score label and the end-of-round score card.
#[derive(Clone, Debug)]
pub struct ScoreOverlay {
    label: NodeId,
    group: NodeId,
    base_text: NodeId,
    award_text: NodeId,
    total_text: NodeId,
    back: NodeId,
}

impl ScoreOverlay {
    pub(crate) fn build(scene: &mut Scene) -> Result<Self, SceneError> {
        let (width, height) = (scene.width(), scene.height());
        let score_label = scene.add(
            LayerId::ScoreOverlay,
            Shape::Text {
                content: "+0".to_owned(),
                font_size: SCORE_LABEL_FONT,
                width: Some(SCORE_LABEL_WIDTH),
                align: TextAlign::Left,
            },
            NodeAttrs::at(190.0, 15.0)
                .with_fill(ORANGE)
                .with_opacity(0.0)
                .with_visible(false)
                .with_listening(false),
        );
        let group = scene.add(
            LayerId::ScoreOverlay,
            Shape::Group,
            NodeAttrs::at(
                (width - OVERLAY_SIZE.x) / 2.0,
                (height - OVERLAY_SIZE.y) / 2.0,
            )
            .with_opacity(OVERLAY_HIDDEN_OPACITY)
            .with_visible(false),
        );
        let _ = scene.add_child(
            group,
            Shape::Rect {
                width: OVERLAY_SIZE.x,
                height: OVERLAY_SIZE.y,
            },
            NodeAttrs::default()
                .with_fill(OVERLAY_FILL)
                .with_stroke(OVERLAY_STROKE, 2.0)
                .with_opacity(0.8),
        )?;
        let line = |y: f32| NodeAttrs::at(0.0, y).with_fill(WHITE);
        let _ = scene.add_child(group, centred("Your Score", 28.0, OVERLAY_SIZE.x), line(30.0))?;
        let base_text = scene.add_child(group, centred("Win score: ", 20.0, OVERLAY_SIZE.x), line(108.0))?;
        let award_text = scene.add_child(group, centred("Award score: ", 20.0, OVERLAY_SIZE.x), line(148.0))?;
        let total_text = scene.add_child(group, centred("Total score: ", 20.0, OVERLAY_SIZE.x), line(188.0))?;

        let caption = label("Back", 20.0);
        let caption_size = caption.text_size().unwrap_or(Vec2::ZERO);
        let back = scene.add_child(
            group,
            Shape::Group,
            NodeAttrs::at(OVERLAY_SIZE.x / 2.0 - 70.0, 258.0)
                .with_opacity(0.0)
                .with_listening(false),
        )?;
        let _ = scene.add_child(
            back,
            Shape::Rect {
                width: caption_size.x + 2.0 * BUTTON_PADDING,
                height: caption_size.y + 2.0 * BUTTON_PADDING,
            },
            NodeAttrs::default().with_fill(BUTTON_FILL),
        )?;
        let _ = scene.add_child(
            back,
            caption,
            NodeAttrs::at(BUTTON_PADDING, BUTTON_PADDING).with_fill(OVERLAY_STROKE),
        )?;
        Ok(Self {
            label: score_label,
            group,
            base_text,
            award_text,
            total_text,
            back,
        })
    }

    /// Hides the score card and disables the back control.
    pub(crate) fn reset(&self, scene: &mut Scene) -> Result<(), SceneError> {
        let group = scene.attrs_mut(self.group)?;
        group.visible = false;
        group.opacity = OVERLAY_HIDDEN_OPACITY;
        let back = scene.attrs_mut(self.back)?;
        back.opacity = 0.0;
        back.listening = false;
        let label = scene.attrs_mut(self.label)?;
        label.visible = false;
        label.opacity = 0.0;
        Ok(())
    }

    /// Floating "+N" label.
    #[must_use]
    pub const fn label(&self) -> NodeId {
        self.label
    }

    /// Score card group.
    #[must_use]
    pub const fn group(&self) -> NodeId {
        self.group
    }

    /// "Win score" line.
    #[must_use]
    pub const fn base_text(&self) -> NodeId {
        self.base_text
    }

    /// "Award score" line.
    #[must_use]
    pub const fn award_text(&self) -> NodeId {
        self.award_text
    }

    /// "Total score" line.
    #[must_use]
    pub const fn total_text(&self) -> NodeId {
        self.total_text
    }

    /// Back control.
    #[must_use]
    pub const fn back(&self) -> NodeId {
        self.back
    }
}
