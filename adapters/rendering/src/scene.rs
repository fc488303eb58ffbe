//! Retained scene graph made of layered, transformable nodes.

use std::{collections::HashMap, error::Error, f32::consts::TAU, fmt};

use glam::{Affine2, Vec2};

use crate::Color;

const CIRCLE_SEGMENTS: usize = 48;
const TEXT_WIDTH_FACTOR: f32 = 0.6;

/// Drawing surfaces stacked by z-order, bottom first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    /// Ambient animated backdrop.
    Background,
    /// Interactive play objects.
    Foreground,
    /// Score and time HUD.
    Control,
    /// Floating score labels and the end-of-round overlay.
    ScoreOverlay,
}

impl LayerId {
    /// Every layer in drawing order.
    pub const ALL: [LayerId; 4] = [
        LayerId::Background,
        LayerId::Foreground,
        LayerId::Control,
        LayerId::ScoreOverlay,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Foreground => 1,
            Self::Control => 2,
            Self::ScoreOverlay => 3,
        }
    }
}

/// Handle to a node stored inside a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Horizontal alignment of text within its box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Glyphs start at the left edge.
    #[default]
    Left,
    /// Glyphs are centred within the box width.
    Center,
}

/// Geometry of a scene node in its local coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Container without geometry of its own.
    Group,
    /// Circle centred on the origin.
    Circle {
        /// Circle radius.
        radius: f32,
    },
    /// Pie slice starting at the positive x axis and sweeping clockwise.
    Wedge {
        /// Slice radius.
        radius: f32,
        /// Sweep angle in degrees.
        angle_deg: f32,
    },
    /// Axis-aligned rectangle anchored at its top-left corner.
    Rect {
        /// Rectangle width.
        width: f32,
        /// Rectangle height.
        height: f32,
    },
    /// Regular polygon centred on the origin with its first vertex at the top.
    RegularPolygon {
        /// Number of sides, at least three.
        sides: u32,
        /// Circumradius.
        radius: f32,
    },
    /// Single line of text anchored at the top-left corner of its box.
    Text {
        /// Displayed text.
        content: String,
        /// Font size in pixels.
        font_size: f32,
        /// Fixed box width; measured from the content when absent.
        width: Option<f32>,
        /// Alignment within the box.
        align: TextAlign,
    },
}

impl Shape {
    /// Creates a left-aligned text shape with a measured width.
    #[must_use]
    pub fn text(content: impl Into<String>, font_size: f32) -> Self {
        Self::Text {
            content: content.into(),
            font_size,
            width: None,
            align: TextAlign::Left,
        }
    }

    /// Measured box of a text shape, `None` for other shapes.
    #[must_use]
    pub fn text_size(&self) -> Option<Vec2> {
        match self {
            Self::Text {
                content,
                font_size,
                width,
                ..
            } => {
                let measured = content.chars().count() as f32 * font_size * TEXT_WIDTH_FACTOR;
                Some(Vec2::new(width.unwrap_or(measured), *font_size))
            }
            _ => None,
        }
    }

    /// Outline of the shape as a closed polygon in local coordinates.
    ///
    /// Groups and empty text produce no outline.
    #[must_use]
    pub fn outline(&self) -> Vec<Vec2> {
        match self {
            Self::Group => Vec::new(),
            Self::Circle { radius } => arc_points(*radius, TAU, CIRCLE_SEGMENTS, false),
            Self::Wedge { radius, angle_deg } => {
                if *angle_deg >= 360.0 {
                    return arc_points(*radius, TAU, CIRCLE_SEGMENTS, false);
                }
                let sweep = angle_deg.max(0.0).to_radians();
                let segments =
                    ((CIRCLE_SEGMENTS as f32 * sweep / TAU).ceil() as usize).max(2);
                let mut points = vec![Vec2::ZERO];
                points.extend(arc_points(*radius, sweep, segments, true));
                points
            }
            Self::Rect { width, height } => rect_points(*width, *height),
            Self::RegularPolygon { sides, radius } => {
                let sides = (*sides).max(3);
                (0..sides)
                    .map(|index| {
                        let angle = TAU * index as f32 / sides as f32;
                        Vec2::new(radius * angle.sin(), -radius * angle.cos())
                    })
                    .collect()
            }
            Self::Text { content, .. } => {
                if content.is_empty() {
                    return Vec::new();
                }
                let size = self.text_size().unwrap_or(Vec2::ZERO);
                rect_points(size.x, size.y)
            }
        }
    }

    /// Reports whether the local point lies inside the shape.
    #[must_use]
    pub fn contains(&self, local: Vec2) -> bool {
        if !local.is_finite() {
            return false;
        }
        match self {
            Self::Group => false,
            Self::Circle { radius } => local.length() <= *radius,
            Self::Rect { width, height } => {
                local.x >= 0.0 && local.y >= 0.0 && local.x <= *width && local.y <= *height
            }
            Self::Wedge { .. } | Self::RegularPolygon { .. } | Self::Text { .. } => {
                point_in_polygon(local, &self.outline())
            }
        }
    }
}

fn arc_points(radius: f32, sweep: f32, segments: usize, inclusive: bool) -> Vec<Vec2> {
    let steps = if inclusive { segments + 1 } else { segments };
    (0..steps)
        .map(|step| {
            let angle = sweep * step as f32 / segments as f32;
            Vec2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn rect_points(width: f32, height: f32) -> Vec<Vec2> {
    vec![
        Vec2::ZERO,
        Vec2::new(width, 0.0),
        Vec2::new(width, height),
        Vec2::new(0.0, height),
    ]
}

fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut previous = polygon[polygon.len() - 1];
    for &current in polygon {
        let crosses = (current.y > point.y) != (previous.y > point.y);
        if crosses {
            let intersect_x =
                (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y)
                    + current.x;
            if point.x < intersect_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Styling and transform attributes of a scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttrs {
    /// Translation relative to the parent.
    pub position: Vec2,
    /// Local point that is mapped onto `position`.
    pub offset: Vec2,
    /// Clockwise rotation in degrees around `position`.
    pub rotation_deg: f32,
    /// Per-axis scale factors.
    pub scale: Vec2,
    /// Opacity multiplied into every descendant.
    pub opacity: f32,
    /// Fill color, if the shape is filled.
    pub fill: Option<Color>,
    /// Stroke color, if the shape is outlined.
    pub stroke: Option<Color>,
    /// Stroke width in local units.
    pub stroke_width: f32,
    /// Whether the node and its descendants are drawn.
    pub visible: bool,
    /// Whether the node and its descendants receive taps.
    pub listening: bool,
}

impl Default for NodeAttrs {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            offset: Vec2::ZERO,
            rotation_deg: 0.0,
            scale: Vec2::ONE,
            opacity: 1.0,
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            visible: true,
            listening: true,
        }
    }
}

impl NodeAttrs {
    /// Default attributes positioned at `(x, y)`.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// Sets the fill color.
    #[must_use]
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Sets the stroke color and width.
    #[must_use]
    pub fn with_stroke(mut self, stroke: Color, width: f32) -> Self {
        self.stroke = Some(stroke);
        self.stroke_width = width;
        self
    }

    /// Sets the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the offset.
    #[must_use]
    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    /// Sets the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation_deg: f32) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    /// Sets visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets whether the node receives taps.
    #[must_use]
    pub fn with_listening(mut self, listening: bool) -> Self {
        self.listening = listening;
        self
    }

    /// Transform from the node's local space into its parent's space.
    #[must_use]
    pub fn local_transform(&self) -> Affine2 {
        Affine2::from_translation(self.position)
            * Affine2::from_angle(self.rotation_deg.to_radians())
            * Affine2::from_scale(self.scale)
            * Affine2::from_translation(-self.offset)
    }
}

/// Node stored inside a [`Scene`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    shape: Shape,
    attrs: NodeAttrs,
    layer: LayerId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// Geometry of the node.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Styling and transform attributes.
    #[must_use]
    pub fn attrs(&self) -> &NodeAttrs {
        &self.attrs
    }

    /// Layer that owns the node.
    #[must_use]
    pub const fn layer(&self) -> LayerId {
        self.layer
    }

    /// Containing group, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in drawing order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Node prepared for drawing with its composed transform and opacity.
#[derive(Clone, Copy, Debug)]
pub struct VisibleNode<'a> {
    /// Node being drawn.
    pub node: &'a SceneNode,
    /// Transform from local space into stage space.
    pub transform: Affine2,
    /// Opacity composed with every ancestor.
    pub opacity: f32,
}

#[derive(Clone, Debug)]
struct LayerState {
    roots: Vec<NodeId>,
    visible: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            visible: true,
        }
    }
}

/// Stage containing every layer and node.
#[derive(Debug)]
pub struct Scene {
    width: f32,
    height: f32,
    nodes: HashMap<NodeId, SceneNode>,
    layers: [LayerState; 4],
    next_id: u32,
}

impl Scene {
    /// Creates an empty stage with the provided dimensions.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            nodes: HashMap::new(),
            layers: Default::default(),
            next_id: 0,
        }
    }

    /// Stage width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Stage height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Number of live nodes across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the stage holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a root node to `layer`, drawn above existing roots.
    pub fn add(&mut self, layer: LayerId, shape: Shape, attrs: NodeAttrs) -> NodeId {
        let id = self.allocate(layer, None, shape, attrs);
        self.layers[layer.index()].roots.push(id);
        id
    }

    /// Adds a node inside `parent`, drawn above its existing children.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        shape: Shape,
        attrs: NodeAttrs,
    ) -> Result<NodeId, SceneError> {
        let layer = self.node(parent)?.layer;
        let id = self.allocate(layer, Some(parent), shape, attrs);
        self.nodes
            .get_mut(&parent)
            .ok_or(SceneError::MissingNode { node: parent })?
            .children
            .push(id);
        Ok(id)
    }

    fn allocate(
        &mut self,
        layer: LayerId,
        parent: Option<NodeId>,
        shape: Shape,
        attrs: NodeAttrs,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.nodes.insert(
            id,
            SceneNode {
                shape,
                attrs,
                layer,
                parent,
                children: Vec::new(),
            },
        );
        id
    }

    /// Removes a node together with all of its descendants.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.nodes.remove(&id).ok_or(SceneError::MissingNode { node: id })?;
        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.layers[node.layer.index()]
                .roots
                .retain(|root| *root != id),
        }
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                pending.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Removes every descendant of `id` while keeping the node itself.
    pub fn destroy_children(&mut self, id: NodeId) -> Result<(), SceneError> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.destroy(child)?;
        }
        Ok(())
    }

    /// Reports whether the handle refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::MissingNode { node: id })
    }

    /// Looks up a node's attributes.
    pub fn attrs(&self, id: NodeId) -> Result<&NodeAttrs, SceneError> {
        self.node(id).map(SceneNode::attrs)
    }

    /// Mutable access to a node's attributes.
    pub fn attrs_mut(&mut self, id: NodeId) -> Result<&mut NodeAttrs, SceneError> {
        self.nodes
            .get_mut(&id)
            .map(|node| &mut node.attrs)
            .ok_or(SceneError::MissingNode { node: id })
    }

    /// Mutable access to a node's geometry.
    pub fn shape_mut(&mut self, id: NodeId) -> Result<&mut Shape, SceneError> {
        self.nodes
            .get_mut(&id)
            .map(|node| &mut node.shape)
            .ok_or(SceneError::MissingNode { node: id })
    }

    /// Replaces the content of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), SceneError> {
        match self.shape_mut(id)? {
            Shape::Text { content, .. } => {
                *content = text.into();
                Ok(())
            }
            _ => Err(SceneError::NotText { node: id }),
        }
    }

    /// Root nodes of `layer` in drawing order.
    #[must_use]
    pub fn roots(&self, layer: LayerId) -> &[NodeId] {
        &self.layers[layer.index()].roots
    }

    /// Shows or hides an entire layer.
    pub fn set_layer_visible(&mut self, layer: LayerId, visible: bool) {
        self.layers[layer.index()].visible = visible;
    }

    /// Reports whether `layer` is drawn.
    #[must_use]
    pub fn is_layer_visible(&self, layer: LayerId) -> bool {
        self.layers[layer.index()].visible
    }

    /// Reports whether `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(&node).and_then(|entry| entry.parent);
        }
        false
    }

    /// Transform from the node's local space into stage space.
    pub fn world_transform(&self, id: NodeId) -> Result<Affine2, SceneError> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            let entry = self.node(node)?;
            chain.push(entry.attrs.local_transform());
            current = entry.parent;
        }
        Ok(chain
            .into_iter()
            .rev()
            .fold(Affine2::IDENTITY, |acc, local| acc * local))
    }

    /// Stage position of the node's local origin.
    pub fn world_position(&self, id: NodeId) -> Result<Vec2, SceneError> {
        Ok(self.world_transform(id)?.transform_point2(Vec2::ZERO))
    }

    /// Returns the topmost visible, listening node whose shape contains `point`.
    #[must_use]
    pub fn hit_test(&self, point: Vec2) -> Option<NodeId> {
        for layer in LayerId::ALL.iter().rev() {
            let state = &self.layers[layer.index()];
            if !state.visible {
                continue;
            }
            for root in state.roots.iter().rev() {
                if let Some(hit) = self.hit_node(*root, Affine2::IDENTITY, point) {
                    return Some(hit);
                }
            }
        }
        None
    }

    fn hit_node(&self, id: NodeId, parent: Affine2, point: Vec2) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        if !node.attrs.visible || !node.attrs.listening {
            return None;
        }
        let transform = parent * node.attrs.local_transform();
        for child in node.children.iter().rev() {
            if let Some(hit) = self.hit_node(*child, transform, point) {
                return Some(hit);
            }
        }
        let local = transform.inverse().transform_point2(point);
        node.shape.contains(local).then_some(id)
    }

    /// Flattens every visible node in drawing order.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<VisibleNode<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for layer in LayerId::ALL {
            let state = &self.layers[layer.index()];
            if !state.visible {
                continue;
            }
            for root in &state.roots {
                self.collect_visible(*root, Affine2::IDENTITY, 1.0, &mut out);
            }
        }
        out
    }

    fn collect_visible<'a>(
        &'a self,
        id: NodeId,
        parent: Affine2,
        parent_opacity: f32,
        out: &mut Vec<VisibleNode<'a>>,
    ) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.attrs.visible {
            return;
        }
        let transform = parent * node.attrs.local_transform();
        let opacity = parent_opacity * node.attrs.opacity.clamp(0.0, 1.0);
        out.push(VisibleNode {
            node,
            transform,
            opacity,
        });
        for child in &node.children {
            self.collect_visible(*child, transform, opacity, out);
        }
    }
}

/// Errors raised by scene graph lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// The handle does not refer to a live node.
    MissingNode {
        /// Handle that failed to resolve.
        node: NodeId,
    },
    /// A text operation targeted a node that is not text.
    NotText {
        /// Handle of the offending node.
        node: NodeId,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode { node } => write!(f, "scene node {} does not exist", node.get()),
            Self::NotText { node } => write!(f, "scene node {} is not a text node", node.get()),
        }
    }
}

impl Error for SceneError {}
