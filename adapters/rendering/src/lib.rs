#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Vision Drill adapters.
//!
//! The crate exposes a retained 2D scene graph ([`Scene`]) made of layered,
//! transformable nodes, attribute tweens ([`Tweens`]), and the
//! [`RenderingBackend`] trait implemented by concrete adapters. Game code only
//! composes and mutates nodes; backends decide how to draw them.

mod scene;
mod tween;

pub use scene::{
    LayerId, NodeAttrs, NodeId, Scene, SceneError, SceneNode, Shape, TextAlign, VisibleNode,
};
pub use tween::{Easing, TweenTarget, Tweens};

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use vision_drill_core::PaletteColor;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha multiplied by `opacity`.
    #[must_use]
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            alpha: self.alpha * opacity.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl From<PaletteColor> for Color {
    fn from(color: PaletteColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Stage position of a tap or click registered on this frame.
    pub tap: Option<Vec2>,
    /// Whether the adapter detected a pause toggle on this frame.
    pub pause_toggle: bool,
}

/// Instruction returned by a [`FrameSource`] after each update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDirective {
    /// Keep presenting frames.
    Continue,
    /// Close the presentation.
    Exit,
}

/// Window-level settings applied when presenting a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title displayed by the window.
    pub window_title: String,
    /// Color used to clear the frame before drawing layers.
    pub clear_color: Color,
    /// Stage width in pixels.
    pub width: u32,
    /// Stage height in pixels.
    pub height: u32,
}

impl Presentation {
    /// Creates a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, width: u32, height: u32) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            width,
            height,
        }
    }
}

/// Owner of a scene that advances it once per presented frame.
pub trait FrameSource {
    /// Advances the simulation by `dt` using the input captured for this frame.
    fn update(&mut self, dt: Duration, input: FrameInput) -> FrameDirective;

    /// Scene to draw after the update.
    fn scene(&self) -> &Scene;
}

/// Rendering backend capable of presenting Vision Drill scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the source or the user requests an exit.
    ///
    /// Each frame the backend gathers input, calls [`FrameSource::update`]
    /// exactly once, and then draws [`FrameSource::scene`] layer by layer in
    /// z-order. Updates never overlap.
    fn run<S>(self, presentation: Presentation, source: S) -> AnyResult<()>
    where
        S: FrameSource + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_convert_to_opaque_channels() {
        let color = Color::from(PaletteColor::from_rgb(255, 0, 51));
        assert_eq!(color, Color::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn fading_scales_alpha_only() {
        let color = Color::from_rgb_u8(10, 20, 30).faded(0.25);
        assert!((color.alpha - 0.25).abs() < f32::EPSILON);
        assert_eq!(color.red, Color::from_rgb_u8(10, 20, 30).red);
    }
}
