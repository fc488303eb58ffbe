#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Vision Drill.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Sound cues are therefore routed through the
//! session's audio sink rather than played here.
//!
//! The backend is immediate mode: every frame it clears the window, lets the
//! [`FrameSource`] update its scene once, and then draws the scene's visible
//! nodes in layer order.

use anyhow::Result;
use glam::{Affine2, Vec2};
use log::info;
use macroquad::input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton};
use macroquad::math::Vec2 as MacroquadVec2;
use std::{collections::VecDeque, time::Duration};
use vision_drill_rendering::{
    Color, FrameDirective, FrameInput, FrameSource, Presentation, RenderingBackend, Shape,
    TextAlign, VisibleNode,
};

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `P` or `Space` toggles pause.
    pause_toggle: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let pause_toggle = is_key_pressed(KeyCode::P) || is_key_pressed(KeyCode::Space);

        Self {
            quit_requested,
            pause_toggle,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<S>(self, presentation: Presentation, source: S) -> Result<()>
    where
        S: FrameSource + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            width,
            height,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(width).unwrap_or(i32::MAX),
            window_height: i32::try_from(height).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut source = source;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let metrics = {
                    let scene = source.scene();
                    StageMetrics::new(
                        Vec2::new(scene.width(), scene.height()),
                        Vec2::new(screen_width, screen_height),
                    )
                };
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input_from_observations(
                    &metrics,
                    Vec2::new(cursor_x, cursor_y),
                    is_mouse_button_pressed(MouseButton::Left),
                    keyboard,
                );

                let directive = source.update(frame_dt, frame_input);
                for visible in source.scene().visible_nodes() {
                    draw_node(&visible, &metrics);
                }

                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                    }) = fps_counter.record_frame(frame_dt)
                    {
                        info!("FPS: {per_second:.2} (10s avg: {trailing_ten_seconds:.2})");
                    }
                }

                if directive == FrameDirective::Exit {
                    break;
                }
                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Letterboxed mapping between stage pixels and window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
struct StageMetrics {
    scale: f32,
    offset: Vec2,
    stage: Vec2,
}

impl StageMetrics {
    fn new(stage: Vec2, screen: Vec2) -> Self {
        if stage.x <= f32::EPSILON || stage.y <= f32::EPSILON {
            return Self {
                scale: 0.0,
                offset: Vec2::ZERO,
                stage,
            };
        }
        let scale = (screen.x / stage.x).min(screen.y / stage.y).max(0.0);
        let offset = (screen - stage * scale) * 0.5;
        Self {
            scale,
            offset,
            stage,
        }
    }

    fn to_screen(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    fn to_stage(&self, screen: Vec2) -> Option<Vec2> {
        if self.scale <= f32::EPSILON {
            return None;
        }
        let point = (screen - self.offset) / self.scale;
        let inside =
            point.x >= 0.0 && point.y >= 0.0 && point.x <= self.stage.x && point.y <= self.stage.y;
        inside.then_some(point)
    }
}

fn gather_frame_input_from_observations(
    metrics: &StageMetrics,
    cursor_position: Vec2,
    left_click: bool,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    let tap = if left_click {
        metrics.to_stage(cursor_position)
    } else {
        None
    };
    FrameInput {
        tap,
        pause_toggle: keyboard.pause_toggle,
    }
}

/// Splits a closed outline into a triangle fan anchored at its first vertex.
fn fan_triangles(points: &[Vec2]) -> Vec<[Vec2; 3]> {
    let Some((&anchor, rest)) = points.split_first() else {
        return Vec::new();
    };
    rest.windows(2)
        .map(|pair| [anchor, pair[0], pair[1]])
        .collect()
}

/// Left edge of a text line inside its layout box.
fn aligned_text_left(align: TextAlign, box_width: Option<f32>, measured: f32) -> f32 {
    match (align, box_width) {
        (TextAlign::Center, Some(width)) => (width - measured) * 0.5,
        _ => 0.0,
    }
}

fn draw_node(visible: &VisibleNode<'_>, metrics: &StageMetrics) {
    let attrs = visible.node.attrs();
    match visible.node.shape() {
        Shape::Group => {}
        Shape::Text {
            content,
            font_size,
            width,
            align,
        } => {
            let Some(fill) = attrs.fill else {
                return;
            };
            draw_text_line(
                content,
                *font_size,
                *width,
                *align,
                visible.transform,
                fill.faded(visible.opacity),
                metrics,
            );
        }
        shape => {
            let outline: Vec<Vec2> = shape
                .outline()
                .into_iter()
                .map(|point| metrics.to_screen(visible.transform.transform_point2(point)))
                .collect();
            if let Some(fill) = attrs.fill {
                let color = to_macroquad_color(fill.faded(visible.opacity));
                for [a, b, c] in fan_triangles(&outline) {
                    macroquad::shapes::draw_triangle(
                        to_macroquad_vec(a),
                        to_macroquad_vec(b),
                        to_macroquad_vec(c),
                        color,
                    );
                }
            }
            if let Some(stroke) = attrs.stroke {
                let thickness = (attrs.stroke_width * metrics.scale).max(1.0);
                let color = to_macroquad_color(stroke.faded(visible.opacity));
                let mut previous = outline.last().copied();
                for point in &outline {
                    if let Some(start) = previous {
                        macroquad::shapes::draw_line(
                            start.x, start.y, point.x, point.y, thickness, color,
                        );
                    }
                    previous = Some(*point);
                }
            }
        }
    }
}

fn draw_text_line(
    content: &str,
    font_size: f32,
    box_width: Option<f32>,
    align: TextAlign,
    transform: Affine2,
    color: Color,
    metrics: &StageMetrics,
) {
    if content.is_empty() || font_size <= 0.0 {
        return;
    }
    let pixel_size = (font_size * metrics.scale).round().clamp(1.0, f32::from(u16::MAX));
    let dimensions = macroquad::text::measure_text(content, None, pixel_size as u16, 1.0);
    let measured = if metrics.scale <= f32::EPSILON {
        0.0
    } else {
        dimensions.width / metrics.scale
    };
    let left = aligned_text_left(align, box_width, measured);
    let baseline = metrics.to_screen(transform.transform_point2(Vec2::new(left, font_size)));
    macroquad::text::draw_text(
        content,
        baseline.x,
        baseline.y,
        pixel_size,
        to_macroquad_color(color),
    );
}

fn to_macroquad_vec(point: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(point.x, point.y)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_letterboxed_into_wider_windows() {
        let metrics = StageMetrics::new(Vec2::new(800.0, 600.0), Vec2::new(1600.0, 900.0));
        assert!((metrics.scale - 1.5).abs() < 1e-6);
        assert_eq!(metrics.offset, Vec2::new(200.0, 0.0));
        assert_eq!(metrics.to_screen(Vec2::new(800.0, 600.0)), Vec2::new(1400.0, 900.0));
    }

    #[test]
    fn clicks_map_back_to_stage_pixels() {
        let metrics = StageMetrics::new(Vec2::new(800.0, 600.0), Vec2::new(1600.0, 900.0));
        let input = gather_frame_input_from_observations(
            &metrics,
            Vec2::new(350.0, 150.0),
            true,
            KeyboardShortcuts::default(),
        );
        assert_eq!(input.tap, Some(Vec2::new(100.0, 100.0)));
        assert!(!input.pause_toggle);
    }

    #[test]
    fn clicks_in_the_letterbox_are_ignored() {
        let metrics = StageMetrics::new(Vec2::new(800.0, 600.0), Vec2::new(1600.0, 900.0));
        let input = gather_frame_input_from_observations(
            &metrics,
            Vec2::new(100.0, 450.0),
            true,
            KeyboardShortcuts::default(),
        );
        assert_eq!(input.tap, None);
    }

    #[test]
    fn cursor_without_click_produces_no_tap() {
        let metrics = StageMetrics::new(Vec2::new(800.0, 600.0), Vec2::new(800.0, 600.0));
        let keyboard = KeyboardShortcuts {
            quit_requested: false,
            pause_toggle: true,
        };
        let input =
            gather_frame_input_from_observations(&metrics, Vec2::new(10.0, 10.0), false, keyboard);
        assert_eq!(input.tap, None);
        assert!(input.pause_toggle);
    }

    #[test]
    fn degenerate_stage_never_produces_taps() {
        let metrics = StageMetrics::new(Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert_eq!(metrics.to_stage(Vec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn fan_covers_every_edge_of_a_convex_outline() {
        let square = [
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let triangles = fan_triangles(&square);
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().all(|triangle| triangle[0] == Vec2::ZERO));
        assert!(fan_triangles(&square[..2]).is_empty());
    }

    #[test]
    fn centred_text_splits_the_spare_width() {
        assert!((aligned_text_left(TextAlign::Center, Some(400.0), 100.0) - 150.0).abs() < 1e-6);
        assert_eq!(aligned_text_left(TextAlign::Left, Some(400.0), 100.0), 0.0);
        assert_eq!(aligned_text_left(TextAlign::Center, None, 100.0), 0.0);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        for _ in 0..3 {
            assert!(counter.record_frame(frame).is_none());
        }
        let metrics = counter.record_frame(frame).expect("one second elapsed");
        assert!((metrics.per_second - 4.0).abs() < 1e-3);
        assert!((metrics.trailing_ten_seconds - 4.0).abs() < 1e-3);
    }
}
