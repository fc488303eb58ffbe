//! Time-based attribute interpolation for scene nodes.

use std::time::Duration;

use crate::{NodeId, Scene, SceneError};

/// Easing curve applied to tween progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant rate.
    #[default]
    Linear,
    /// Starts slow and accelerates.
    EaseIn,
    /// Starts fast and decelerates.
    EaseOut,
}

impl Easing {
    /// Maps linear progress in `0.0..=1.0` onto the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => -t * (t - 2.0),
        }
    }
}

/// Attribute values a tween converges to.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct TweenTarget {
    /// Final opacity, left untouched when absent.
    pub opacity: Option<f32>,
    /// Final horizontal position, left untouched when absent.
    pub x: Option<f32>,
}

impl TweenTarget {
    /// Targets only the opacity.
    #[must_use]
    pub const fn opacity(opacity: f32) -> Self {
        Self {
            opacity: Some(opacity),
            x: None,
        }
    }

    /// Targets only the horizontal position.
    #[must_use]
    pub const fn x(x: f32) -> Self {
        Self {
            opacity: None,
            x: Some(x),
        }
    }
}

#[derive(Debug)]
struct Tween<T> {
    node: NodeId,
    start_opacity: f32,
    start_x: f32,
    target: TweenTarget,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
    tag: T,
}

/// Set of running tweens, each identified by a caller-defined completion tag.
///
/// At most one tween runs per node; playing a new one replaces the old one
/// without reporting its completion.
#[derive(Debug)]
pub struct Tweens<T> {
    active: Vec<Tween<T>>,
}

impl<T> Default for Tweens<T> {
    fn default() -> Self {
        Self { active: Vec::new() }
    }
}

impl<T> Tweens<T> {
    /// Creates an empty tween set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts interpolating `node` from its current attributes to `target`.
    pub fn play(
        &mut self,
        scene: &Scene,
        node: NodeId,
        target: TweenTarget,
        duration: Duration,
        easing: Easing,
        tag: T,
    ) -> Result<(), SceneError> {
        let attrs = scene.attrs(node)?;
        let tween = Tween {
            node,
            start_opacity: attrs.opacity,
            start_x: attrs.position.x,
            target,
            duration,
            elapsed: Duration::ZERO,
            easing,
            tag,
        };
        let _ = self.cancel(node);
        self.active.push(tween);
        Ok(())
    }

    /// Advances every tween by `dt` and returns the tags of those that completed.
    ///
    /// Tweens whose node no longer exists are discarded silently.
    pub fn advance(&mut self, scene: &mut Scene, dt: Duration) -> Vec<T> {
        let mut completed = Vec::new();
        let mut remaining = Vec::with_capacity(self.active.len());
        for mut tween in self.active.drain(..) {
            let Ok(attrs) = scene.attrs_mut(tween.node) else {
                continue;
            };
            tween.elapsed = tween.elapsed.saturating_add(dt);
            let progress = if tween.duration.is_zero() {
                1.0
            } else {
                (tween.elapsed.as_secs_f32() / tween.duration.as_secs_f32()).min(1.0)
            };
            let eased = tween.easing.apply(progress);
            if let Some(opacity) = tween.target.opacity {
                attrs.opacity = lerp(tween.start_opacity, opacity, eased);
            }
            if let Some(x) = tween.target.x {
                attrs.position.x = lerp(tween.start_x, x, eased);
            }
            if progress >= 1.0 {
                completed.push(tween.tag);
            } else {
                remaining.push(tween);
            }
        }
        self.active = remaining;
        completed
    }

    /// Stops the tween running on `node`, leaving attributes where they are.
    pub fn cancel(&mut self, node: NodeId) -> bool {
        let before = self.active.len();
        self.active.retain(|tween| tween.node != node);
        before != self.active.len()
    }

    /// Stops every tween.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Reports whether `node` is being animated.
    #[must_use]
    pub fn is_animating(&self, node: NodeId) -> bool {
        self.active.iter().any(|tween| tween.node == node)
    }

    /// Reports whether no tween is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
