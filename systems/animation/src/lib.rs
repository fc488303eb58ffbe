#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-layer animation driver shared by the background and foreground layers.
//!
//! A driver accumulates elapsed time while running and reports the phase
//! within the configured period. Layers turn that phase into node attributes,
//! so every style is a pure function of `elapsed mod period`.

use std::time::Duration;

use log::warn;
use thiserror::Error;
use vision_drill_core::AnimationMode;
use vision_drill_rendering::SceneError;

/// Step used by the fixed-interval fallback policy.
pub const INTERVAL_STEP: Duration = Duration::from_millis(80);

/// Failures raised by an animation driver or the tick it drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// The driver was started with a zero-length period.
    #[error("animation period must be greater than zero")]
    ZeroPeriod,
    /// A tick attempted to mutate a node that no longer exists.
    #[error("animation tick failed: {0}")]
    Scene(#[from] SceneError),
}

/// Position inside an animation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phase {
    elapsed: Duration,
    period: Duration,
}

impl Phase {
    /// Creates a phase, wrapping `elapsed` into the period.
    #[must_use]
    pub fn new(elapsed: Duration, period: Duration) -> Self {
        let elapsed = if period.is_zero() {
            Duration::ZERO
        } else {
            let wrapped = elapsed.as_nanos() % period.as_nanos();
            Duration::from_nanos(wrapped as u64)
        };
        Self { elapsed, period }
    }

    /// Time elapsed since the cycle began.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Length of a full cycle.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Elapsed share of the cycle in `0.0..1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.period.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.period.as_secs_f64()) as f32
    }
}

/// Time source owned by a single layer.
///
/// Starting always stops the previous run first, so a layer can never have two
/// live drivers.
#[derive(Clone, Debug)]
pub struct AnimationDriver {
    mode: AnimationMode,
    period: Duration,
    elapsed: Duration,
    pending: Duration,
    running: bool,
}

impl AnimationDriver {
    /// Creates a stopped driver.
    #[must_use]
    pub const fn new(mode: AnimationMode, period: Duration) -> Self {
        Self {
            mode,
            period,
            elapsed: Duration::ZERO,
            pending: Duration::ZERO,
            running: false,
        }
    }

    /// Driver policy.
    #[must_use]
    pub const fn mode(&self) -> AnimationMode {
        self.mode
    }

    /// Cycle length.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Reports whether the driver is producing phases.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Current phase, regardless of whether the driver is running.
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::new(self.elapsed, self.period)
    }

    /// Restarts the cycle from zero.
    pub fn start(&mut self) -> Result<(), AnimationError> {
        let _ = self.stop();
        if self.period.is_zero() {
            return Err(AnimationError::ZeroPeriod);
        }
        self.elapsed = Duration::ZERO;
        self.pending = Duration::ZERO;
        self.running = true;
        Ok(())
    }

    /// Resumes a stopped driver without resetting its phase.
    pub fn resume(&mut self) -> Result<(), AnimationError> {
        if self.period.is_zero() {
            return Err(AnimationError::ZeroPeriod);
        }
        self.pending = Duration::ZERO;
        self.running = true;
        Ok(())
    }

    /// Stops the driver. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Advances the driver by `dt` and returns the phase to render, if any.
    ///
    /// Frame mode reports a phase on every call. Interval mode only reports
    /// when at least one fixed step has elapsed and advances by whole steps.
    pub fn advance(&mut self, dt: Duration) -> Option<Phase> {
        if !self.running {
            return None;
        }
        let step = match self.mode {
            AnimationMode::Frame => dt,
            AnimationMode::Interval => {
                self.pending = self.pending.saturating_add(dt);
                let steps = self.pending.as_nanos() / INTERVAL_STEP.as_nanos();
                if steps == 0 {
                    return None;
                }
                let step = INTERVAL_STEP * steps as u32;
                self.pending -= step;
                step
            }
        };
        self.elapsed = Phase::new(self.elapsed.saturating_add(step), self.period).elapsed;
        Some(self.phase())
    }

    /// Advances the driver and applies the resulting phase with `apply`.
    ///
    /// A failing tick is logged and stops the driver, leaving the layer static.
    pub fn tick<F>(&mut self, dt: Duration, layer: &str, apply: F)
    where
        F: FnOnce(Phase) -> Result<(), AnimationError>,
    {
        let Some(phase) = self.advance(dt) else {
            return;
        };
        if let Err(error) = apply(phase) {
            warn!("{layer} animation stopped: {error}");
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn frame_mode_wraps_at_the_period() {
        let mut driver = AnimationDriver::new(AnimationMode::Frame, millis(1_000));
        driver.start().expect("non-zero period");
        assert_eq!(driver.advance(millis(600)).map(|p| p.elapsed()), Some(millis(600)));
        assert_eq!(driver.advance(millis(600)).map(|p| p.elapsed()), Some(millis(200)));
    }

    #[test]
    fn interval_mode_fires_whole_steps_only() {
        let mut driver = AnimationDriver::new(AnimationMode::Interval, millis(10_000));
        driver.start().expect("non-zero period");
        assert_eq!(driver.advance(millis(50)), None);
        assert_eq!(driver.advance(millis(50)).map(|p| p.elapsed()), Some(millis(80)));
        assert_eq!(driver.advance(millis(200)).map(|p| p.elapsed()), Some(millis(240)));
    }

    #[test]
    fn stopped_driver_reports_nothing_and_stop_is_idempotent() {
        let mut driver = AnimationDriver::new(AnimationMode::Frame, millis(1_000));
        driver.start().expect("non-zero period");
        assert!(driver.stop());
        assert!(!driver.stop());
        assert_eq!(driver.advance(millis(16)), None);
    }

    #[test]
    fn restart_resets_the_cycle() {
        let mut driver = AnimationDriver::new(AnimationMode::Frame, millis(1_000));
        driver.start().expect("non-zero period");
        let _ = driver.advance(millis(300));
        driver.start().expect("non-zero period");
        assert_eq!(driver.phase().elapsed(), Duration::ZERO);
        assert!(driver.is_running());
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut driver = AnimationDriver::new(AnimationMode::Frame, Duration::ZERO);
        assert_eq!(driver.start(), Err(AnimationError::ZeroPeriod));
        assert!(!driver.is_running());
    }

    #[test]
    fn failing_tick_stops_the_driver() {
        let mut driver = AnimationDriver::new(AnimationMode::Frame, millis(1_000));
        driver.start().expect("non-zero period");
        driver.tick(millis(16), "test", |_| Err(AnimationError::ZeroPeriod));
        assert!(!driver.is_running());
    }

    #[test]
    fn phase_fraction_tracks_elapsed_share() {
        let phase = Phase::new(millis(2_500), millis(2_000));
        assert_eq!(phase.elapsed(), millis(500));
        assert!((phase.fraction() - 0.25).abs() < 1e-6);
    }
}
