#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Coarse countdown timer that bounds a round.

use std::time::Duration;

/// Configuration parameters required to construct the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    tick_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided tick cadence.
    #[must_use]
    pub const fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Signals produced while the countdown runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownTick {
    /// Remaining seconds to display on the HUD.
    Display {
        /// Seconds left before the round ends.
        remaining: u32,
    },
    /// The countdown dropped below zero.
    Expired,
}

/// Countdown that displays `time, time - 1, ..., 0` and then expires.
#[derive(Debug)]
pub struct Countdown {
    tick_interval: Duration,
    accumulator: Duration,
    remaining: i64,
    running: bool,
}

impl Countdown {
    /// Creates a stopped countdown.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            accumulator: Duration::ZERO,
            remaining: 0,
            running: false,
        }
    }

    /// Starts counting down from `time_secs`.
    pub fn start(&mut self, time_secs: u32) {
        self.remaining = i64::from(time_secs);
        self.accumulator = Duration::ZERO;
        self.running = true;
    }

    /// Stops ticking, keeping the remaining time. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Continues from the remaining time with a fresh tick interval.
    pub fn resume(&mut self) {
        if self.remaining < 0 {
            return;
        }
        self.accumulator = Duration::ZERO;
        self.running = true;
    }

    /// Reports whether the countdown is ticking.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds that the next tick will display, saturating at zero.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        u32::try_from(self.remaining.max(0)).unwrap_or(u32::MAX)
    }

    /// Advances the countdown by `dt`, pushing every tick that fell due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<CountdownTick>) {
        if !self.running || self.tick_interval.is_zero() {
            return;
        }
        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.tick_interval {
            self.accumulator -= self.tick_interval;
            out.push(CountdownTick::Display {
                remaining: self.remaining(),
            });
            self.remaining -= 1;
            if self.remaining < 0 {
                out.push(CountdownTick::Expired);
                self.running = false;
                self.accumulator = Duration::ZERO;
                return;
            }
        }
    }
}
