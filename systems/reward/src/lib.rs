#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomised bonus accumulation shown after a round ends.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BASE_AWARD: u32 = 50;
const SCORE_SHARE_DIVISOR: u32 = 4;
const MAX_INCREMENT: u32 = 4;

/// Bonus target for a round that ended with `base_score` points.
#[must_use]
pub const fn award_for(base_score: u32) -> u32 {
    BASE_AWARD + base_score / SCORE_SHARE_DIVISOR
}

/// State reported after each reward step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardStep {
    /// The bonus is still climbing.
    Running {
        /// Bonus accumulated so far.
        bonus: u32,
    },
    /// The bonus exceeded the award and stopped.
    Finished {
        /// Final bonus.
        bonus: u32,
    },
}

/// Frame-driven bonus counter.
#[derive(Debug)]
pub struct RewardReveal {
    base_score: u32,
    award: u32,
    bonus: u32,
    finished: bool,
    rng: ChaCha8Rng,
}

impl RewardReveal {
    /// Creates a reveal for a round that ended with `base_score` points.
    #[must_use]
    pub fn new(base_score: u32, seed: u64) -> Self {
        Self {
            base_score,
            award: award_for(base_score),
            bonus: 0,
            finished: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Score earned during the round.
    #[must_use]
    pub const fn base_score(&self) -> u32 {
        self.base_score
    }

    /// Threshold the bonus must exceed.
    #[must_use]
    pub const fn award(&self) -> u32 {
        self.award
    }

    /// Bonus accumulated so far.
    #[must_use]
    pub const fn bonus(&self) -> u32 {
        self.bonus
    }

    /// Reports whether the bonus stopped climbing.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adds a random increment in `0..=4` unless the reveal already finished.
    pub fn step(&mut self) -> RewardStep {
        if self.finished {
            return RewardStep::Finished { bonus: self.bonus };
        }
        self.bonus += self.rng.gen_range(0..=MAX_INCREMENT);
        if self.bonus > self.award {
            self.finished = true;
            RewardStep::Finished { bonus: self.bonus }
        } else {
            RewardStep::Running { bonus: self.bonus }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_adds_a_quarter_of_the_score() {
        assert_eq!(award_for(0), 50);
        assert_eq!(award_for(30), 57);
        assert_eq!(award_for(400), 150);
    }

    #[test]
    fn finished_reveal_stays_finished() {
        let mut reveal = RewardReveal::new(0, 1);
        while !reveal.is_finished() {
            let _ = reveal.step();
        }
        let bonus = reveal.bonus();
        assert_eq!(reveal.step(), RewardStep::Finished { bonus });
    }
}
