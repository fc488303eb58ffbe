#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure level and speed progression applied after a completed round.

use vision_drill_core::{Command, GameSnapshot};

/// Level and speed that follow a completed round.
///
/// Speed climbs first; once it is at its cap the level advances and speed
/// drops back to zero. The last level stays put with speed reset.
#[must_use]
pub fn next_step(snapshot: &GameSnapshot) -> (u32, u32) {
    if snapshot.speed < snapshot.max_speed {
        return (snapshot.level, snapshot.speed + 1);
    }
    if snapshot.level >= snapshot.max_level {
        (snapshot.max_level, 0)
    } else {
        (snapshot.level + 1, 0)
    }
}

/// Pure system that emits progression commands for completed rounds.
#[derive(Debug, Default)]
pub struct Progression;

impl Progression {
    /// Emits a single [`Command::SetProgression`] when the round is complete.
    pub fn handle(&mut self, round_complete: bool, snapshot: &GameSnapshot, out: &mut Vec<Command>) {
        if !round_complete {
            return;
        }
        let (level, speed) = next_step(snapshot);
        out.push(Command::SetProgression { level, speed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vision_drill_core::GameId;

    fn snapshot(level: u32, speed: u32) -> GameSnapshot {
        GameSnapshot {
            game: GameId::RotationDigital,
            score: 0,
            level,
            speed,
            max_level: 5,
            max_speed: 3,
            time_secs: 30,
        }
    }

    #[test]
    fn speed_climbs_before_level() {
        assert_eq!(next_step(&snapshot(1, 0)), (1, 1));
        assert_eq!(next_step(&snapshot(2, 2)), (2, 3));
    }

    #[test]
    fn level_advances_at_max_speed() {
        assert_eq!(next_step(&snapshot(1, 3)), (2, 0));
        assert_eq!(next_step(&snapshot(5, 3)), (5, 0));
    }

    #[test]
    fn incomplete_round_emits_nothing() {
        let mut commands = Vec::new();
        Progression.handle(false, &snapshot(1, 0), &mut commands);
        assert!(commands.is_empty());
    }
}
