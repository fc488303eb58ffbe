use vision_drill_core::{Command, Event, GameId, RoundSetup};
use vision_drill_system_progression::Progression;
use vision_drill_world::{self as world, query, GameState};

fn complete_round(state: &mut GameState, progression: &mut Progression) -> Vec<Event> {
    let mut commands = Vec::new();
    progression.handle(true, &query::snapshot(state), &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(state, command, &mut events);
    }
    events
}

#[test]
fn max_speed_rounds_advance_one_level_each_until_the_cap() {
    let mut state = GameState::new(RoundSetup::for_game(GameId::RotationDigital));
    let mut progression = Progression;
    let mut events = Vec::new();
    world::apply(
        &mut state,
        Command::SetProgression { level: 1, speed: 3 },
        &mut events,
    );

    for expected_level in 2..=5 {
        let _ = complete_round(&mut state, &mut progression);
        assert_eq!(query::level(&state), expected_level);
        assert_eq!(query::speed(&state), 0);
        world::apply(
            &mut state,
            Command::SetProgression {
                level: expected_level,
                speed: 3,
            },
            &mut events,
        );
    }

    let events = complete_round(&mut state, &mut progression);
    assert_eq!(query::level(&state), 5);
    assert_eq!(query::speed(&state), 0);
    assert_eq!(events, vec![Event::SpeedChanged { speed: 0 }]);
}

#[test]
fn first_completed_round_raises_speed_only() {
    let mut state = GameState::new(RoundSetup::for_game(GameId::RotationDigital));
    let events = complete_round(&mut state, &mut Progression);
    assert_eq!(query::level(&state), 1);
    assert_eq!(query::speed(&state), 1);
    assert_eq!(events, vec![Event::SpeedChanged { speed: 1 }]);
}

#[test]
fn full_climb_visits_every_level_and_speed() {
    let mut state = GameState::new(RoundSetup::for_game(GameId::RotationDigital));
    let mut progression = Progression;
    let mut visited = vec![(1, 0)];
    for _ in 0..19 {
        let _ = complete_round(&mut state, &mut progression);
        visited.push((query::level(&state), query::speed(&state)));
    }
    let expected: Vec<(u32, u32)> = (1..=5)
        .flat_map(|level| (0..=3).map(move |speed| (level, speed)))
        .collect();
    assert_eq!(visited, expected);
}
