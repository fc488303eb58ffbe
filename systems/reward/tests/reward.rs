use vision_drill_system_reward::{award_for, RewardReveal, RewardStep};

fn run(reveal: &mut RewardReveal) -> (u32, usize) {
    let mut steps = 0;
    loop {
        steps += 1;
        assert!(steps < 10_000, "reward loop must terminate");
        match reveal.step() {
            RewardStep::Running { bonus } => assert!(bonus <= reveal.award()),
            RewardStep::Finished { bonus } => return (bonus, steps),
        }
    }
}

#[test]
fn reveal_terminates_just_past_the_award() {
    for seed in 0..32 {
        for base in [0, 30, 175, 1_000] {
            let mut reveal = RewardReveal::new(base, seed);
            let (bonus, _) = run(&mut reveal);
            assert!(bonus > award_for(base));
            assert!(bonus <= award_for(base) + 4);
        }
    }
}

#[test]
fn bonus_never_decreases() {
    let mut reveal = RewardReveal::new(90, 8);
    let mut previous = 0;
    while !reveal.is_finished() {
        let bonus = match reveal.step() {
            RewardStep::Running { bonus } | RewardStep::Finished { bonus } => bonus,
        };
        assert!(bonus >= previous);
        previous = bonus;
    }
}

#[test]
fn same_seed_replays_the_same_sequence() {
    let mut first = RewardReveal::new(60, 21);
    let mut second = RewardReveal::new(60, 21);
    assert_eq!(run(&mut first), run(&mut second));
}
