use std::time::Duration;

use vision_drill_system_countdown::{Config, Countdown, CountdownTick};

fn run_seconds(countdown: &mut Countdown, seconds: u64) -> Vec<CountdownTick> {
    let mut ticks = Vec::new();
    for _ in 0..seconds {
        countdown.advance(Duration::from_secs(1), &mut ticks);
    }
    ticks
}

#[test]
fn displays_every_second_down_to_zero_then_expires() {
    let mut countdown = Countdown::new(Config::default());
    countdown.start(3);
    let ticks = run_seconds(&mut countdown, 5);
    assert_eq!(
        ticks,
        vec![
            CountdownTick::Display { remaining: 3 },
            CountdownTick::Display { remaining: 2 },
            CountdownTick::Display { remaining: 1 },
            CountdownTick::Display { remaining: 0 },
            CountdownTick::Expired,
        ]
    );
    assert!(!countdown.is_running());
}

#[test]
fn thirty_second_round_expires_on_the_thirty_first_tick() {
    let mut countdown = Countdown::new(Config::default());
    countdown.start(30);
    let ticks = run_seconds(&mut countdown, 30);
    assert!(!ticks.contains(&CountdownTick::Expired));
    let ticks = run_seconds(&mut countdown, 1);
    assert_eq!(
        ticks,
        vec![CountdownTick::Display { remaining: 0 }, CountdownTick::Expired]
    );
}

#[test]
fn sub_second_frames_accumulate() {
    let mut countdown = Countdown::new(Config::default());
    countdown.start(10);
    let mut ticks = Vec::new();
    for _ in 0..59 {
        countdown.advance(Duration::from_millis(16), &mut ticks);
    }
    assert!(ticks.is_empty());
    for _ in 0..5 {
        countdown.advance(Duration::from_millis(16), &mut ticks);
    }
    assert_eq!(ticks, vec![CountdownTick::Display { remaining: 10 }]);
}

#[test]
fn resume_restarts_the_interval_from_the_remaining_time() {
    let mut countdown = Countdown::new(Config::default());
    countdown.start(5);
    let _ = run_seconds(&mut countdown, 2);
    let mut ticks = Vec::new();
    countdown.advance(Duration::from_millis(900), &mut ticks);
    assert!(countdown.stop());
    countdown.resume();
    countdown.advance(Duration::from_millis(900), &mut ticks);
    assert!(ticks.is_empty());
    countdown.advance(Duration::from_millis(100), &mut ticks);
    assert_eq!(ticks, vec![CountdownTick::Display { remaining: 3 }]);
}
