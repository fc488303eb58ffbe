use std::{cell::RefCell, rc::Rc, time::Duration};

use glam::Vec2;
use vision_drill_core::{
    AudioCue, BackgroundKind, BackgroundSelector, GameId, RoundSetup, Settings, ThemeSelector,
};
use vision_drill_rendering::{FrameDirective, FrameInput, FrameSource, LayerId, NodeId, Shape};
use vision_drill_session::{
    AudioSink, ForegroundLayer, GameConfig, MemoryStore, Session, SessionContext, SessionPhase,
};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<AudioCue>>>);

impl Recorder {
    fn cues(&self) -> Vec<AudioCue> {
        self.0.borrow().clone()
    }
}

impl AudioSink for Recorder {
    fn play(&mut self, cue: AudioCue) {
        self.0.borrow_mut().push(cue);
    }
}

fn setup(background: BackgroundSelector) -> RoundSetup {
    let mut setup = RoundSetup::for_game(GameId::RotationDigital);
    setup.background = background;
    setup
}

fn session_with(settings: Settings, round: RoundSetup) -> (Session, Recorder) {
    let recorder = Recorder::default();
    let context = SessionContext::new(MemoryStore::new(settings), recorder.clone());
    let mut session = Session::init_canvas(800.0, 600.0, context).expect("canvas builds");
    session
        .set_game(GameConfig::new(round, 7))
        .expect("round starts");
    (session, recorder)
}

fn idle(session: &mut Session, dt: Duration) {
    session
        .advance(dt, FrameInput::default())
        .expect("frame advances");
}

fn tap_at(session: &mut Session, point: Vec2) {
    session
        .advance(
            Duration::ZERO,
            FrameInput {
                tap: Some(point),
                pause_toggle: false,
            },
        )
        .expect("tap is handled");
}

fn cell_position(session: &Session, label: u32) -> Vec2 {
    let Some(ForegroundLayer::RotationDigital(game)) = session.foreground() else {
        panic!("rotation digital is running");
    };
    let cell = game.item_for_label(label).expect("label exists").cell();
    session.scene().world_position(cell).expect("cell exists")
}

fn tap_label(session: &mut Session, label: u32) {
    let point = cell_position(session, label);
    tap_at(session, point);
}

fn text_of(session: &Session, node: NodeId) -> String {
    match session.scene().node(node).expect("text exists").shape() {
        Shape::Text { content, .. } => content.clone(),
        other => panic!("expected text, found {other:?}"),
    }
}

fn cell_count(session: &Session) -> usize {
    match session.foreground() {
        Some(ForegroundLayer::RotationDigital(game)) => game.items().len(),
        None => 0,
    }
}

fn finish_round(session: &mut Session) {
    for _ in 0..31 {
        idle(session, Duration::from_secs(1));
    }
    assert_eq!(session.phase(), SessionPhase::Revealing);
    for _ in 0..2_000 {
        if session.phase() == SessionPhase::Finished {
            return;
        }
        idle(session, FRAME);
    }
    panic!("reward reveal never finished");
}

#[test]
fn clearing_level_one_raises_speed_and_rebuilds_layers() {
    let (mut session, recorder) = session_with(
        Settings::default(),
        setup(BackgroundSelector::Kind(BackgroundKind::Grid)),
    );
    assert_eq!(session.layer_builds(), 1);
    assert_eq!(cell_count(&session), 6);

    for label in 1..=6 {
        tap_label(&mut session, label);
    }
    assert_eq!(session.snapshot().score, 30);
    assert_eq!(recorder.cues(), vec![AudioCue::Success; 6]);
    assert_eq!(session.snapshot().speed, 0);

    idle(&mut session, Duration::from_millis(1_100));
    let snapshot = session.snapshot();
    assert_eq!((snapshot.level, snapshot.speed), (1, 1));
    assert_eq!(session.layer_builds(), 2);
    assert_eq!(cell_count(&session), 6);
    assert!(session.foreground().expect("running").is_animating());
    assert!(session.background().expect("grid").is_running());
}

#[test]
fn rebuilt_ring_starts_at_rest_in_the_rebuild_frame() {
    let (mut session, _) = session_with(Settings::default(), setup(BackgroundSelector::None));
    for label in 1..=6 {
        tap_label(&mut session, label);
    }
    idle(&mut session, Duration::from_millis(1_100));
    assert_eq!(session.snapshot().speed, 1);
    assert_eq!(session.layer_builds(), 2);

    let root = session.foreground().and_then(ForegroundLayer::root).expect("ring built");
    let rotation = |session: &Session| session.scene().attrs(root).expect("root exists").rotation_deg;
    assert_eq!(rotation(&session), 0.0);

    idle(&mut session, Duration::from_secs(1));
    assert!((rotation(&session) - 30.0).abs() < 1e-2);
}

#[test]
fn hud_tracks_score_total_and_remaining_time() {
    let settings = Settings {
        today_score: 40,
        ..Settings::default()
    };
    let (mut session, _) = session_with(settings, setup(BackgroundSelector::None));
    let hud = session.hud().clone();

    tap_label(&mut session, 1);
    assert_eq!(text_of(&session, hud.score_text()), "Score: 5");
    assert_eq!(text_of(&session, hud.total_text()), "Total: 45");

    idle(&mut session, Duration::from_secs(1));
    assert_eq!(text_of(&session, hud.time_text()), "30");
    idle(&mut session, Duration::from_secs(1));
    assert_eq!(text_of(&session, hud.time_text()), "29");
}

#[test]
fn level_and_speed_change_together_rebuild_once() {
    let mut round = setup(BackgroundSelector::None);
    round.max_speed = 1;
    let (mut session, _) = session_with(Settings::default(), round);

    for _ in 0..2 {
        for label in 1..=6 {
            tap_label(&mut session, label);
        }
        idle(&mut session, Duration::from_millis(1_100));
    }
    let snapshot = session.snapshot();
    assert_eq!((snapshot.level, snapshot.speed), (2, 0));
    assert_eq!(session.layer_builds(), 3);
    assert_eq!(cell_count(&session), 18);
    assert_eq!(snapshot.score, 60);
}

#[test]
fn wrong_tap_changes_nothing_but_plays_a_cue() {
    let (mut session, recorder) = session_with(Settings::default(), setup(BackgroundSelector::None));
    tap_label(&mut session, 3);
    assert_eq!(session.snapshot().score, 0);
    assert_eq!(recorder.cues(), vec![AudioCue::Wrong]);
}

#[test]
fn score_label_floats_above_the_tap_and_fades() {
    let (mut session, _) = session_with(Settings::default(), setup(BackgroundSelector::None));
    let point = cell_position(&session, 1);
    tap_at(&mut session, point);

    let label = session.overlay().label();
    let attrs = session.scene().attrs(label).expect("label exists").clone();
    assert!(attrs.visible);
    assert!((attrs.opacity - 1.0).abs() < f32::EPSILON);
    assert!((attrs.position.y - (point.y - 20.0)).abs() < 1e-3);

    idle(&mut session, Duration::from_millis(1_100));
    assert!(!session.scene().attrs(label).expect("label exists").visible);
    assert_eq!(session.snapshot().speed, 0);
}

#[test]
fn game_over_persists_daily_totals() {
    let settings = Settings {
        today_score: 100,
        today_time: 60,
        ..Settings::default()
    };
    let (mut session, recorder) = session_with(settings, setup(BackgroundSelector::Random));
    tap_label(&mut session, 1);
    finish_round(&mut session);

    let reward = session.reward().expect("reward revealed");
    assert!(reward.is_finished());
    assert!(reward.bonus() > reward.award());
    let bonus = u64::from(reward.bonus());

    let stored = session.context().store().settings();
    assert_eq!(stored.today_score, 100 + 5 + bonus);
    assert_eq!(stored.today_time, 90);
    assert_eq!(session.snapshot().score, 5);
    assert!(recorder.cues().contains(&AudioCue::Victory));
    assert!(!session.scene().is_layer_visible(LayerId::Control));

    let total = session.overlay().total_text();
    assert_eq!(text_of(&session, total), format!("Total score: {}", 105 + bonus));
    let base = session.overlay().base_text();
    assert_eq!(text_of(&session, base), "Win score: 5");
}

#[test]
fn game_over_dims_layers_and_blocks_taps() {
    let (mut session, _) = session_with(
        Settings::default(),
        setup(BackgroundSelector::Kind(BackgroundKind::Radial)),
    );
    for _ in 0..31 {
        idle(&mut session, Duration::from_secs(1));
    }
    assert_eq!(session.phase(), SessionPhase::Revealing);
    tap_label(&mut session, 1);
    assert_eq!(session.snapshot().score, 0);

    let background = session.background().expect("radial");
    assert!(!background.is_running());
    let root = background.root().expect("built");
    assert!((session.scene().attrs(root).expect("root").opacity - 0.1).abs() < 1e-6);

    let foreground = session.foreground().expect("running").root().expect("built");
    let attrs = session.scene().attrs(foreground).expect("root");
    assert!((attrs.opacity - 0.3).abs() < 1e-6);
    assert!(!attrs.listening);
}

#[test]
fn back_control_dismisses_the_score_card() {
    let (mut session, recorder) = session_with(Settings::default(), setup(BackgroundSelector::None));
    let back = session.overlay().back();
    let corner = session.scene().world_position(back).expect("back exists");

    tap_at(&mut session, corner + Vec2::new(10.0, 10.0));
    assert!(!recorder.cues().contains(&AudioCue::SoftClick));

    finish_round(&mut session);
    tap_at(&mut session, corner + Vec2::new(10.0, 10.0));
    assert_eq!(recorder.cues().last(), Some(&AudioCue::SoftClick));
    assert!(!session.is_exit_requested());

    let directive = session.update(Duration::from_secs(1), FrameInput::default());
    assert_eq!(directive, FrameDirective::Exit);
    assert!(session.is_exit_requested());
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.scene().is_layer_visible(LayerId::Control));
    let group = session.overlay().group();
    assert!(!session.scene().attrs(group).expect("group").visible);
}

#[test]
fn pause_freezes_countdown_and_animations() {
    let mut round = setup(BackgroundSelector::Kind(BackgroundKind::Grating));
    round.max_speed = 3;
    let (mut session, _) = session_with(Settings::default(), round);
    idle(&mut session, Duration::from_secs(2));
    let remaining = session.remaining_time();

    session
        .advance(
            Duration::ZERO,
            FrameInput {
                tap: None,
                pause_toggle: true,
            },
        )
        .expect("pause");
    assert_eq!(session.phase(), SessionPhase::Paused);
    assert!(!session.background().expect("grating").is_running());

    idle(&mut session, Duration::from_secs(5));
    assert_eq!(session.remaining_time(), remaining);
    tap_label(&mut session, 1);
    assert_eq!(session.snapshot().score, 0);

    session.pause_game().expect("resume");
    assert_eq!(session.phase(), SessionPhase::Running);
    let background = session.background().expect("grating");
    assert!(background.is_running());
    let root = background.root().expect("built");
    assert!((session.scene().attrs(root).expect("root").opacity - 1.0).abs() < 1e-6);

    tap_label(&mut session, 1);
    assert_eq!(session.snapshot().score, 5);
    idle(&mut session, Duration::from_secs(1));
    assert_eq!(session.remaining_time(), remaining - 1);
}

#[test]
fn grab_handle_slides_the_panel() {
    let (mut session, recorder) = session_with(Settings::default(), setup(BackgroundSelector::None));
    let grab = session.scene().world_position(session.hud().grab()).expect("grab");
    let panel = session.hud().panel();
    assert!(session.is_panel_expanded());

    tap_at(&mut session, grab - Vec2::new(10.0, 0.0));
    assert_eq!(recorder.cues(), vec![AudioCue::Click]);
    assert!(!session.is_panel_expanded());

    idle(&mut session, Duration::from_secs(1));
    let x = session.scene().attrs(panel).expect("panel").position.x;
    assert!((x - session.hud().collapsed_x()).abs() < 1e-3);
}

#[test]
fn muted_sound_effects_play_nothing() {
    let settings = Settings {
        is_sound_effect: false,
        ..Settings::default()
    };
    let (mut session, recorder) = session_with(settings, setup(BackgroundSelector::None));
    tap_label(&mut session, 1);
    tap_label(&mut session, 3);
    assert!(recorder.cues().is_empty());
    assert_eq!(session.snapshot().score, 5);
}

#[test]
fn debug_setting_forces_radial_background() {
    let settings = Settings {
        debug: true,
        ..Settings::default()
    };
    let (session, _) = session_with(settings, setup(BackgroundSelector::Kind(BackgroundKind::Grid)));
    assert_eq!(
        session.background().map(|layer| layer.kind()),
        Some(BackgroundKind::Radial)
    );
}

#[test]
fn background_none_builds_only_the_foreground() {
    let (session, _) = session_with(Settings::default(), setup(BackgroundSelector::None));
    assert!(session.background().is_none());
    assert!(session.scene().roots(LayerId::Background).is_empty());
    assert_eq!(session.layer_builds(), 1);
    assert_eq!(cell_count(&session), 6);
}

#[test]
fn unknown_theme_falls_back_and_the_round_still_starts() {
    let mut round = setup(BackgroundSelector::Kind(BackgroundKind::Radial));
    round.theme = ThemeSelector::Named("no-such-theme".to_owned());
    let (session, _) = session_with(Settings::default(), round);
    assert_eq!(session.phase(), SessionPhase::Running);
    assert_eq!(cell_count(&session), 6);
}

#[test]
fn starting_a_new_round_releases_previous_layers() {
    let (mut session, _) = session_with(
        Settings::default(),
        setup(BackgroundSelector::Kind(BackgroundKind::Grid)),
    );
    let old_root = session.foreground().and_then(ForegroundLayer::root).expect("built");
    session
        .set_game(GameConfig::new(setup(BackgroundSelector::None), 8))
        .expect("round restarts");
    assert!(!session.scene().contains(old_root));
    assert!(session.scene().roots(LayerId::Background).is_empty());
    assert_eq!(session.snapshot().score, 0);
    assert_eq!(session.remaining_time(), 30);
}
