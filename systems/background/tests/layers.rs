use std::time::Duration;

use vision_drill_core::{AnimationMode, AnimationStyle, BackgroundKind, ColorTheme, StyleSelector};
use vision_drill_rendering::{LayerId, Scene};
use vision_drill_system_background::{BackgroundConfig, BackgroundLayer};
use vision_drill_system_themes::ThemeCatalog;

fn night() -> ColorTheme {
    ThemeCatalog::default()
        .get("night")
        .cloned()
        .expect("night is registered")
}

fn layer(kind: BackgroundKind) -> BackgroundLayer {
    BackgroundLayer::new(kind, BackgroundConfig::default(), AnimationMode::Frame, 11)
}

#[test]
fn radial_wedges_follow_level_density() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Radial);
    layer
        .build(
            &mut scene,
            2,
            0,
            &night(),
            StyleSelector::Named(AnimationStyle::Rotate),
        )
        .expect("build succeeds");

    assert_eq!(layer.node_count(), 9);
    assert_eq!(layer.style(), Some(AnimationStyle::Rotate));
    assert_eq!(layer.period(), Duration::from_millis(10_000));
    assert!(layer.is_running());
    assert_eq!(scene.roots(LayerId::Background).len(), 1);
}

#[test]
fn single_wedge_style_builds_one_node() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Radial);
    layer
        .build(
            &mut scene,
            5,
            1,
            &night(),
            StyleSelector::Named(AnimationStyle::OpacityFlicker),
        )
        .expect("build succeeds");
    assert_eq!(layer.node_count(), 1);
    assert_eq!(layer.period(), Duration::from_millis(8_000));
}

#[test]
fn grid_tiles_three_by_three_screens() {
    let mut scene = Scene::new(700.0, 400.0);
    let mut layer = layer(BackgroundKind::Grid);
    layer
        .build(&mut scene, 1, 0, &night(), StyleSelector::Random)
        .expect("build succeeds");
    // 7 columns of 100px cells, 4 rows.
    assert_eq!(layer.node_count(), 21 * 12);
    let root = layer.root().expect("built");
    assert_eq!(scene.attrs(root).expect("exists").position.x, -700.0);
}

#[test]
fn grating_bars_share_a_tilt() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Grating);
    layer
        .build(&mut scene, 1, 0, &night(), StyleSelector::Random)
        .expect("build succeeds");
    assert_eq!(layer.node_count(), 21);
    let root = layer.root().expect("built");
    let bars = scene.node(root).expect("exists").children().to_vec();
    let tilt = scene.attrs(bars[0]).expect("exists").rotation_deg;
    assert!((0.0..45.0).contains(&tilt));
    for bar in bars {
        assert_eq!(scene.attrs(bar).expect("exists").rotation_deg, tilt);
    }
    assert!(matches!(
        layer.style(),
        Some(AnimationStyle::HorizontalScroll | AnimationStyle::ScalePulse)
    ));
}

#[test]
fn unsupported_named_style_falls_back_to_a_supported_one() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Grating);
    layer
        .build(
            &mut scene,
            1,
            0,
            &night(),
            StyleSelector::Named(AnimationStyle::ColorSwap),
        )
        .expect("build succeeds");
    assert!(matches!(
        layer.style(),
        Some(AnimationStyle::HorizontalScroll | AnimationStyle::ScalePulse)
    ));
}

#[test]
fn rebuild_replaces_previous_nodes() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Radial);
    let theme = night();
    let style = StyleSelector::Named(AnimationStyle::ScalePulse);
    layer
        .build(&mut scene, 1, 0, &theme, style)
        .expect("build succeeds");
    let first_root = layer.root().expect("built");
    layer
        .build(&mut scene, 3, 2, &theme, style)
        .expect("build succeeds");

    assert!(!scene.contains(first_root));
    assert_eq!(scene.roots(LayerId::Background).len(), 1);
    assert_eq!(scene.len(), 1 + 11);
    assert_eq!(layer.period(), Duration::from_millis(6_000));
}

#[test]
fn teardown_stops_and_releases_everything() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Grid);
    layer
        .build(&mut scene, 1, 0, &night(), StyleSelector::Random)
        .expect("build succeeds");
    layer.teardown(&mut scene);
    assert!(scene.is_empty());
    assert!(!layer.is_running());
    assert!(!layer.stop());
}

#[test]
fn scroll_moves_the_group_with_the_phase() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Grid);
    layer
        .build(
            &mut scene,
            1,
            0,
            &night(),
            StyleSelector::Named(AnimationStyle::HorizontalScroll),
        )
        .expect("build succeeds");
    layer.tick(&mut scene, Duration::from_millis(2_500));
    let root = layer.root().expect("built");
    let x = scene.attrs(root).expect("exists").position.x;
    assert!((x - (-800.0 + 800.0 * 0.25)).abs() < 1e-2);
}

#[test]
fn tick_on_released_nodes_degrades_to_static() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = layer(BackgroundKind::Radial);
    layer
        .build(
            &mut scene,
            1,
            0,
            &night(),
            StyleSelector::Named(AnimationStyle::Rotate),
        )
        .expect("build succeeds");
    let root = layer.root().expect("built");
    scene.destroy(root).expect("exists");

    layer.tick(&mut scene, Duration::from_millis(16));
    assert!(!layer.is_running());
}

#[test]
fn interval_mode_only_moves_on_whole_steps() {
    let mut scene = Scene::new(800.0, 600.0);
    let mut layer = BackgroundLayer::new(
        BackgroundKind::Grid,
        BackgroundConfig::default(),
        AnimationMode::Interval,
        3,
    );
    layer
        .build(
            &mut scene,
            1,
            0,
            &night(),
            StyleSelector::Named(AnimationStyle::HorizontalScroll),
        )
        .expect("build succeeds");
    let root = layer.root().expect("built");
    layer.tick(&mut scene, Duration::from_millis(50));
    assert_eq!(scene.attrs(root).expect("exists").position.x, -800.0);
    layer.tick(&mut scene, Duration::from_millis(50));
    assert!(scene.attrs(root).expect("exists").position.x > -800.0);
}
