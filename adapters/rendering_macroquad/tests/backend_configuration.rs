use vision_drill_rendering_macroquad::MacroquadBackend;

#[test]
fn vsync_maps_onto_swap_interval() {
    let synced = format!("{:?}", MacroquadBackend::new().with_vsync(true));
    assert!(synced.contains("swap_interval: Some(1)"), "{synced}");

    let unsynced = format!("{:?}", MacroquadBackend::new().with_vsync(false));
    assert!(unsynced.contains("swap_interval: Some(0)"), "{unsynced}");
}

#[test]
fn explicit_swap_interval_overrides_vsync() {
    let backend = MacroquadBackend::new()
        .with_vsync(true)
        .with_swap_interval(None)
        .with_show_fps(true);
    let debug = format!("{backend:?}");
    assert!(debug.contains("swap_interval: None"), "{debug}");
    assert!(debug.contains("show_fps: true"), "{debug}");
}
