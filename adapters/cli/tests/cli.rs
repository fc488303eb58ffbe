use std::{fs, path::PathBuf, process::Command};

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vision-drill"))
}

fn scratch_settings(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vision-drill-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir is writable");
    let path = dir.join(name);
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn help_lists_round_options() {
    let output = binary().arg("--help").output().expect("binary runs");
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--background", "--style", "--theme", "--seed", "--headless"] {
        assert!(help.contains(flag), "missing {flag} in:\n{help}");
    }
}

#[test]
fn unknown_game_is_rejected_before_launch() {
    let output = binary()
        .args(["--game", "gridFill", "--headless"])
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown game"), "{stderr}");
}

#[test]
fn headless_round_persists_daily_totals() {
    let settings = scratch_settings("headless.toml");
    fs::write(&settings, "today_score = 40\ntoday_time = 10\n").expect("write fixture");

    let status = binary()
        .args(["--headless", "--time", "2", "--background", "grid", "--seed", "11"])
        .arg("--settings")
        .arg(&settings)
        .status()
        .expect("binary runs");
    assert!(status.success());

    let saved = fs::read_to_string(&settings).expect("settings were written");
    assert!(saved.contains("today_time = 12"), "{saved}");
    let score_line = saved
        .lines()
        .find(|line| line.starts_with("today_score"))
        .expect("score persisted");
    let score: u64 = score_line
        .split('=')
        .nth(1)
        .and_then(|value| value.trim().parse().ok())
        .expect("numeric score");
    assert!(score > 40 + 50, "{saved}");
}
