use std::path::Path;

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::TempDir;

const W: u32 = 8;
const H: u32 = 4;

fn write_frame(dir: &Path, name: &str, left_white: bool) {
    let img = RgbImage::from_fn(W, H, |x, _| {
        if left_white && x < W / 2 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    img.save(dir.join(name)).expect("write frame");
}

/// Black, left half white, black: two full-strength ticks in the left lane.
fn left_flash_frames() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_frame(dir.path(), "frame_000.png", false);
    write_frame(dir.path(), "frame_001.png", true);
    write_frame(dir.path(), "frame_002.png", false);
    dir
}

fn cli() -> Command {
    Command::cargo_bin("thresh-racer").expect("binary built")
}

#[test]
fn defaults_prints_config_json() {
    let output = cli().arg("defaults").assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(value["params"]["threshold"], 30.0);
    assert_eq!(value["params"]["pick_radius"], 15.0);
    assert_eq!(value["start_at"], 0);
    assert!(value["lanes"].is_null());
}

#[test]
fn replay_reports_left_win() {
    let frames = left_flash_frames();
    cli()
        .arg("replay")
        .arg(frames.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("warming up"))
        .stdout(predicate::str::contains("Running: L 50%  R 0%"))
        .stdout(predicate::str::contains(
            "result: Finished: Left wins (100% vs 0%)",
        ));
}

#[test]
fn replay_stops_once_race_is_won() {
    let frames = left_flash_frames();
    let config = frames.path().join("fast.json");
    std::fs::write(&config, r#"{ "params": { "gains": { "left": 1.0, "right": 1.0 } } }"#)
        .expect("write config");

    cli()
        .arg("replay")
        .arg(frames.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("frames: 2 read, 1 scored"));

    cli()
        .arg("replay")
        .arg(frames.path())
        .arg("--config")
        .arg(&config)
        .arg("--keep-going")
        .assert()
        .success()
        .stdout(predicate::str::contains("frames: 3 read, 2 scored"));
}

#[test]
fn race_not_started_stays_idle() {
    let frames = left_flash_frames();
    cli()
        .args(["replay", "--start-at", "10"])
        .arg(frames.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("result: Race idle"));
}

#[test]
fn json_lines_are_display_states() {
    let frames = left_flash_frames();
    let output = cli()
        .args(["replay", "--json"])
        .arg(frames.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let states: Vec<serde_json::Value> = String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(states.len(), 3);
    assert_eq!(states[0]["warming_up"], true);
    assert_eq!(states[1]["live"]["stronger"], "left");
    assert_eq!(states[2]["status"]["state"], "won");
    assert_eq!(states[2]["status"]["winner"], "left");
}

#[test]
fn mask_dir_receives_scored_masks() {
    let frames = left_flash_frames();
    let masks = tempfile::tempdir().expect("tempdir");
    cli()
        .arg("replay")
        .arg(frames.path())
        .arg("--mask-dir")
        .arg(masks.path())
        .assert()
        .success();

    assert!(!masks.path().join("mask_00000.png").exists());
    let mask = image::open(masks.path().join("mask_00001.png"))
        .expect("mask written")
        .to_rgb8();
    assert_eq!(mask.dimensions(), (W, H));
    assert_eq!(mask.get_pixel(0, 0), &Rgb([255, 255, 255]));
    assert_eq!(mask.get_pixel(W - 1, 0), &Rgb([0, 0, 0]));
    assert!(masks.path().join("mask_00002.png").exists());
}

#[test]
fn missing_directory_fails() {
    cli()
        .args(["replay", "/no/such/frames/dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot list frames"));
}

#[test]
fn directory_without_frames_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    cli()
        .arg("replay")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PNG or JPEG frames"));
}

#[test]
fn invalid_config_fails() {
    let frames = left_flash_frames();
    let config = frames.path().join("bad.json");
    std::fs::write(&config, "{ not json").expect("write config");
    cli()
        .arg("replay")
        .arg(frames.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
