#![cfg(feature = "cli")]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("fen-vision").expect("binary")
}

#[test]
fn validate_accepts_a_full_board() {
    cli()
        .args(["validate", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"])
        .assert()
        .success()
        .stdout(predicate::str::diff("valid\n"));
}

#[test]
fn validate_reports_missing_kings_with_exit_code_two() {
    cli()
        .args(["validate", "8/8/8/8/8/8/8/8 w - - 0 1"])
        .assert()
        .code(2)
        .stdout(predicate::str::starts_with("invalid: Missing king(s)"));
}

#[test]
fn position_prints_fen_and_writes_report() {
    let dir = tempdir().expect("tempdir");
    let dets = dir.path().join("dets.json");
    let report = dir.path().join("report.json");
    // Detector ran on a 400x400 copy of the crop; coordinates double on the way in.
    fs::write(
        &dets,
        r#"{
          "predictions": [
            { "x": 225, "y": 375, "width": 40, "height": 45, "class": "white-king", "confidence": 0.9 },
            { "x": 225, "y": 25,  "width": 40, "height": 45, "class": "black-king", "confidence": 0.9 },
            { "x": 175, "y": 25,  "width": 40, "height": 45, "class": "black-queen", "confidence": 0.8 }
          ],
          "image": { "width": 400, "height": 400 }
        }"#,
    )
    .expect("write detections");

    cli()
        .arg("position")
        .arg(&dets)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("3qk3/8/8/8/8/8/8/4K3 w - - 0 1").and(predicate::str::contains("valid")));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(saved["fen"], "3qk3/8/8/8/8/8/8/4K3 w - - 0 1");
    assert_eq!(saved["num_detections"], 3);
    assert_eq!(saved["validation"]["ok"], true);
}

#[test]
fn overlay_projects_a_move_into_the_view() {
    let dir = tempdir().expect("tempdir");
    let region = dir.path().join("region.json");
    fs::write(
        &region,
        r#"{
          "source_size": { "width": 1000.0, "height": 800.0 },
          "candidate_index": 0,
          "padded_rect": { "x": 100.0, "y": 0.0, "width": 800.0, "height": 800.0 },
          "rect_in_source": { "x": 100.0, "y": 0.0, "width": 800.0, "height": 800.0 },
          "crop_size": { "width": 800.0, "height": 800.0 }
        }"#,
    )
    .expect("write region");

    let out = cli()
        .args(["overlay", "--move", "e2e4", "--view", "1000x800", "--region"])
        .arg(&region)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(json["move"], "e2e4");
    assert_eq!(json["from"][0].as_f64(), Some(550.0));
    assert_eq!(json["from"][1].as_f64(), Some(650.0));
    assert_eq!(json["to"][1].as_f64(), Some(450.0));
}

#[test]
fn malformed_move_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let region = dir.path().join("region.json");
    fs::write(&region, "{}").expect("write region");
    cli()
        .args(["overlay", "--move", "e2", "--view", "390x844", "--region"])
        .arg(&region)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn verbose_flag_raises_the_log_level() {
    let dir = tempdir().expect("tempdir");
    let dets = dir.path().join("kings.json");
    fs::write(
        &dets,
        r#"{
          "predictions": [
            { "x": 450, "y": 750, "width": 80, "height": 90, "class": "white-king", "confidence": 0.9 },
            { "x": 450, "y": 50,  "width": 80, "height": 90, "class": "black-king", "confidence": 0.9 }
          ]
        }"#,
    )
    .expect("write detections");
    let built = "position: 4k3/8/8/8/8/8/8/4K3";

    cli()
        .env_remove("RUST_LOG")
        .arg("position")
        .arg(&dets)
        .assert()
        .success()
        .stderr(predicate::str::contains(built).not());

    cli()
        .env_remove("RUST_LOG")
        .args(["-v", "position"])
        .arg(&dets)
        .assert()
        .success()
        .stderr(predicate::str::contains(built));
}
