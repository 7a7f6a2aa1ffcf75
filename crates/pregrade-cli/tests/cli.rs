use assert_cmd::cargo::cargo_bin_cmd;
use image::{Rgba, RgbaImage};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_card(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
    let path = dir.join(name);
    img.save(&path).expect("write card png");
    path
}

fn run_json(args: &[&str]) -> Value {
    let out = cargo_bin_cmd!("pregrade")
        .arg("--json")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).expect("valid json output")
}

#[test]
fn every_command_has_help() {
    for args in [&[][..], &["grade"][..], &["guidelines"][..], &["config"][..]] {
        cargo_bin_cmd!("pregrade")
            .args(args)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn grade_prints_json_report() {
    let tmp = TempDir::new().expect("temp dir");
    let front = write_card(tmp.path(), "front.png", 200, 280);

    let report = run_json(&["grade", front.to_str().unwrap(), "--sequential"]);
    assert_eq!(report["cardType"], "Pokemon");
    assert_eq!(report["grading"]["overallGrade"], "Gem Mint");
    assert_eq!(report["grading"]["overallScore"], 10.0);
    assert_eq!(report["analysis"]["dimensions"]["width"], 200);
    assert!(report["reportId"].is_string());
}

#[test]
fn grade_text_output_summarises_criteria() {
    let tmp = TempDir::new().expect("temp dir");
    let front = write_card(tmp.path(), "front.png", 120, 168);

    let out = cargo_bin_cmd!("pregrade")
        .args(["grade", front.to_str().unwrap(), "--no-defects"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).expect("utf8 stdout");
    assert!(text.contains("overall:      Gem Mint (10.0)"), "{text}");
    for label in ["Centering", "Corners", "Edges", "Surface"] {
        assert!(text.contains(label), "missing {label}");
    }
}

#[test]
fn flags_and_config_file_shape_the_report() {
    let tmp = TempDir::new().expect("temp dir");
    let front = write_card(tmp.path(), "front.png", 120, 168);
    let config = tmp.path().join("pregrade.json");
    fs::write(&config, r#"{ "card_type": "Magic", "segmentation": false }"#).unwrap();

    let report = run_json(&[
        "grade",
        front.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--no-quality",
    ]);
    assert_eq!(report["cardType"], "Magic");
    assert!(report.get("segmentation").is_none());
    assert!(report.get("quality").is_none());
    assert!(report.get("defects").is_some());
}

#[test]
fn back_photo_is_analysed() {
    let tmp = TempDir::new().expect("temp dir");
    let front = write_card(tmp.path(), "front.png", 120, 168);
    let back = write_card(tmp.path(), "back.png", 120, 168);

    let report = run_json(&[
        "grade",
        front.to_str().unwrap(),
        "--back",
        back.to_str().unwrap(),
    ]);
    assert!(report["backAnalysis"].is_object());
    assert_eq!(report["backSha256"], report["sourceSha256"]);
}

#[test]
fn artifacts_dir_receives_report_and_images() {
    let tmp = TempDir::new().expect("temp dir");
    let front = write_card(tmp.path(), "front.png", 120, 168);
    let out_dir = tmp.path().join("out");

    cargo_bin_cmd!("pregrade")
        .args(["grade", front.to_str().unwrap(), "--render", "--enhance", "--artifacts-dir"])
        .arg(&out_dir)
        .assert()
        .success();

    assert!(out_dir.join("report.json").exists());
    assert!(out_dir.join("segment_corners_topLeft.png").exists());
    assert!(out_dir.join("enhanced_edgeMap.png").exists());
}

#[test]
fn missing_photo_exits_with_input_code() {
    let tmp = TempDir::new().expect("temp dir");
    let absent = tmp.path().join("absent.png");

    let assert = cargo_bin_cmd!("pregrade")
        .args(["grade", absent.to_str().unwrap()])
        .assert()
        .code(2);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("couldn't be found"), "{stderr}");
}

#[test]
fn oversized_and_unsupported_photos_are_rejected() {
    let tmp = TempDir::new().expect("temp dir");
    let front = write_card(tmp.path(), "front.png", 64, 64);
    let gif = tmp.path().join("front.gif");
    fs::copy(&front, &gif).unwrap();

    cargo_bin_cmd!("pregrade")
        .args(["grade", front.to_str().unwrap(), "--max-upload-mb", "0"])
        .assert()
        .code(2);
    cargo_bin_cmd!("pregrade")
        .args(["grade", gif.to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn damaged_photo_is_a_failure() {
    let tmp = TempDir::new().expect("temp dir");
    let front = write_card(tmp.path(), "front.png", 64, 64);
    let mut bytes = fs::read(&front).unwrap();
    bytes.truncate(40);
    fs::write(&front, bytes).unwrap();

    let assert = cargo_bin_cmd!("pregrade")
        .args(["grade", front.to_str().unwrap()])
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("damaged"), "{stderr}");
}

#[test]
fn guidelines_json_lists_grades_and_criteria() {
    let value = run_json(&["guidelines"]);
    let grades = value["grades"].as_array().expect("grades array");
    assert_eq!(grades.len(), 11);
    assert_eq!(grades[10]["grade"], "Poor");
    assert_eq!(value["criteria"][1]["weight"], 0.25);
}

#[test]
fn config_write_round_trips_through_grade() {
    let tmp = TempDir::new().expect("temp dir");
    let config = tmp.path().join("defaults.json");

    cargo_bin_cmd!("pregrade")
        .args(["config", "--write"])
        .arg(&config)
        .assert()
        .success();
    let saved: Value = serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(saved["card_type"], "Pokemon");
    assert_eq!(saved["rarity_keywords"][0]["keyword"], "charizard");

    let front = write_card(tmp.path(), "front.png", 120, 168);
    let report = run_json(&["grade", front.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    assert_eq!(report["grading"]["overallGrade"], "Gem Mint");
}
