//! CLI contract tests
//!
//! Runs the built binary to check output formats, flags and exit codes.

use std::path::Path;
use std::process::{Command, Output};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_dungeon-assess")
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(bin())
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

/// Three rooms in a row, touching, so inference links them
fn write_dungeon(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("dungeon.json");
    std::fs::write(
        &path,
        r#"{
  "header": {"name": "Test Crypt"},
  "levels": [{
    "id": "L1",
    "rooms": [
      {"id": "hall", "position": {"x": 0, "y": 0}, "size": {"width": 10, "height": 10}, "is_entrance": true},
      {"id": "gallery", "position": {"x": 10, "y": 0}, "size": {"width": 10, "height": 10}},
      {"id": "vault", "position": {"x": 20, "y": 0}, "size": {"width": 10, "height": 10}, "is_exit": true}
    ],
    "game_elements": [
      {"id": "t1", "type": "treasure", "position": {"x": 25, "y": 5}},
      {"id": "m1", "type": "monster", "position": {"x": 15, "y": 5}}
    ]
  }]
}"#,
    )
    .unwrap();
    path
}

#[test]
fn test_assess_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_dungeon(dir.path());

    let out = run(&["assess", file.to_str().unwrap(), "--format", "json"], dir.path());
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    for key in [
        "scores",
        "details",
        "overall_score",
        "grade",
        "recommendations",
        "spatial_inference_used",
    ] {
        assert!(report.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(report["spatial_inference_used"], true);
    assert_eq!(report["details"]["key_path_length"]["entrance"], "hall");
}

#[test]
fn test_assess_no_inference_flag() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_dungeon(dir.path());

    let out = run(
        &["assess", file.to_str().unwrap(), "-f", "json", "--no-inference"],
        dir.path(),
    );
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["spatial_inference_used"], false);
    assert_eq!(report["scores"]["accessibility"], 0.0);
}

#[test]
fn test_assess_text_output_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_dungeon(dir.path());
    let report_path = dir.path().join("report.txt");

    let out = run(
        &[
            "assess",
            file.to_str().unwrap(),
            "--output",
            report_path.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert!(out.status.success());
    let text = std::fs::read_to_string(&report_path).unwrap();
    assert!(text.contains("accessibility"));
    assert!(text.contains("Grade"));
}

#[test]
fn test_config_next_to_input_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_dungeon(dir.path());
    std::fs::write(
        dir.path().join("dungeon-assess.toml"),
        "enable_spatial_inference = false\n",
    )
    .unwrap();

    let out = run(&["assess", file.to_str().unwrap(), "-f", "json"], dir.path());
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["spatial_inference_used"], false);
}

#[test]
fn test_unparseable_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ \"levels\": [ }").unwrap();

    let out = run(&["assess", bad.to_str().unwrap()], dir.path());
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to parse"));

    let missing = run(&["assess", "does-not-exist.json"], dir.path());
    assert!(!missing.status.success());
}

#[test]
fn test_infer_prints_enhanced_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_dungeon(dir.path());

    let out = run(&["infer", file.to_str().unwrap()], dir.path());
    assert!(out.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let level = &doc["levels"][0];
    assert_eq!(level["connections"].as_array().unwrap().len(), 2);
    assert_eq!(level["connections_inferred"], true);
}

#[test]
fn test_rules_lists_registry() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&["rules"], dir.path());
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for name in ["accessibility", "path_diversity", "aesthetic_balance"] {
        assert!(stdout.contains(name), "missing {}", name);
    }
    assert!(stdout.contains("Total weight: 1.00"));
}

#[test]
fn test_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&["init"], dir.path());
    assert!(out.status.success());

    let path = dir.path().join("dungeon-assess.toml");
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[weights]"));

    std::fs::write(&path, "# edited\n").unwrap();
    assert!(run(&["init"], dir.path()).status.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");

    assert!(run(&["init", "--force"], dir.path()).status.success());
    assert!(std::fs::read_to_string(&path).unwrap().contains("[weights]"));
}
