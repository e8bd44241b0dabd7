//! Command-line tests: timeline editing and dry-run command rendering

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn reelcut(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reelcut").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("REELCUT_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--log-level")
        .arg("error");
    cmd
}

fn insert(dir: &TempDir, file: &Path, rid: &str, name: &str, start: &str, end: &str) {
    reelcut(dir)
        .args(["timeline", "--file"])
        .arg(file)
        .args(["insert", "--rid", rid, "--name", name, "--start", start, "--end", end])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"inserted\""));
}

fn read_timeline(file: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(file).unwrap()).unwrap()
}

#[test]
fn test_insert_creates_timeline_document() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("project.json");

    insert(&dir, &file, "a.mp4", "intro", "0", "5");
    insert(&dir, &file, "b.mp4", "", "1", "3");

    let doc = read_timeline(&file);
    let nodes = doc["video_nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["name"], "intro");
    assert_eq!(nodes[1]["name"], "untitled");
    assert_eq!(nodes[1]["losslessexport"], false);
}

#[test]
fn test_split_and_toggle() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("project.json");
    insert(&dir, &file, "a.mp4", "long", "0", "10");

    reelcut(&dir)
        .args(["timeline", "--file"])
        .arg(&file)
        .args(["split", "--mode", "intervalCut", "--position", "0", "--start", "3", "--end", "6"])
        .assert()
        .success();
    assert_eq!(read_timeline(&file)["video_nodes"].as_array().unwrap().len(), 3);

    reelcut(&dir)
        .args(["timeline", "--file"])
        .arg(&file)
        .args(["toggle", "--position", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));
    assert_eq!(read_timeline(&file)["video_nodes"][1]["losslessexport"], true);
}

#[test]
fn test_out_of_range_edit_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("project.json");
    insert(&dir, &file, "a.mp4", "only", "0", "4");

    reelcut(&dir)
        .args(["timeline", "--file"])
        .arg(&file)
        .args(["delete", "--position", "3"])
        .assert()
        .failure();
    assert_eq!(read_timeline(&file)["video_nodes"].as_array().unwrap().len(), 1);
}

#[test]
fn test_export_dry_run_prints_merge_command() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("project.json");
    insert(&dir, &file, "a.mp4", "one", "0", "2");
    insert(&dir, &file, "b.mp4", "two", "1", "4");

    reelcut(&dir)
        .args(["--ffmpeg", "/usr/local/bin/ffmpeg", "export", "--timeline"])
        .arg(&file)
        .args(["--output-dir", "out", "--filename", "final", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/usr/local/bin/ffmpeg -hide_banner"))
        .stdout(predicate::str::contains("concat=n=2:v=1:a=0[out]"))
        .stdout(predicate::str::contains("-map \"[out]\""))
        .stdout(predicate::str::contains("\"out/final.mp4\""));
}

#[test]
fn test_cut_dry_run_prints_one_command_per_node() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("project.json");
    insert(&dir, &file, "a.mp4", "one", "0", "2");
    insert(&dir, &file, "b.mp4", "two", "1", "4");

    reelcut(&dir)
        .args(["cut", "--timeline"])
        .arg(&file)
        .args(["--output-dir", "clips", "--all", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"clips/one.mp4\""))
        .stdout(predicate::str::contains("-ss 1.0000 -i \"b.mp4\" -t 3.0000"));
}

#[test]
fn test_cut_dry_run_gives_split_pieces_distinct_outputs() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("project.json");
    insert(&dir, &file, "a.mp4", "scene", "0", "10");

    reelcut(&dir)
        .args(["timeline", "--file"])
        .arg(&file)
        .args(["split", "--mode", "sliceCut", "--position", "0", "--start", "0", "--end", "4"])
        .assert()
        .success();

    reelcut(&dir)
        .args(["cut", "--timeline"])
        .arg(&file)
        .args(["--output-dir", "clips", "--all", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"clips/scene.mp4\""))
        .stdout(predicate::str::contains("\"clips/scene_2.mp4\""));
}

#[test]
fn test_probe_dry_run_rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    reelcut(&dir)
        .args(["probe", "--input", "notes.txt", "--dry-run"])
        .assert()
        .failure();
}

#[test]
fn test_import_dry_run_targets_project_dir() {
    let dir = TempDir::new().unwrap();
    reelcut(&dir)
        .args(["--project-dir", "proj", "import", "--input", "media/clip.mkv", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-i \"media/clip.mkv\" -c copy \"proj/clip.mov\""));
}
