//! Integration tests for the worklog CLI
//!
//! Each test drives the built binary against a temporary project directory.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_worklog(args: &[&str], project: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_worklog"))
        .args(args)
        .env("WORKLOG_PROJECT", project)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute worklog")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn init_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let output = run_worklog(&["init", "--project-id", "demo"], dir.path());
    assert!(output.status.success(), "init failed: {}", stderr(&output));
    dir
}

fn recorded_id(output: &Output) -> String {
    stdout(output)
        .lines()
        .find_map(|line| line.trim().strip_prefix("Entry ID: "))
        .map(str::to_string)
        .expect("record output has an entry id")
}

#[test]
fn test_help_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_worklog"))
        .arg("--help")
        .output()
        .expect("Failed to execute");

    assert!(output.status.success());
    assert!(stdout(&output).contains("Branching operation log"));
}

#[test]
fn test_init_creates_log_once() {
    let dir = init_project();
    assert!(dir.path().join(".worklog/heads.json").is_file());

    let again = run_worklog(&["init"], dir.path());
    assert!(again.status.success());
    assert!(stdout(&again).contains("already exists"));
}

#[test]
fn test_commands_require_init() {
    let dir = TempDir::new().unwrap();
    let output = run_worklog(&["log"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("worklog init"));
}

#[test]
fn test_record_log_and_diff() {
    let dir = init_project();

    let first = run_worklog(
        &["record", "file-create", "Add player", "--added", "player.gd", "-a", "agent"],
        dir.path(),
    );
    assert!(first.status.success(), "{}", stderr(&first));

    let second = run_worklog(
        &["record", "file-modify", "Tune player", "--modified", "player.gd"],
        dir.path(),
    );
    assert!(second.status.success(), "{}", stderr(&second));
    let second_id = recorded_id(&second);

    let log = run_worklog(&["log", "--oneline"], dir.path());
    let out = stdout(&log);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Tune player"));
    assert!(lines[1].contains("[file-create] Add player"));

    let diff = run_worklog(&["diff", &second_id[..8], "--json"], dir.path());
    assert!(diff.status.success(), "{}", stderr(&diff));
    let json: serde_json::Value = serde_json::from_str(&stdout(&diff)).unwrap();
    assert_eq!(json["filesAdded"], serde_json::json!(["player.gd"]));
    assert_eq!(json["totalChanges"], 1);
}

#[test]
fn test_branch_workflow() {
    let dir = init_project();
    run_worklog(&["record", "checkpoint", "base"], dir.path());

    let create = run_worklog(&["branch", "create", "feature"], dir.path());
    assert!(create.status.success(), "{}", stderr(&create));

    let side = run_worklog(
        &["record", "ai-generate", "Side work", "-b", "feature", "--added", "side.gd"],
        dir.path(),
    );
    assert!(side.status.success(), "{}", stderr(&side));

    let main_log = stdout(&run_worklog(&["log", "--oneline"], dir.path()));
    assert!(!main_log.contains("Side work"));

    let feature_log = stdout(&run_worklog(&["log", "--oneline", "-b", "feature"], dir.path()));
    assert!(feature_log.contains("Side work"));
    assert!(feature_log.contains("base"));

    let delete_main = run_worklog(&["branch", "delete", "main"], dir.path());
    assert!(!delete_main.status.success());

    let delete = run_worklog(&["branch", "delete", "feature"], dir.path());
    assert!(delete.status.success());
    assert!(!stdout(&run_worklog(&["branch"], dir.path())).contains("feature"));
}

#[test]
fn test_tag_and_summary() {
    let dir = init_project();
    let record = run_worklog(&["record", "build-complete", "Web build"], dir.path());
    let id = recorded_id(&record);

    let tag = run_worklog(&["tag", &id, "release"], dir.path());
    assert!(stdout(&tag).contains("Tagged"));
    let again = run_worklog(&["tag", &id, "release"], dir.path());
    assert!(stdout(&again).contains("already carries"));

    let tagged = stdout(&run_worklog(&["log", "--oneline", "--tag", "release"], dir.path()));
    assert!(tagged.contains("Web build"));

    let summary = run_worklog(&["summary", "--json"], dir.path());
    let json: serde_json::Value = serde_json::from_str(&stdout(&summary)).unwrap();
    assert_eq!(json["projectId"], "demo");
    assert_eq!(json["totalEntries"], 1);
    assert_eq!(json["operationCounts"]["build-complete"], 1);
}

#[test]
fn test_destroy_with_yes() {
    let dir = init_project();
    std::fs::write(dir.path().join("project.godot"), "").unwrap();

    let output = run_worklog(&["destroy", "--yes"], dir.path());
    assert!(output.status.success());
    assert!(!dir.path().join(".worklog").exists());
    assert!(dir.path().join("project.godot").exists());
}

#[test]
fn test_destroy_refuses_dir_name_outside_log() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("worklog.toml"), "dir_name = \"..\"\n").unwrap();
    std::fs::write(dir.path().join("project.godot"), "").unwrap();

    let output = run_worklog(&["destroy", "--yes"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("dir_name"));
    assert!(dir.path().join("project.godot").exists());
}

#[test]
fn test_destroy_leaves_uninitialized_dir_alone() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".worklog")).unwrap();
    std::fs::write(dir.path().join(".worklog/notes.txt"), "keep").unwrap();

    let output = run_worklog(&["destroy", "--yes"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("No work log to destroy"));
    assert!(dir.path().join(".worklog/notes.txt").exists());
}
