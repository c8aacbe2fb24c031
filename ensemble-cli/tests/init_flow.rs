use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ensemble() -> Command {
    Command::cargo_bin("ensemble").expect("ensemble binary")
}

fn seed_source(root: &Path) {
    fs::create_dir_all(root.join("agents")).unwrap();
    fs::write(root.join("agents/reviewer.md"), "reviewer v1").unwrap();
    fs::write(root.join("agents/planner.md"), "planner v1").unwrap();
    fs::create_dir_all(root.join("commands")).unwrap();
    fs::write(root.join("commands/run.md"), "run").unwrap();
    fs::create_dir_all(root.join("skills/tts-skill/assets")).unwrap();
    fs::write(root.join("skills/tts-skill/SKILL.md"), "skill").unwrap();
    fs::write(root.join("skills/tts-skill/assets/helper.py"), "code").unwrap();
}

#[test]
fn fresh_init_deploys_all_components() {
    let source = TempDir::new().unwrap();
    seed_source(source.path());
    let target = TempDir::new().unwrap();

    ensemble()
        .current_dir(target.path())
        .args(["init", "--source", &source.path().to_string_lossy(), "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployment complete"));

    let claude = target.path().join(".claude");
    assert_eq!(
        fs::read_to_string(claude.join("agents/reviewer.md")).unwrap(),
        "reviewer v1"
    );
    assert_eq!(
        fs::read_to_string(claude.join("skills/tts-skill/assets/helper.py")).unwrap(),
        "code"
    );
    assert!(claude.join(".ensemble/metadata.json").exists());
}

#[test]
fn init_merge_preserves_user_additions() {
    let source = TempDir::new().unwrap();
    seed_source(source.path());
    let target = TempDir::new().unwrap();
    let agents = target.path().join(".claude/agents");
    fs::create_dir_all(&agents).unwrap();
    fs::write(agents.join("reviewer.md"), "old local copy").unwrap();
    fs::write(agents.join("custom.md"), "mine").unwrap();

    ensemble()
        .current_dir(target.path())
        .args(["init", "--source", &source.path().to_string_lossy(), "--merge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("preserved"))
        .stdout(predicate::str::contains("custom.md"));

    assert_eq!(
        fs::read_to_string(agents.join("reviewer.md")).unwrap(),
        "reviewer v1"
    );
    assert_eq!(fs::read_to_string(agents.join("custom.md")).unwrap(), "mine");
}

#[test]
fn init_dry_run_writes_nothing() {
    let source = TempDir::new().unwrap();
    seed_source(source.path());
    let target = TempDir::new().unwrap();

    ensemble()
        .current_dir(target.path())
        .args([
            "init",
            "--source",
            &source.path().to_string_lossy(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("reviewer.md"));

    assert!(
        !target.path().join(".claude").exists(),
        "dry run must not create .claude"
    );
}

#[test]
fn missing_component_is_reported_without_failing_the_batch() {
    let source = TempDir::new().unwrap();
    fs::create_dir_all(source.path().join("agents")).unwrap();
    fs::write(source.path().join("agents/a.md"), "a").unwrap();
    let target = TempDir::new().unwrap();

    ensemble()
        .current_dir(target.path())
        .args(["init", "--source", &source.path().to_string_lossy(), "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FAILED"))
        .stdout(predicate::str::contains("source not found"));

    assert!(target.path().join(".claude/agents/a.md").exists());
}

#[test]
fn agents_only_restricts_the_deployment() {
    let source = TempDir::new().unwrap();
    seed_source(source.path());
    let target = TempDir::new().unwrap();

    ensemble()
        .current_dir(target.path())
        .args([
            "init",
            "--source",
            &source.path().to_string_lossy(),
            "--force",
            "--agents-only",
        ])
        .assert()
        .success();

    let claude = target.path().join(".claude");
    assert!(claude.join("agents/reviewer.md").exists());
    assert!(!claude.join("commands").exists());
    assert!(!claude.join("skills").exists());
}

#[test]
fn init_backup_moves_existing_directory_aside() {
    let source = TempDir::new().unwrap();
    seed_source(source.path());
    let target = TempDir::new().unwrap();
    let agents = target.path().join(".claude/agents");
    fs::create_dir_all(&agents).unwrap();
    fs::write(agents.join("precious.md"), "precious").unwrap();

    ensemble()
        .current_dir(target.path())
        .args(["init", "--source", &source.path().to_string_lossy(), "--backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backed up to:"));

    // The old tree survives under a timestamped sibling; the new deploy is fresh.
    let backup = fs::read_dir(target.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with(".claude-backup-")
        })
        .expect("backup directory");
    assert!(backup.path().join("agents/precious.md").exists());
    assert!(!target.path().join(".claude/agents/precious.md").exists());
    assert!(target.path().join(".claude/agents/reviewer.md").exists());
}
