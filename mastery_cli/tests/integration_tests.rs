//! Integration tests for the mastery binary.
//!
//! These tests verify end-to-end behavior including:
//! - Sequential unlock as lessons are recorded
//! - Module mastery reporting under both rules
//! - Review logging, stats and CSV rollup

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CURRICULUM: &str = r#"{
    "modules": [
        { "id": "basics", "order": 1, "title": "Basics", "lessons": [
            { "id": "intro", "order": 1, "estimated_minutes": 5, "card_ids": ["c1", "c2"] },
            { "id": "variables", "order": 2, "estimated_minutes": 10, "card_ids": ["c3"] }
        ] },
        { "id": "control", "order": 2, "title": "Control Flow", "lessons": [
            { "id": "loops", "order": 1, "estimated_minutes": 10, "card_ids": ["c4"] },
            { "id": "branches", "order": 2, "estimated_minutes": 10 }
        ] }
    ]
}"#;

/// Helper to create a data directory holding the test curriculum
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("curriculum.json"), CURRICULUM)
        .expect("Failed to write curriculum");
    temp_dir
}

/// Run the binary against `data_dir`, with its config dir kept inside it
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mastery"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env("HOME", data_dir)
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("mastery"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Lesson progression and review analytics",
        ));
}

#[test]
fn test_fresh_learner_sees_first_lesson_available() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("available    intro (default)"))
        .stdout(predicate::str::contains("locked       variables (default)"))
        .stdout(predicate::str::contains("locked       loops (default)"))
        .stdout(predicate::str::contains("Basics [new]"));
}

#[test]
fn test_default_command_is_status() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Control Flow [new]"));
}

#[test]
fn test_record_unlocks_next_lesson() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["record", "intro", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("intro marked completed"));

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("completed    intro\n"))
        .stdout(predicate::str::contains("available    variables (default)"))
        .stdout(predicate::str::contains("Basics [learning]"));

    let progress: Value = serde_json::from_str(
        &fs::read_to_string(temp_dir.path().join("progress.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(progress["lessons"]["intro"]["status"], "completed");
}

#[test]
fn test_unlock_crosses_modules() {
    let temp_dir = setup_test_dir();

    for lesson in ["intro", "variables"] {
        cli(temp_dir.path())
            .args(["record", lesson, "mastered"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("available    loops (default)"))
        .stdout(predicate::str::contains("Basics [mastered]"));
}

#[test]
fn test_coarse_rule_reports_proficient() {
    let temp_dir = setup_test_dir();

    for lesson in ["intro", "variables"] {
        cli(temp_dir.path())
            .args(["record", lesson, "mastered"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .args(["status", "--rule", "coarse"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Basics [proficient]"));
}

#[test]
fn test_config_file_selects_mastery_rule() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/mastery");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[mastery]\nrule = \"coarse\"\n").unwrap();

    for lesson in ["intro", "variables"] {
        cli(temp_dir.path())
            .args(["record", lesson, "mastered"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Basics [proficient]"));
}

#[test]
fn test_record_unknown_lesson_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["record", "quantum", "completed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown lesson"));

    assert!(!temp_dir.path().join("progress.json").exists());
}

#[test]
fn test_record_invalid_status_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["record", "intro", "finished"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown lesson status"));
}

#[test]
fn test_stats_without_reviews() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cards (4 total)"))
        .stdout(predicate::str::contains("new:        4"))
        .stdout(predicate::str::contains("No review activity"));
}

#[test]
fn test_review_updates_stats() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["review", "c1", "--state", "learning"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Review logged for c1"));

    cli(temp_dir.path())
        .args(["review", "c1", "--state", "review", "--due", "2030-01-01T00:00:00Z"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cards (4 total)"))
        .stdout(predicate::str::contains("new:        3"))
        .stdout(predicate::str::contains("review:     1"))
        .stdout(predicate::str::contains("This week (2 reviews)"))
        .stdout(predicate::str::contains("Last 28 days: 2 reviews"));
}

#[test]
fn test_review_unknown_card_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["review", "c99", "--state", "review"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown card"));
}

#[test]
fn test_rollup_archives_reviews() {
    let temp_dir = setup_test_dir();

    for card in ["c1", "c2", "c3"] {
        cli(temp_dir.path())
            .args(["review", card, "--state", "learning"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .args(["rollup", "--cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 reviews"))
        .stdout(predicate::str::contains("Cleaned up 1 processed review log"));

    let csv_content = fs::read_to_string(temp_dir.path().join("reviews.csv")).unwrap();
    assert!(csv_content.starts_with("id,card_id,timestamp"));
    assert!(!temp_dir.path().join("reviews/reviews.jsonl").exists());

    // Archived reviews still count
    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("This week (3 reviews)"));
}

#[test]
fn test_empty_rollup() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_validate_reports_counts() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 modules, 4 lessons, 4 cards"));
}

#[test]
fn test_curriculum_override() {
    let temp_dir = setup_test_dir();
    let other = temp_dir.path().join("other.json");
    fs::write(
        &other,
        r#"{ "modules": [ { "id": "solo", "order": 1, "lessons": [ { "id": "only", "order": 1 } ] } ] }"#,
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("--curriculum")
        .arg(&other)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 modules, 1 lessons, 0 cards"));
}
