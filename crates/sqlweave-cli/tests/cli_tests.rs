//! CLI integration tests for sqlweave.
//!
//! These tests exercise the database-free command flows end to end in
//! temporary project directories, plus argument parsing and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

/// Get a command for the sqlweave binary.
fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sqlweave").unwrap();
    cmd.current_dir(dir)
        .env_remove("SQLWEAVE_CONFIG_FILE")
        .env_remove("SQLWEAVE_CONFIG");
    cmd
}

fn write_unit(dir: &Path, relative: &str, content: &str) {
    let path = dir.join("schema").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("initdb"))
        .stdout(predicate::str::contains("makemigration"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("test-connection"));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlweave"));
}

#[test]
fn test_migrate_subcommand_help() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .args(["migrate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fake"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--migration"))
        .stdout(predicate::str::contains("--revert"));
}

#[test]
fn test_makemigration_subcommand_help() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .args(["makemigration", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--empty"))
        .stdout(predicate::str::contains("--name"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_config_defaults_shown_in_help() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: sqlweave.yaml]"))
        .stdout(predicate::str::contains("[default: default]"));
}

// =============================================================================
// Init
// =============================================================================

#[test]
fn test_init_scaffolds_project() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done."));

    for sub in ["tables", "views", "functions", "triggers", "indexes", "types", "constraints"] {
        assert!(dir.path().join("schema").join(sub).is_dir());
    }
    assert!(dir.path().join("migrations").is_dir());
    assert!(dir.path().join("sqlweave.yaml").is_file());
}

#[test]
fn test_init_is_idempotent_and_keeps_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    fs::write(dir.path().join("sqlweave.yaml"), "# customized\n").unwrap();
    cmd(dir.path()).arg("init").assert().success();
    let config = fs::read_to_string(dir.path().join("sqlweave.yaml")).unwrap();
    assert_eq!(config, "# customized\n");
}

// =============================================================================
// Makemigration and Diff (database-free flows)
// =============================================================================

#[test]
fn test_makemigration_creates_ordered_first_migration() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    write_unit(
        dir.path(),
        "tables/users.sql",
        "--UP\nCREATE TABLE users (id INT);\n--DOWN\nDROP TABLE users;\n",
    );
    write_unit(
        dir.path(),
        "views/active.sql",
        "--REQ tables/users\n--UP\nCREATE VIEW active AS SELECT 1;\n--DOWN\nDROP VIEW active;\n",
    );

    cmd(dir.path())
        .arg("makemigration")
        .assert()
        .success()
        .stdout(predicate::str::contains("Creating:"))
        .stdout(predicate::str::contains("tables/users"))
        .stdout(predicate::str::contains("Created migration 0001-auto"));

    let up = fs::read_to_string(dir.path().join("migrations/0001-auto/up.sql")).unwrap();
    let table = up.find("CREATE TABLE users").unwrap();
    let view = up.find("CREATE VIEW active").unwrap();
    assert!(table < view);
    assert!(dir.path().join("migrations/0001-auto/schema.json").is_file());
    assert!(dir.path().join("migrations/0001-auto/down.sql").is_file());
}

#[test]
fn test_makemigration_without_drift_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    write_unit(
        dir.path(),
        "tables/users.sql",
        "--UP\nCREATE TABLE users (id INT);\n--DOWN\nDROP TABLE users;\n",
    );
    cmd(dir.path()).arg("makemigration").assert().success();

    cmd(dir.path())
        .arg("makemigration")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes detected"));
    assert!(!dir.path().join("migrations/0002-auto").exists());
}

#[test]
fn test_makemigration_dry_run_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    write_unit(
        dir.path(),
        "tables/users.sql",
        "--UP\nCREATE TABLE users (id INT);\n--DOWN\nDROP TABLE users;\n",
    );
    cmd(dir.path())
        .args(["makemigration", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run, migration not saved"));
    assert!(!dir.path().join("migrations/0001-auto").exists());
}

#[test]
fn test_makemigration_empty_uses_manual_suffix() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    cmd(dir.path())
        .args(["makemigration", "--empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created migration 0001-manual"));

    cmd(dir.path())
        .args(["makemigration", "--empty", "--name", "seed-data"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created migration 0002-seed-data"));
}

#[test]
fn test_changed_unit_cascades_to_dependents() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    write_unit(
        dir.path(),
        "tables/users.sql",
        "--UP\nCREATE TABLE users (id INT);\n--DOWN\nDROP TABLE users;\n",
    );
    write_unit(
        dir.path(),
        "views/active.sql",
        "--REQ tables/users\n--UP\nCREATE VIEW active AS SELECT 1;\n--DOWN\nDROP VIEW active;\n",
    );
    cmd(dir.path()).arg("makemigration").assert().success();

    write_unit(
        dir.path(),
        "tables/users.sql",
        "--UP\nCREATE TABLE users (id BIGINT);\n--DOWN\nDROP TABLE users;\n",
    );
    cmd(dir.path())
        .arg("makemigration")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updating:"))
        .stdout(predicate::str::contains("views/active"));

    // drop pass tears down the dependent view before the table
    let up = fs::read_to_string(dir.path().join("migrations/0002-auto/up.sql")).unwrap();
    let drop_view = up.find("DROP VIEW active").unwrap();
    let drop_table = up.find("DROP TABLE users").unwrap();
    let create_table = up.find("CREATE TABLE users (id BIGINT)").unwrap();
    assert!(drop_view < drop_table);
    assert!(drop_table < create_table);
}

#[test]
fn test_diff_reports_changes() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    write_unit(
        dir.path(),
        "tables/users.sql",
        "--UP\nCREATE TABLE users (id INT);\n--DOWN\nDROP TABLE users;\n",
    );

    cmd(dir.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("New items:"))
        .stdout(predicate::str::contains("tables/users"));

    cmd(dir.path()).arg("makemigration").assert().success();
    cmd(dir.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes"));

    write_unit(
        dir.path(),
        "tables/users.sql",
        "--UP\nCREATE TABLE users (id BIGINT);\n--DOWN\nDROP TABLE users;\n",
    );
    cmd(dir.path())
        .args(["diff", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changed items:"))
        .stdout(predicate::str::contains("+ CREATE TABLE users (id BIGINT);"));
}

// =============================================================================
// Validation errors
// =============================================================================

#[test]
fn test_unknown_dependency_exits_with_code_2() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    write_unit(
        dir.path(),
        "views/active.sql",
        "--REQ tables/ghost\n--UP\nCREATE VIEW active AS SELECT 1;\n",
    );
    cmd(dir.path())
        .arg("makemigration")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown dependency"))
        .stderr(predicate::str::contains("tables/ghost"))
        .stderr(predicate::str::contains("views/active"));
    assert!(!dir.path().join("migrations/0001-auto").exists());
}

#[test]
fn test_circular_dependency_exits_with_code_2() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).arg("init").assert().success();
    write_unit(
        dir.path(),
        "tables/a.sql",
        "--REQ tables/b\n--UP\nCREATE TABLE a (id INT);\n",
    );
    write_unit(
        dir.path(),
        "tables/b.sql",
        "--REQ tables/a\n--UP\nCREATE TABLE b (id INT);\n",
    );
    cmd(dir.path())
        .arg("makemigration")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Circular dependency"));
}

// =============================================================================
// Configuration errors
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unknown_engine_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("sqlweave.yaml"),
        "default:\n  engine: oracle\n  name: appdb\n  user: app\n",
    )
    .unwrap();
    cmd(dir.path())
        .arg("test-connection")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("oracle"));
}

#[test]
fn test_missing_profile_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("sqlweave.yaml"),
        "default:\n  engine: pg\n  name: appdb\n  user: app\n",
    )
    .unwrap();
    cmd(dir.path())
        .args(["-c", "production", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("production"));
}

#[test]
fn test_invalid_yaml_exits_with_code_5() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("sqlweave.yaml"), "default: [unclosed\n").unwrap();
    cmd(dir.path()).arg("status").assert().code(5);
}
