//! Integration tests for the pastificio CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Data directory with cheap key derivation so encrypted runs stay fast
fn data_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.json"),
        r#"{
            "backup": {
                "key_derivation": { "memory_cost": 64, "time_cost": 1, "parallelism": 1 }
            }
        }"#,
    )
    .unwrap();
    temp_dir
}

fn pastificio(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pastificio").unwrap();
    cmd.env("PASTIFICIO_DATA_DIR", dir.path())
        .env_remove("PASTIFICIO_BACKUP_KEY");
    cmd
}

fn add_order(dir: &TempDir) {
    pastificio(dir)
        .args([
            "order",
            "add",
            "Efisio",
            "--phone",
            "070111",
            "--date",
            "2026-10-18",
            "--item",
            "pasta:Culurgiones:2:15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added order"));
}

#[test]
fn test_cli_help() {
    Command::cargo_bin("pastificio")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fresh-pasta shop"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_order_feeds_daily_report() {
    let dir = data_dir();
    add_order(&dir);

    pastificio(&dir)
        .args(["report", "daily", "--date", "2026-10-18", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totaleOrdini\": 1"))
        .stdout(predicate::str::contains("\"totaleIncasso\": 30.0"));

    pastificio(&dir)
        .args(["order", "list", "--date", "2026-10-18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Culurgiones x2"));
}

#[test]
fn test_backup_create_list_restore() {
    let dir = data_dir();
    add_order(&dir);

    pastificio(&dir)
        .args(["backup", "create", "--name", "manuale"])
        .assert()
        .success()
        .stdout(predicate::str::contains("manuale.gz"));

    pastificio(&dir)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("manuale.gz"))
        .stdout(predicate::str::contains("full"));

    pastificio(&dir)
        .args(["backup", "restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("orders   1 record(s)"))
        .stdout(predicate::str::contains("Backup is valid"));
}

#[test]
fn test_encrypted_backup_needs_the_right_key() {
    let dir = data_dir();
    add_order(&dir);

    pastificio(&dir)
        .env("PASTIFICIO_BACKUP_KEY", "segreto")
        .args(["backup", "create", "--name", "cifrato", "--encrypt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cifrato.gz.enc"));

    pastificio(&dir)
        .env("PASTIFICIO_BACKUP_KEY", "segreto")
        .args(["backup", "info", "cifrato.gz.enc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted:      yes"));

    pastificio(&dir)
        .env("PASTIFICIO_BACKUP_KEY", "sbagliato")
        .args(["backup", "restore", "cifrato.gz.enc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption error"));
}

#[test]
fn test_incremental_backup() {
    let dir = data_dir();

    pastificio(&dir)
        .env("PASTIFICIO_BACKUP_KEY", "segreto")
        .args(["backup", "create", "--incremental"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes"));

    add_order(&dir);

    pastificio(&dir)
        .env("PASTIFICIO_BACKUP_KEY", "segreto")
        .args(["backup", "create", "--incremental"])
        .assert()
        .success()
        .stdout(predicate::str::contains("daily-backup-inc-"));
}

#[test]
fn test_restore_missing_backup_fails() {
    let dir = data_dir();

    pastificio(&dir)
        .args(["backup", "restore", "inesistente.gz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup not found"));
}

#[test]
fn test_invalid_month_fails() {
    let dir = data_dir();

    pastificio(&dir)
        .args(["report", "monthly", "--year", "2026", "--month", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_schedule_due_on_sunday_midnight() {
    let dir = data_dir();

    pastificio(&dir)
        .args(["schedule", "due", "--at", "2026-10-18T00:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weekly-full"))
        .stdout(predicate::str::contains("size-monitor"))
        .stdout(predicate::str::contains("daily-incremental").not());
}

#[test]
fn test_schedule_shutdown_takes_backup() {
    let dir = data_dir();
    add_order(&dir);

    pastificio(&dir)
        .args(["schedule", "shutdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shutdown-backup-"));
}

#[test]
fn test_config_shows_without_writing() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    pastificio(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Retention days:     7"));
    assert!(!config.exists());

    pastificio(&dir)
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert!(config.exists());
}

#[test]
fn test_cleanup_keeps_encrypted_full_backup() {
    let dir = data_dir();
    add_order(&dir);

    pastificio(&dir)
        .env("PASTIFICIO_BACKUP_KEY", "segreto")
        .args(["schedule", "run", "--job", "weekly-full"])
        .assert()
        .success();

    pastificio(&dir)
        .env("PASTIFICIO_BACKUP_KEY", "sbagliato")
        .args(["backup", "cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 0 backup(s)"));

    pastificio(&dir)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("full-backup-"))
        .stdout(predicate::str::contains("locked"));
}
