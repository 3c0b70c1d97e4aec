//! CLI integration tests for hilo-promo

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hilo_promo(file: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("hilo-promo").unwrap();
    cmd.arg("--file").arg(file);
    cmd
}

#[test]
fn test_list_empty_library() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("promotions.json");

    hilo_promo(&file)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No promotional posts saved."));
}

#[test]
fn test_add_then_list() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("promotions.json");

    hilo_promo(&file)
        .args(["add", "Suscribete a mi newsletter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Promotion added."));

    hilo_promo(&file)
        .args(["add", "Nuevo curso disponible", "--image", "/tmp/banner.png"])
        .assert()
        .success();

    hilo_promo(&file)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Suscribete a mi newsletter"))
        .stdout(predicate::str::contains(
            "2. Nuevo curso disponible [image: /tmp/banner.png]",
        ));
}

#[test]
fn test_add_empty_text_fails_with_invalid_input() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("promotions.json");

    hilo_promo(&file)
        .args(["add", ""])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn test_delete_matching_entry() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("promotions.json");

    hilo_promo(&file).args(["add", "borrame"]).assert().success();
    hilo_promo(&file)
        .args(["delete", "borrame"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Promotion deleted."));

    hilo_promo(&file)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No promotional posts saved."));
}

#[test]
fn test_delete_absent_entry_reports_no_match() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("promotions.json");

    hilo_promo(&file).args(["add", "conservame"]).assert().success();
    hilo_promo(&file)
        .args(["delete", "no existe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching promotion found."));

    hilo_promo(&file)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("conservame"));
}
