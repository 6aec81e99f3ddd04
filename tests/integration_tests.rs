//! Integration tests for the boxroom CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd,
//! pointing every invocation at a database inside a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a boxroom command acting as `identity` against the
/// database in `tmp`
fn boxroom(tmp: &TempDir, identity: &str) -> Command {
    let mut cmd = Command::cargo_bin("boxroom").unwrap();
    cmd.arg("--db")
        .arg(tmp.path().join("inventory.db"))
        .arg("--as")
        .arg(identity);
    cmd
}

/// Extract the first ID carrying the given prefix from stdout
fn extract_id(output: &std::process::Output, prefix: &str) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find(|l| l.contains(prefix))
        .and_then(|l| {
            l.split_whitespace()
                .find(|w| w.starts_with(prefix))
                .map(|w| w.trim_end_matches(|c: char| !c.is_ascii_alphanumeric()))
        })
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Helper to create a home and return its ID
fn create_home(tmp: &TempDir, identity: &str, name: &str) -> String {
    let output = boxroom(tmp, identity)
        .args(["home", "new", name])
        .output()
        .unwrap();
    assert!(output.status.success());
    extract_id(&output, "HOME-")
}

fn create_box(tmp: &TempDir, identity: &str, home: &str, label: &str) -> String {
    let output = boxroom(tmp, identity)
        .args(["box", "new", home, label])
        .output()
        .unwrap();
    assert!(output.status.success());
    extract_id(&output, "BOX-")
}

fn create_item(tmp: &TempDir, identity: &str, home: &str, name: &str) -> String {
    let output = boxroom(tmp, identity)
        .args(["item", "new", home, name])
        .output()
        .unwrap();
    assert!(output.status.success());
    extract_id(&output, "ITEM-")
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_help_displays() {
    Command::cargo_bin("boxroom")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("home inventory"));
}

#[test]
fn test_missing_identity_is_an_error() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("boxroom")
        .unwrap()
        .env_remove("BOXROOM_IDENTITY")
        .arg("--db")
        .arg(tmp.path().join("inventory.db"))
        .args(["home", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no acting identity"));
}

// ============================================================================
// Homes and memberships
// ============================================================================

#[test]
fn test_home_create_and_list() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");
    assert!(home.starts_with("HOME-"));

    boxroom(&tmp, "alice")
        .args(["home", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Maple Street"));
}

#[test]
fn test_homes_are_invisible_to_non_members() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");

    // Bob's listing is empty and a direct lookup reads as absent
    boxroom(&tmp, "bob")
        .args(["home", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Maple Street").not());
    boxroom(&tmp, "bob")
        .args(["home", "show", &home])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unauthorized"));
}

#[test]
fn test_member_join_and_role_change() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");

    boxroom(&tmp, "bob")
        .args(["member", "join", &home])
        .assert()
        .success()
        .stdout(predicate::str::contains("member"));

    // A plain member cannot administer
    boxroom(&tmp, "bob")
        .args(["member", "set-role", &home, "bob", "admin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unauthorized"));

    // The admin can
    boxroom(&tmp, "alice")
        .args(["member", "set-role", &home, "bob", "admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin"));
}

// ============================================================================
// Inventory flow
// ============================================================================

#[test]
fn test_full_inventory_flow() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");
    let boxid = create_box(&tmp, "alice", &home, "Garage shelf A");
    let item = create_item(&tmp, "alice", &home, "Ethernet cable");

    let output = boxroom(&tmp, "alice")
        .args(["inst", "add", &item, &boxid, "--qty", "5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let inst = extract_id(&output, "INST-");

    boxroom(&tmp, "alice")
        .args(["inst", "edit", &inst, "--qty", "2", "--status", "to-give"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qty 2"));

    boxroom(&tmp, "alice")
        .args(["inst", "list", &home])
        .assert()
        .success()
        .stdout(predicate::str::contains("to-give"));
}

#[test]
fn test_box_scan_token_lookup() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");

    let output = boxroom(&tmp, "alice")
        .args(["box", "new", &home, "Attic crate"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let token = stdout
        .lines()
        .find(|l| l.contains("Token:"))
        .and_then(|l| l.split_whitespace().last())
        .unwrap()
        .to_string();
    assert!(token.starts_with("box:"));

    boxroom(&tmp, "alice")
        .args(["box", "scan", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attic crate"));

    // The token leaks nothing to outsiders
    boxroom(&tmp, "mallory")
        .args(["box", "scan", &token])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_location_tree_and_placement() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");

    let output = boxroom(&tmp, "alice")
        .args(["loc", "new", &home, "house", "Main house"])
        .output()
        .unwrap();
    let house = extract_id(&output, "LOC-");

    let output = boxroom(&tmp, "alice")
        .args(["loc", "new", &home, "room", "Garage", "--parent", &house])
        .output()
        .unwrap();
    let garage = extract_id(&output, "LOC-");

    boxroom(&tmp, "alice")
        .args(["box", "new", &home, "Shelf A", "--location", &garage])
        .assert()
        .success();

    // Deleting the room keeps the box, unplaced
    boxroom(&tmp, "alice")
        .args(["loc", "rm", &garage])
        .assert()
        .success();
    boxroom(&tmp, "alice")
        .args(["box", "list", &home])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shelf A"));
}

#[test]
fn test_duplicate_item_name_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");
    create_item(&tmp, "alice", &home, "Cables");

    boxroom(&tmp, "alice")
        .args(["item", "new", &home, "cables"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate item name"));
}

// ============================================================================
// Audit trail
// ============================================================================

#[test]
fn test_audit_records_box_and_instance_mutations() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");
    let boxid = create_box(&tmp, "alice", &home, "Garage shelf A");
    let item = create_item(&tmp, "alice", &home, "Ethernet cable");

    let output = boxroom(&tmp, "alice")
        .args(["inst", "add", &item, &boxid, "--qty", "5"])
        .output()
        .unwrap();
    let inst = extract_id(&output, "INST-");

    boxroom(&tmp, "alice")
        .args(["inst", "edit", &inst, "--qty", "2"])
        .assert()
        .success();

    let output = boxroom(&tmp, "alice")
        .args(["audit", "list", &home])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("insert_box"));
    assert!(stdout.contains("insert_instance"));
    assert!(stdout.contains("update_instance"));

    // The update record carries both images
    let aud = extract_id(&output, "AUD-");
    assert!(aud.starts_with("AUD-"));
    boxroom(&tmp, "alice")
        .args(["audit", "show", &aud])
        .assert()
        .success()
        .stdout(predicate::str::contains("insert_box"));
}

#[test]
fn test_audit_is_invisible_to_non_members() {
    let tmp = TempDir::new().unwrap();
    let home = create_home(&tmp, "alice", "Maple Street");
    create_box(&tmp, "alice", &home, "Garage shelf A");

    boxroom(&tmp, "eve")
        .args(["audit", "list", &home])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unauthorized"));
}
