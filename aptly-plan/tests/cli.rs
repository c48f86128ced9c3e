//! Integration tests for the aptly-plan CLI.
//!
//! These tests run the compiled binary against manifests in a temp dir.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

const MANIFEST: &str = r#"
mirrors:
  example:
    location: http://repo.example.com
    key: ABC123
    cli_options:
      -config: /tmp/aptly.conf
repos:
  example:
    cli_options:
      -component: third-party
"#;

/// Get aptly-plan command for testing.
///
/// Clears `APTLY_MANIFEST` and points `APTLY_OS_RELEASE` at a missing file so
/// the host running the tests never leaks into results.
fn aptly_plan() -> Command {
    let mut cmd = cargo_bin_cmd!("aptly-plan");
    cmd.env_remove("APTLY_MANIFEST");
    cmd.env("APTLY_OS_RELEASE", "/nonexistent/os-release");
    cmd
}

fn manifest(temp: &assert_fs::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let file = temp.child(name);
    file.write_str(content).unwrap();
    file.path().to_path_buf()
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn cli_no_args_shows_help() {
    aptly_plan()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn cli_help_lists_subcommands() {
    aptly_plan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("schema"));
}

#[test]
fn cli_version_flag_shows_version() {
    aptly_plan()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aptly-plan"));
}

// ============================================================================
// Validate
// ============================================================================

#[test]
fn validate_accepts_manifest() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", MANIFEST);
    aptly_plan()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 mirror(s), 1 repo(s) valid"));
}

#[test]
fn validate_rejects_scalar_repos() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(
        &temp,
        "manifest.yaml",
        "mirrors:\n  example:\n    location: http://repo.example.com\n    repos: this is a string\n",
    );
    aptly_plan()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mirror 'example'"))
        .stderr(predicate::str::contains("is not an Array"));
}

#[test]
fn validate_rejects_scalar_cli_options() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(
        &temp,
        "manifest.json",
        r#"{"repos": {"example": {"cli_options": "this is a string"}}}"#,
    );
    aptly_plan()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a Hash"));
}

#[test]
fn validate_warns_on_empty_manifest() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", "mirrors:\nrepos:\n");
    aptly_plan()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("declares no mirrors or repos"));
}

#[test]
fn validate_rejects_unquoted_numeric_key() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(
        &temp,
        "manifest.yaml",
        "mirrors:\n  example:\n    location: http://repo.example.com\n    key: 46925553\n",
    );
    aptly_plan()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("key: 46925553 is not a string"));
}

#[test]
fn validate_rejects_float_option() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(
        &temp,
        "manifest.yaml",
        "repos:\n  example:\n    cli_options:\n      -distribution: 1.10\n",
    );
    aptly_plan()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("'-distribution' must be a boolean, integer or string"));
}

#[test]
fn validate_missing_manifest_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    aptly_plan()
        .arg("validate")
        .arg(temp.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load manifest"));
}

#[test]
fn validate_uses_manifest_from_env() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "from-env.yaml", MANIFEST);
    aptly_plan()
        .env("APTLY_MANIFEST", &path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("from-env.yaml"));
}

// ============================================================================
// Render
// ============================================================================

#[test]
fn render_text_shows_commands_and_guards() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", MANIFEST);
    aptly_plan()
        .args(["render", "--codename", "precise"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Package[aptly]"))
        .stdout(predicate::str::contains(
            "--keyserver 'keyserver.ubuntu.com' --recv-keys 'ABC123'",
        ))
        .stdout(predicate::str::contains(
            "aptly mirror create -with-sources=false -with-udebs=false -force-components=false -config=/tmp/aptly.conf example http://repo.example.com precise",
        ))
        .stdout(predicate::str::contains(
            "aptly mirror show -config=/tmp/aptly.conf example >/dev/null",
        ))
        .stdout(predicate::str::contains(
            "aptly repo create -component=third-party example",
        ));
}

#[test]
fn render_json_lists_resources_in_order() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", MANIFEST);
    let output = aptly_plan()
        .args(["render", "--format", "json", "--codename", "precise"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let resources: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let resources = resources.as_array().unwrap();
    assert_eq!(resources.len(), 4);
    assert_eq!(resources[0]["type"], "package");
    assert_eq!(resources[1]["title"], "aptly_mirror_gpg-example");
    assert_eq!(resources[2]["title"], "aptly_mirror_create-example");
    assert_eq!(
        resources[2]["require"],
        serde_json::json!(["Package[aptly]", "Exec[aptly_mirror_gpg-example]"])
    );
    assert_eq!(resources[2]["user"], "root");
    assert_eq!(resources[3]["title"], "aptly_repo_create-example");
}

#[test]
fn render_reads_codename_from_os_release() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", MANIFEST);
    let os_release = manifest(&temp, "os-release", "ID=debian\nVERSION_CODENAME=bookworm\n");
    aptly_plan()
        .env("APTLY_OS_RELEASE", &os_release)
        .arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("http://repo.example.com bookworm"));
}

#[test]
fn render_without_codename_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", MANIFEST);
    aptly_plan()
        .arg("render")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--codename"));
}

// ============================================================================
// Apply
// ============================================================================

#[test]
fn apply_dry_run_describes_without_running() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", MANIFEST);
    aptly_plan()
        .args(["apply", "--dry-run", "--codename", "precise"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exec[aptly_mirror_create-example]"))
        .stdout(predicate::str::contains("[dry-run]"));
}

#[test]
fn apply_empty_manifest_is_noop() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = manifest(&temp, "manifest.yaml", "settings:\n  user: root\n");
    // The package resource is always declared, so the plan is never empty;
    // dry-run keeps this from touching the host.
    aptly_plan()
        .args(["apply", "-n", "--codename", "precise"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Package[aptly]"));
}

// ============================================================================
// Schema
// ============================================================================

#[test]
fn schema_prints_manifest_schema() {
    aptly_plan()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mirrors\""))
        .stdout(predicate::str::contains("\"repos\""));
}

#[test]
fn schema_writes_to_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("schemas").child("manifest.schema.json");
    aptly_plan()
        .args(["schema", "--output"])
        .arg(out.path())
        .assert()
        .success();
    out.assert(predicate::str::contains("\"settings\""));
}
