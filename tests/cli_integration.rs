//! CLI integration tests for Drydock.
//!
//! None of these run an external build tool: products are either disabled
//! or previewed with `--dry-run`, and failures are provoked before any tool
//! would be spawned.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the drydock binary command, isolated from the user's configuration.
fn drydock(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("drydock").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("DRYDOCK_CONFIG");
    cmd
}

/// Create a project whose `drydock.toml` pins the host target.
fn project(extra: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("drydock.toml"),
        format!("[targets]\nhost = \"linux-x86_64\"\n\n{}", extra),
    )
    .unwrap();
    tmp
}

// ============================================================================
// drydock plan
// ============================================================================

#[test]
fn test_plan_lists_products_in_order() {
    let tmp = project("[products.z3]\nbuild = true\n");

    drydock(tmp.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("targets: linux-x86_64"))
        .stdout(predicate::str::contains("1. llvm (before the legacy phase) (disabled)"))
        .stdout(predicate::str::contains("2. z3 (before the legacy phase)\n"))
        .stdout(predicate::str::contains(
            "3. alive (before the legacy phase), needs llvm, z3",
        ))
        .stdout(predicate::str::contains(
            "4. swift (in the legacy phase), needs llvm, alive",
        ));
}

#[test]
fn test_plan_json() {
    let tmp = project("");

    let output = drydock(tmp.path())
        .args(["plan", "--format", "json", "--target", "macosx-arm64"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["targets"], serde_json::json!(["macosx-arm64"]));

    let names: Vec<&str> = json["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["llvm", "z3", "alive", "swift"]);
    assert_eq!(json["products"][3]["block"], "legacy");
    assert_eq!(json["products"][0]["block"], "before-legacy");
}

#[test]
fn test_plan_includes_cross_compile_targets() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("drydock.toml"),
        "[targets]\nhost = \"macosx-arm64\"\ncross-compile = [\"iphoneos-arm64\"]\n",
    )
    .unwrap();

    drydock(tmp.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("targets: macosx-arm64, iphoneos-arm64"));
}

#[test]
fn test_plan_rejects_invalid_target() {
    let tmp = project("");

    drydock(tmp.path())
        .args(["plan", "--target", "ios"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid build target `ios`"));
}

#[test]
fn test_plan_warns_without_config() {
    let tmp = TempDir::new().unwrap();

    drydock(tmp.path())
        .arg("plan")
        .assert()
        .success()
        .stderr(predicate::str::contains("no drydock.toml found"));
}

#[test]
fn test_explicit_config_path() {
    let tmp = TempDir::new().unwrap();
    let configs = tmp.path().join("configs");
    fs::create_dir(&configs).unwrap();
    fs::write(
        configs.join("ci.toml"),
        "[targets]\nhost = \"linux-aarch64\"\n",
    )
    .unwrap();

    drydock(tmp.path())
        .args(["--config", "configs/ci.toml", "plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("targets: linux-aarch64"));

    drydock(tmp.path())
        .args(["--config", "missing.toml", "plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_broken_project_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("drydock.toml"), "[build\n").unwrap();

    drydock(tmp.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

// ============================================================================
// drydock products
// ============================================================================

#[test]
fn test_products_lists_builtin_products() {
    let tmp = TempDir::new().unwrap();

    drydock(tmp.path())
        .arg("products")
        .assert()
        .success()
        .stdout(predicate::str::contains("llvm"))
        .stdout(predicate::str::contains("z3"))
        .stdout(predicate::str::contains("depends on llvm, z3"))
        .stdout(predicate::str::contains("runs in the legacy phase"));
}

// ============================================================================
// drydock build
// ============================================================================

#[test]
fn test_dry_run_shows_requested_phases() {
    let tmp = project("");

    drydock(tmp.path())
        .args(["build", "--dry-run", "--product", "z3", "--test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Building z3 (linux-x86_64)"))
        .stdout(predicate::str::contains("Testing z3 (linux-x86_64)"))
        .stdout(predicate::str::contains("Installing").not())
        .stdout(predicate::str::contains("llvm").not());
}

#[test]
fn test_dry_run_marks_legacy_products() {
    let tmp = project("[products.swift]\nbuild = true\n");

    drydock(tmp.path())
        .args(["build", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Building swift (linux-x86_64) via the legacy phase",
        ));
}

#[test]
fn test_dry_run_skips_tests_for_cross_targets() {
    let tmp = project("");

    drydock(tmp.path())
        .args([
            "build",
            "--dry-run",
            "--product",
            "alive",
            "--test",
            "--target",
            "linux-x86_64",
            "--target",
            "iphoneos-arm64",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Testing alive (linux-x86_64)"))
        .stdout(predicate::str::contains("Building alive (iphoneos-arm64)"))
        .stdout(predicate::str::contains("Testing alive (iphoneos-arm64)").not());
}

#[test]
fn test_dry_run_json() {
    let tmp = project("");

    let output = drydock(tmp.path())
        .args(["build", "--dry-run", "--message-format", "json", "--product", "llvm"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let steps: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = steps.as_array().unwrap();
    assert_eq!(steps.len(), 4 * 3);
    assert_eq!(steps[0]["product"], "llvm");
    assert_eq!(steps[0]["phase"], "build");
    assert_eq!(steps[0]["run"], true);
}

#[test]
fn test_dry_run_with_nothing_enabled() {
    let tmp = project("");

    drydock(tmp.path())
        .args(["build", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));
}

#[test]
fn test_build_with_nothing_enabled_succeeds() {
    let tmp = project("");

    drydock(tmp.path())
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished 0 phase(s)"));
}

#[test]
fn test_build_json_events() {
    let tmp = project("");

    drydock(tmp.path())
        .args(["build", "--message-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\":\"build-started\""))
        .stdout(predicate::str::contains("\"reason\":\"phase-skipped\""))
        .stdout(predicate::str::contains(
            "\"reason\":\"build-finished\",\"success\":true",
        ));
}

#[test]
fn test_build_rejects_unknown_product() {
    let tmp = project("");

    drydock(tmp.path())
        .args(["build", "--product", "lvm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown product `lvm`"))
        .stderr(predicate::str::contains("did you mean: llvm?"));
}

#[test]
fn test_build_rejects_unknown_variant() {
    let tmp = project("");

    drydock(tmp.path())
        .args(["build", "--variant", "Fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown build variant `Fast`"));
}

#[test]
fn test_build_rejects_unknown_message_format() {
    let tmp = project("");

    drydock(tmp.path())
        .args(["build", "--message-format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown message format `xml`"));
}

#[test]
fn test_legacy_phase_without_script_fails() {
    let tmp = project("[products.swift]\nbuild = true\n");

    drydock(tmp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "legacy phase failed for linux-x86_64 (swift)",
        ))
        .stderr(predicate::str::contains("[legacy]"))
        .stderr(predicate::str::contains("build failed"));
}

#[test]
fn test_failed_legacy_script_stops_the_build() {
    let tmp = project(
        "[products.swift]\nbuild = true\n\n[legacy]\nscript = \"does-not-exist.sh\"\n",
    );

    drydock(tmp.path())
        .args(["build", "--message-format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"reason\":\"legacy-phase\""))
        .stdout(predicate::str::contains("\"reason\":\"phase-failed\""))
        .stdout(predicate::str::contains("\"success\":false"));
}

// ============================================================================
// drydock completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    drydock(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("drydock"));
}
