//! Command line behavior.

mod common;

use assert_cmd::Command;
use common::Fixture;
use predicates::prelude::*;

fn bundler(fixture: &Fixture) -> Command {
    let mut cmd = Command::cargo_bin("flashable_bundler").unwrap();
    cmd.arg("--root")
        .arg(fixture.root.path())
        .arg("--scratch-dir")
        .arg(fixture.scratch.path())
        .env_remove("FLASHABLE_CONFIG")
        .env_remove("FLASHABLE_OUT_DIR")
        .env_remove("FLASHABLE_JAVA")
        .env_remove("FLASHABLE_ZIPADJUST");
    cmd
}

#[test]
fn missing_artifact_fails_with_build_hint() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.path("out/app-debug.apk")).unwrap();
    // Preflight only checks that the launcher exists; it is never run here.
    let java = fixture.path("crypto/build/libs/zipsigner-1.1.jar");

    bundler(&fixture)
        .arg("--java")
        .arg(&java)
        .args(["zip", "24.0", "24000"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("app-debug.apk does not exist!"))
        .stderr(predicate::str::contains("'apk'"));

    assert!(fixture.packages().is_empty());
}

#[test]
fn missing_signing_key_is_reported() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.path("ziptools/private.key.pk8")).unwrap();

    bundler(&fixture)
        .arg("uninstaller")
        .assert()
        .failure()
        .stderr(predicate::str::contains("private.key.pk8 does not exist!"));
}

#[test]
fn unsafe_version_is_rejected() {
    let fixture = Fixture::new();

    bundler(&fixture)
        .args(["zip", "24.0\"; rm -rf /", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid arguments"));
}

#[test]
fn clean_removes_packages() {
    let fixture = Fixture::new();
    common::write(&fixture.out_dir().join("Magisk-v23.0.zip"), b"old");

    bundler(&fixture).arg("clean").assert().success();

    assert!(fixture.packages().is_empty());
    assert!(fixture.path("out/app-debug.apk").exists());
}

#[test]
fn clean_without_packages_warns() {
    let fixture = Fixture::new();

    bundler(&fixture)
        .arg("clean")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: no packages in"));
}

#[cfg(unix)]
#[test]
fn reports_progress_and_output() {
    let fixture = Fixture::new();
    let java = fixture.fake_java();

    bundler(&fixture)
        .arg("--java")
        .arg(&java)
        .arg("uninstaller")
        .assert()
        .success()
        .stdout(predicate::str::contains("→ Checking signer, keys and Java"))
        .stdout(predicate::str::contains("→ Packing uninstaller"))
        .stdout(predicate::str::contains("✓ Output: "));

    assert_eq!(fixture.packages().len(), 1);
}

#[test]
fn config_file_sets_output_directory() {
    let fixture = Fixture::new();
    common::write(&fixture.path("bundler.toml"), b"out_dir = \"dist\"\n");
    common::write(&fixture.path("dist/Magisk-v23.0.zip"), b"old");

    bundler(&fixture).arg("clean").assert().success();

    assert!(!fixture.path("dist/Magisk-v23.0.zip").exists());
}

#[cfg(unix)]
#[test]
fn builds_both_packages_with_json_summary() {
    let fixture = Fixture::new();
    let java = fixture.fake_java();

    let output = bundler(&fixture)
        .arg("--java")
        .arg(&java)
        .args(["--json", "all", "24.0", "24000"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let packages = summary.as_array().unwrap();
    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0]["kind"], "installer");
    assert_eq!(packages[1]["kind"], "uninstaller");

    let installer = fixture.out_dir().join("Magisk-v24.0.zip");
    assert_eq!(packages[0]["path"], installer.to_string_lossy().as_ref());
    let bytes = std::fs::read(&installer).unwrap();
    assert!(bytes.ends_with(b"SIGNATURESIGNATURE"));
    assert_eq!(fixture.packages().len(), 2);
    assert!(fixture.scratch_is_empty());
}
