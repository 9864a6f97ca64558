//! The nix-scribe binary end to end

use super::test_utils::{sample_system, unit_farm};
use serde_json::Value as Json;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary in a clean environment with HOME and XDG_CONFIG_HOME under
/// `home`. Other tests set `NIX_SCRIBE__*` variables in this process.
fn run(home: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_nix-scribe"));
    command
        .args(args)
        .env_clear()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"));
    if let Some(path) = std::env::var_os("PATH") {
        command.env("PATH", path);
    }
    command.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_modules_lists_builtins() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["modules", "-q", "--disable", "grub"]);
    assert!(output.status.success());

    let text = stdout(&output);
    for name in ["grub", "networking", "users", "groups", "sudo", "vim", "git", "sddm", "gdm", "plasma6"] {
        assert!(text.contains(name), "missing {}", name);
    }
}

#[test]
fn test_units_json() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    let input = root.path().to_str().unwrap();

    let output = run(
        home.path(),
        &["units", "sddm", "bluetooth", "gdm", "--format", "json", "-i", input, "-q"],
    );
    assert!(output.status.success());

    let reports: Json = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(reports[0]["unit"], "sddm.service");
    assert_eq!(reports[0]["enabled"], true);
    assert_eq!(reports[1]["masked"], true);
    assert_eq!(reports[2]["disabled"], true);
}

#[test]
fn test_generate_writes_configuration() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    sample_system(root.path());

    let output = run(
        home.path(),
        &[
            "generate",
            "-i",
            root.path().to_str().unwrap(),
            "-o",
            out.path().to_str().unwrap(),
            "-m",
            "high-level",
            "--disable",
            "grub",
            "--format",
            "json",
            "-q",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: Json = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["level"], "high-level");
    assert!(out.path().join("configuration.nix").is_file());
    assert!(out.path().join("networking.nix").is_file());
    assert!(out.path().join("services.nix").is_file());
    assert!(!out.path().join("boot.nix").exists());
}

#[test]
fn test_config_prints_effective_toml() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["config", "-m", "2", "--no-comment", "-q"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("[generation]"));
    assert!(text.contains("modularization = \"component-level\""));
    assert!(text.contains("comments = false"));
}

#[test]
fn test_invalid_configuration_fails() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["config", "--interactive", "--sudo", "-q"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("mutually exclusive"));
}

#[test]
fn test_missing_config_file_fails() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("absent.toml");
    let output = run(home.path(), &["config", "--config", missing.to_str().unwrap(), "-q"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
