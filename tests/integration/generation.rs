//! End-to-end generation over a fixture system

use super::test_utils::{assignment_lines, sample_system};
use nix_scribe::config::GenerationConfig;
use nix_scribe::document::ModularizationLevel;
use nix_scribe::scribe::{GenerationReport, ModuleStatus, Scribe};
use nix_scribe::system::SystemContext;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn generate(input: &Path, output: &Path, level: ModularizationLevel) -> GenerationReport {
    let config = GenerationConfig {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        modularization: level,
        ..GenerationConfig::default()
    };

    let mut system = SystemContext::new(input, false);
    Scribe::new(config).generate(&mut system).unwrap()
}

fn status(report: &GenerationReport, module: &str) -> ModuleStatus {
    report
        .outcomes
        .iter()
        .find(|o| o.name == module)
        .map(|o| o.status.clone())
        .unwrap()
}

fn all_texts(report: &GenerationReport) -> Vec<String> {
    report
        .saved
        .files()
        .iter()
        .map(|f| fs::read_to_string(&f.path).unwrap())
        .collect()
}

#[test]
fn test_outcomes() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    sample_system(input.path());

    let report = generate(input.path(), output.path(), ModularizationLevel::SingleFile);

    for module in [
        "networkmanager",
        "rtkit",
        "bash",
        "hyprland",
        "gdm",
        "cosmic-greeter",
        "plasma-login-manager",
        "gnome",
        "cosmic",
    ] {
        assert_eq!(status(&report, module), ModuleStatus::NothingToConfigure, "{}", module);
    }
    for module in [
        "grub", "networking", "users", "groups", "sudo", "nano", "vim", "git", "sddm", "plasma6",
    ] {
        assert_eq!(status(&report, module), ModuleStatus::Generated, "{}", module);
    }
    assert_eq!(report.generated(), 10);
    assert_eq!(report.outcomes.len(), 19);
}

#[test]
fn test_disabled_module_is_skipped() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    sample_system(input.path());

    let config = GenerationConfig {
        output_path: output.path().to_path_buf(),
        disabled_modules: ["grub".to_string()].into_iter().collect(),
        ..GenerationConfig::default()
    };
    let mut system = SystemContext::new(input.path(), false);
    let report = Scribe::new(config).generate(&mut system).unwrap();

    assert_eq!(status(&report, "grub"), ModuleStatus::Disabled);
    let text = fs::read_to_string(output.path().join("configuration.nix")).unwrap();
    assert!(!text.contains("boot.loader"));
}

#[test]
fn test_single_file_content() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    sample_system(input.path());

    let report = generate(input.path(), output.path(), ModularizationLevel::SingleFile);
    assert_eq!(report.saved.files().len(), 1);

    let text = fs::read_to_string(output.path().join("configuration.nix")).unwrap();
    assert!(text.starts_with("# Generated by nix-scribe\n{pkgs, ...}:\n{\n\n"));
    assert!(text.contains("  # Basic networking configuration\n"));
    assert!(text.contains("    hostName = \"workstation\";\n"));
    assert!(text.contains("    nameservers = [\n      \"9.9.9.9\"\n    ];\n"));
    assert!(text.contains(
        "    hosts = {\n      \"192.168.1.20\" = [\n        \"nas\"\n        \"nas.lan\"\n      ];\n    };\n"
    ));
    assert!(!text.contains("localhost"));
    assert!(text.contains("      shell = pkgs.bash;\n"));
    assert!(text.contains("  programs.bash.enable = true;\n"));
    assert!(text.contains("      extraGroups = [\n        \"wheel\"\n        \"media\"\n      ];\n"));
    assert!(text.contains("  programs.nano.enable = true;\n"));
    assert!(text.contains("  programs.vim.defaultEditor = true;\n"));
    assert!(text.contains("  security.sudo = {\n    enable = true;\n    wheelNeedsPassword = false;\n  };\n"));
    assert!(text.contains("  boot.loader.timeout = 3;\n"));
    assert!(text.contains("  services.desktopManager.plasma6.enable = true;\n"));
    assert!(text.contains(
        "  programs.git = {\n    enable = true;\n    config = {\n      init = {\n        defaultBranch = \"main\";\n      };\n    };\n  };\n"
    ));
    assert!(text.contains(
        "  services.displayManager.sddm = {\n    enable = true;\n    autoNumlock = true;\n    theme = \"breeze\";\n  };\n"
    ));
    assert!(text.ends_with("}\n"));
}

#[test]
fn test_high_level_files() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    sample_system(input.path());

    generate(input.path(), output.path(), ModularizationLevel::HighLevel);

    let root = fs::read_to_string(output.path().join("configuration.nix")).unwrap();
    assert!(root.contains(
        "  imports = [\n    ./boot.nix\n    ./networking.nix\n    ./users.nix\n    ./security.nix\n    ./programs.nix\n    ./services.nix\n  ];\n"
    ));
    let users = fs::read_to_string(output.path().join("users.nix")).unwrap();
    assert!(users.starts_with("{pkgs, ...}:\n"));
    assert!(users.contains("users.users = {"));
    assert!(users.contains("users.groups = {"));
    let services = fs::read_to_string(output.path().join("services.nix")).unwrap();
    assert!(services.starts_with("{\n\n  # Simple Desktop Display Manager\n"));
    assert!(services.contains("services.displayManager.sddm"));
}

#[test]
fn test_component_level_tree() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    sample_system(input.path());

    let report = generate(input.path(), output.path(), ModularizationLevel::ComponentLevel);

    for path in [
        "configuration.nix",
        "boot/default.nix",
        "boot/grub.nix",
        "networking/default.nix",
        "networking/networking.nix",
        "users/default.nix",
        "users/users.nix",
        "users/groups.nix",
        "security/default.nix",
        "security/sudo.nix",
        "programs/default.nix",
        "programs/nano.nix",
        "programs/vim.nix",
        "programs/git.nix",
        "services/default.nix",
        "services/sddm.nix",
        "services/plasma6.nix",
    ] {
        assert!(output.path().join(path).is_file(), "missing {}", path);
    }
    assert_eq!(report.saved.files().len(), 17);

    let users = fs::read_to_string(output.path().join("users/default.nix")).unwrap();
    assert_eq!(users, "{\n\n  imports = [\n    ./users.nix\n    ./groups.nix\n  ];\n\n}\n");
}

#[test]
fn test_levels_agree_on_assignments() {
    let input = TempDir::new().unwrap();
    sample_system(input.path());

    let mut seen = Vec::new();
    for level in ModularizationLevel::ALL {
        let output = TempDir::new().unwrap();
        let report = generate(input.path(), output.path(), level);
        let texts = all_texts(&report);
        seen.push(assignment_lines(texts.iter().map(String::as_str)));
    }
    assert!(!seen[0].is_empty());
    assert_eq!(seen[0], seen[1]);
    assert_eq!(seen[1], seen[2]);
}

#[test]
fn test_comments_off() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    sample_system(input.path());

    let config = GenerationConfig {
        output_path: output.path().to_path_buf(),
        comments: false,
        ..GenerationConfig::default()
    };
    let mut system = SystemContext::new(input.path(), false);
    Scribe::new(config).generate(&mut system).unwrap();

    let text = fs::read_to_string(output.path().join("configuration.nix")).unwrap();
    assert!(!text.lines().any(|l| l.trim_start().starts_with('#')));
}

#[test]
fn test_empty_system() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let report = generate(input.path(), output.path(), ModularizationLevel::HighLevel);

    assert_eq!(report.generated(), 0);
    let root = fs::read_to_string(output.path().join("configuration.nix")).unwrap();
    assert_eq!(root, "# Generated by nix-scribe\n{\n\n}\n");
}
