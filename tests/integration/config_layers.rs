//! Configuration layering: defaults, global file, explicit file, environment

use super::test_utils::with_env;
use nix_scribe::cli::{apply_overrides, Cli, RunContext};
use nix_scribe::config::{global_config_path, ConfigLoader};
use nix_scribe::document::ModularizationLevel;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_global(test_dir: &TempDir, content: &str) {
    let dir = test_dir.path().join("config/nix-scribe");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn test_defaults_without_files() {
    let test_dir = TempDir::new().unwrap();
    let config = with_env(&test_dir, &[], || ConfigLoader::load(None).unwrap());

    assert_eq!(config.generation.input_path, PathBuf::from("/"));
    assert_eq!(config.generation.output_path, PathBuf::from("."));
    assert_eq!(config.generation.modularization, ModularizationLevel::SingleFile);
    assert!(config.generation.comments);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_global_file_location() {
    let test_dir = TempDir::new().unwrap();
    let path = with_env(&test_dir, &[], global_config_path).unwrap();
    assert_eq!(path, test_dir.path().join("config/nix-scribe/config.toml"));
}

#[test]
fn test_global_file_is_loaded() {
    let test_dir = TempDir::new().unwrap();
    write_global(
        &test_dir,
        "[generation]\nmodularization = \"high-level\"\nroot_name = \"host\"\n",
    );

    let config = with_env(&test_dir, &[], || ConfigLoader::load(None).unwrap());
    assert_eq!(config.generation.modularization, ModularizationLevel::HighLevel);
    assert_eq!(config.generation.root_name, "host");
}

#[test]
fn test_explicit_file_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    write_global(
        &test_dir,
        "[generation]\nmodularization = \"high-level\"\nroot_name = \"host\"\n",
    );
    let explicit = test_dir.path().join("explicit.toml");
    fs::write(&explicit, "[generation]\nmodularization = 2\n").unwrap();

    let config = with_env(&test_dir, &[], || ConfigLoader::load(Some(&explicit)).unwrap());
    assert_eq!(config.generation.modularization, ModularizationLevel::ComponentLevel);
    assert_eq!(config.generation.root_name, "host");
}

#[test]
fn test_environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    write_global(&test_dir, "[generation]\ncomments = true\n");
    let explicit = test_dir.path().join("explicit.toml");
    fs::write(&explicit, "[generation]\ncomments = true\nroot_name = \"file\"\n").unwrap();

    let config = with_env(
        &test_dir,
        &[
            ("NIX_SCRIBE__GENERATION__COMMENTS", "false"),
            ("NIX_SCRIBE__GENERATION__ROOT_NAME", "env"),
        ],
        || ConfigLoader::load(Some(&explicit)).unwrap(),
    );
    assert!(!config.generation.comments);
    assert_eq!(config.generation.root_name, "env");
}

#[test]
fn test_flags_override_everything() {
    let test_dir = TempDir::new().unwrap();
    write_global(&test_dir, "[generation]\noutput_path = \"/srv/global\"\n");

    let config = with_env(
        &test_dir,
        &[("NIX_SCRIBE__GENERATION__MODULARIZATION", "high-level")],
        || {
            let mut config = ConfigLoader::load(None).unwrap();
            let cli = Cli::try_parse_from(["nix-scribe", "-o", "/srv/flag", "-m", "0", "--no-comment"])
                .unwrap();
            apply_overrides(&cli, &mut config);
            config
        },
    );
    assert_eq!(config.generation.output_path, PathBuf::from("/srv/flag"));
    assert_eq!(config.generation.modularization, ModularizationLevel::SingleFile);
    assert!(!config.generation.comments);
}

#[test]
fn test_invalid_layers_are_rejected() {
    let test_dir = TempDir::new().unwrap();
    write_global(&test_dir, "[generation]\ndisabled_modules = [\"nonexistent\"]\n");

    let result = with_env(&test_dir, &[], || {
        let cli = Cli::try_parse_from(["nix-scribe", "config"]).unwrap();
        RunContext::new(&cli).map(|_| ())
    });
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Unknown module 'nonexistent'"));
}
