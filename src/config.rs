//! Configuration
//!
//! Layered configuration: merge-policy defaults, the global config file, an
//! explicit `--config` file, then `NIX_SCRIBE__*` environment variables.
//! Command line flags are folded in last by the CLI.

use crate::document::ModularizationLevel;
use crate::error::ScribeError;
use crate::logging::LoggingConfig;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

pub const ENV_PREFIX: &str = "NIX_SCRIBE";
pub const ENV_SEPARATOR: &str = "__";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScribeConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to scan and how to write it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Root of the system to scan
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Directory the configuration is written to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default)]
    pub modularization: ModularizationLevel,

    /// Emit `#` comments for node and block descriptions
    #[serde(default = "default_true")]
    pub comments: bool,

    /// Ask before escalating with sudo
    #[serde(default)]
    pub interactive: bool,

    /// Retry refused reads through sudo without asking
    #[serde(default)]
    pub use_sudo: bool,

    /// File name of the root node, without `.nix`
    #[serde(default = "default_root_name")]
    pub root_name: String,

    #[serde(default = "default_description")]
    pub description: String,

    /// Imports added verbatim to the root node
    #[serde(default)]
    pub extra_imports: Vec<String>,

    /// Modules that are not run
    #[serde(default)]
    pub disabled_modules: BTreeSet<String>,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("/")
}

fn default_output_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_root_name() -> String {
    "configuration".to_string()
}

fn default_description() -> String {
    "Generated by nix-scribe".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            modularization: ModularizationLevel::default(),
            comments: default_true(),
            interactive: false,
            use_sudo: false,
            root_name: default_root_name(),
            description: default_description(),
            extra_imports: Vec::new(),
            disabled_modules: BTreeSet::new(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl GenerationConfig {
    pub fn validate(&self, known_modules: &[&str]) -> Vec<String> {
        let mut errors = Vec::new();
        if self.input_path.as_os_str().is_empty() {
            errors.push("Input path cannot be empty".to_string());
        }
        if self.output_path.as_os_str().is_empty() {
            errors.push("Output path cannot be empty".to_string());
        }
        let root_name = self.root_name.trim();
        if root_name.is_empty() || root_name.contains('/') || root_name.ends_with(".nix") {
            errors.push(format!(
                "Root name '{}' must be a bare file name without '.nix'",
                self.root_name
            ));
        }
        if self.interactive && self.use_sudo {
            errors.push("'interactive' and 'use_sudo' are mutually exclusive".to_string());
        }
        for module in &self.disabled_modules {
            if !known_modules.contains(&module.as_str()) {
                errors.push(format!("Unknown module '{}' in disabled_modules", module));
            }
        }
        errors
    }
}

impl ScribeConfig {
    /// Validate the entire configuration against the known module names.
    pub fn validate(&self, known_modules: &[&str]) -> Result<(), Vec<ValidationError>> {
        let mut errors: Vec<ValidationError> = self
            .generation
            .validate(known_modules)
            .into_iter()
            .map(ValidationError::Generation)
            .collect();

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ValidationError::Logging(format!(
                "Invalid format '{}' (must be 'json' or 'text')",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stderr" | "stdout" | "file") {
            errors.push(ValidationError::Logging(format!(
                "Invalid output '{}' (must be 'stdout', 'stderr' or 'file')",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ScribeError> {
        toml::to_string_pretty(self).map_err(|e| ScribeError::Config(e.to_string()))
    }
}

/// Builds a [`ScribeConfig`] from its sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the global file, `explicit` if given, then the environment.
    pub fn load(explicit: Option<&Path>) -> Result<ScribeConfig, ScribeError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ScribeError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load a single file over the defaults, ignoring other sources.
    pub fn load_from_file(path: &Path) -> Result<ScribeConfig, ScribeError> {
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
