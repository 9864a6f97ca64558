//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Cli, Commands};
use crate::cli::presentation::{
    format_generation_json, format_generation_text, format_modules_text, format_units_json,
    format_units_text, UnitReport,
};
use crate::config::{ConfigLoader, ScribeConfig};
use crate::error::ScribeError;
use crate::modules::builtin_modules;
use crate::scribe::Scribe;
use crate::system::{SystemAccess, SystemContext};
use tracing::info;

/// Runtime context for CLI execution: the effective configuration after
/// every source and command line flag has been applied.
pub struct RunContext {
    config: ScribeConfig,
}

impl RunContext {
    /// Load configuration, fold in CLI flags and validate.
    pub fn new(cli: &Cli) -> Result<Self, ScribeError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        apply_overrides(cli, &mut config);

        let modules = builtin_modules();
        let names: Vec<&str> = modules.iter().map(|m| m.name()).collect();
        config.validate(&names).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ScribeError::Config(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(Self { config })
    }

    pub fn from_config(config: ScribeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScribeConfig {
        &self.config
    }

    /// Execute a command, returning text for stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, ScribeError> {
        match command {
            Commands::Generate { format } => {
                let generation = &self.config.generation;
                let mut system = SystemContext::new(&generation.input_path, generation.use_sudo);
                let report = Scribe::new(generation.clone()).generate(&mut system)?;
                info!(
                    generated = report.generated(),
                    files = report.saved.files().len(),
                    "Generation complete"
                );
                match format.as_str() {
                    "json" => format_generation_json(&report),
                    _ => Ok(format_generation_text(&report)),
                }
            }
            Commands::Units { names, format } => {
                let system = SystemContext::new(&self.config.generation.input_path, false);
                let reports: Vec<UnitReport> = names
                    .iter()
                    .map(|name| UnitReport::new(system.units(), name))
                    .collect();
                match format.as_str() {
                    "json" => format_units_json(&reports),
                    _ => Ok(format_units_text(&reports)),
                }
            }
            Commands::Modules => {
                let disabled: Vec<&str> = self
                    .config
                    .generation
                    .disabled_modules
                    .iter()
                    .map(String::as_str)
                    .collect();
                Ok(format_modules_text(&builtin_modules(), &disabled))
            }
            Commands::Config => self.config.to_toml(),
        }
    }
}

/// Command line flags win over every configuration source.
pub fn apply_overrides(cli: &Cli, config: &mut ScribeConfig) {
    let generation = &mut config.generation;
    if let Some(input) = &cli.input {
        generation.input_path = input.clone();
    }
    if let Some(output) = &cli.output {
        generation.output_path = output.clone();
    }
    if let Some(level) = cli.mod_level {
        generation.modularization = level;
    }
    if cli.no_comment {
        generation.comments = false;
    }
    if cli.interactive {
        generation.interactive = true;
    }
    if cli.sudo {
        generation.use_sudo = true;
    }
    generation.disabled_modules.extend(cli.disable.iter().cloned());
}
