//! nix-scribe CLI Binary
//!
//! Scans a Linux system and writes an equivalent NixOS configuration.

use anyhow::Context;
use clap::Parser;
use nix_scribe::cli::{map_error, Cli, RunContext};
use nix_scribe::config::ConfigLoader;
use nix_scribe::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("nix-scribe starting");

    let context = match RunContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let command = cli.command.clone().unwrap_or_default();
    match context.execute(&command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Logging settings from the config file, overridden by CLI flags.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = load_logging(cli).unwrap_or_else(|e| {
        eprintln!("{:#}", e);
        LoggingConfig::default()
    });

    if cli.quiet {
        config.enabled = false;
    }
    match cli.verbose {
        0 => {}
        1 => config.level = "info".to_string(),
        2 => config.level = "debug".to_string(),
        _ => config.level = "trace".to_string(),
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }
    config
}

fn load_logging(cli: &Cli) -> anyhow::Result<LoggingConfig> {
    let config = ConfigLoader::load(cli.config.as_deref())
        .context("Failed to load logging configuration, using defaults")?;
    Ok(config.logging)
}
