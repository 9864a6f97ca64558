//! CLI parse: clap types for nix-scribe. No behavior; definitions only.

use crate::document::ModularizationLevel;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// nix-scribe CLI - generate a NixOS configuration from an existing system
#[derive(Debug, Parser)]
#[command(name = "nix-scribe")]
#[command(about = "Generate nix configuration from an existing system")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the root directory of the OS
    #[arg(short, long = "input", global = true)]
    pub input: Option<PathBuf>,

    /// Output directory for the configuration
    #[arg(short, long = "output", global = true)]
    pub output: Option<PathBuf>,

    /// Modularization: 0|single-file, 1|high-level, 2|component-level
    #[arg(short, long = "mod-level", value_parser = parse_level, global = true)]
    pub mod_level: Option<ModularizationLevel>,

    /// Don't write comments to the output files
    #[arg(long, global = true)]
    pub no_comment: bool,

    /// Ask before retrying refused reads with sudo
    #[arg(long, global = true)]
    pub interactive: bool,

    /// Retry refused reads with sudo without asking
    #[arg(long, global = true)]
    pub sudo: bool,

    /// Skip a module (repeatable)
    #[arg(long = "disable", value_name = "MODULE", global = true)]
    pub disable: Vec<String>,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Scan the system and write the configuration (default)
    Generate {
        /// Report format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show how the resolver sees systemd units
    Units {
        /// Unit names, with or without suffix
        #[arg(required = true)]
        names: Vec<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the built-in modules
    Modules,
    /// Print the effective configuration as TOML
    Config,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Generate {
            format: "text".to_string(),
        }
    }
}

fn parse_level(value: &str) -> Result<ModularizationLevel, String> {
    value.parse()
}
