//! Error types for nix-scribe.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the scanned system.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Access was denied and sudo is not enabled. Recoverable: the caller may
    /// enable sudo and retry.
    #[error("Access denied to {target}. {description}")]
    ElevationRequired { target: String, description: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to run {command}: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ContextError {
    /// Whether retrying with elevated privileges could succeed.
    pub fn is_elevation_request(&self) -> bool {
        matches!(self, ContextError::ElevationRequired { .. })
    }

    /// Whether the underlying I/O error is "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContextError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Errors from the configuration file parsers.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("INI parse error at line {line}: {message}")]
    Ini { line: usize, message: String },

    #[error("Account database parse error at line {line}: {message}")]
    Accounts { line: usize, message: String },
}

/// Errors raised while flushing a document tree to disk.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to create directory {path} for '{node}': {source}")]
    CreateDir {
        node: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path} for '{node}': {source}")]
    Write {
        node: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy asset {source_path} to {destination} for '{node}': {source}")]
    AssetCopy {
        node: String,
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: ContextError,
    },

    #[error("'{node}' would overwrite {path}, which was already written in this save")]
    DuplicateOutput { node: String, path: PathBuf },
}

/// Top-level errors for a generation run.
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Failed to get user input: {0}")]
    Prompt(String),

    #[error("System access error: {0}")]
    Context(#[from] ContextError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Save error: {0}")]
    Save(#[from] SaveError),
}

impl ScribeError {
    /// Whether this wraps a refused access that `sudo` could get past.
    pub fn is_elevation_request(&self) -> bool {
        matches!(self, ScribeError::Context(e) if e.is_elevation_request())
    }
}

impl From<config::ConfigError> for ScribeError {
    fn from(err: config::ConfigError) -> Self {
        ScribeError::Config(err.to_string())
    }
}
