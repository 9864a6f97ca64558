//! nix-scribe: NixOS configuration from an existing system
//!
//! Scans a running (or mounted) Linux system, maps what it finds to NixOS
//! options, and writes them as Nix files at a chosen modularization level.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod modules;
pub mod nix;
pub mod parsers;
pub mod scribe;
pub mod system;
