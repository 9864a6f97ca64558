//! Integration tests for nix-scribe

mod cli_binary;
mod config_layers;
mod generation;
mod persistence;
mod unit_resolver;
mod writer_scenarios;
