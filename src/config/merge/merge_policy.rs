//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("generation.input_path", "/")?
        .set_default("generation.output_path", ".")?
        .set_default("generation.modularization", "single-file")?
        .set_default("generation.comments", true)?
        .set_default("generation.root_name", "configuration")
}
