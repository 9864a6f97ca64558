//! CLI presentation: text and json formatters per command.

mod generation;
mod shared;
mod units;

pub use generation::{format_generation_json, format_generation_text, format_modules_text};
pub use shared::format_section_heading;
pub use units::{format_units_json, format_units_text, UnitReport};
