use super::shared::{format_flag, format_section_heading};
use crate::error::ScribeError;
use crate::system::units::normalize_unit_name;
use crate::system::UnitState;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;

/// Resolver answers for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub unit: String,
    pub exists: bool,
    pub enabled: bool,
    pub disabled: bool,
    pub masked: bool,
}

impl UnitReport {
    pub fn new(units: &UnitState, name: &str) -> Self {
        Self {
            unit: normalize_unit_name(name),
            exists: units.exists(name),
            enabled: units.is_enabled(name),
            disabled: units.is_disabled(name),
            masked: units.is_masked(name),
        }
    }
}

pub fn format_units_text(reports: &[UnitReport]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Unit", "Exists", "Enabled", "Disabled", "Masked"]);
    for report in reports {
        table.add_row(vec![
            report.unit.clone(),
            format_flag(report.exists),
            format_flag(report.enabled),
            format_flag(report.disabled),
            format_flag(report.masked),
        ]);
    }
    format!("{}\n\n{}", format_section_heading("Units"), table)
}

pub fn format_units_json(reports: &[UnitReport]) -> Result<String, ScribeError> {
    serde_json::to_string_pretty(reports).map_err(|e| ScribeError::Config(e.to_string()))
}
