use super::shared::format_section_heading;
use crate::error::ScribeError;
use crate::modules::DynModule;
use crate::scribe::{GenerationReport, ModuleStatus};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

fn format_status(status: &ModuleStatus) -> String {
    match status {
        ModuleStatus::Generated => format!("{}", "generated".green()),
        ModuleStatus::NothingToConfigure => format!("{}", "nothing to configure".dimmed()),
        ModuleStatus::Disabled => format!("{}", "disabled".dimmed()),
        ModuleStatus::Skipped(reason) => format!("{} ({})", "skipped".yellow(), reason),
    }
}

/// Module outcomes and the written files.
pub fn format_generation_text(report: &GenerationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Modules")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Module", "Category", "Status"]);
    for outcome in &report.outcomes {
        table.add_row(vec![
            outcome.name.to_string(),
            outcome.category.to_string(),
            format_status(&outcome.status),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));

    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Files ({})", report.level))
    ));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Node", "Path", "Assets"]);
    for file in report.saved.files() {
        table.add_row(vec![
            file.name.clone(),
            file.path.display().to_string(),
            file.assets.len().to_string(),
        ]);
    }
    out.push_str(&format!("{}", table));
    out
}

pub fn format_generation_json(report: &GenerationReport) -> Result<String, ScribeError> {
    serde_json::to_string_pretty(report).map_err(|e| ScribeError::Config(e.to_string()))
}

/// Built-in modules, marking the disabled ones.
pub fn format_modules_text(modules: &[Box<dyn DynModule>], disabled: &[&str]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Module", "Category", "Enabled"]);
    for module in modules {
        table.add_row(vec![
            module.name().to_string(),
            module.category().to_string(),
            super::shared::format_flag(!disabled.contains(&module.name())),
        ]);
    }
    format!("{}", table)
}
