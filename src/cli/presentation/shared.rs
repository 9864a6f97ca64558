use owo_colors::OwoColorize;

/// Bold, underlined section title.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Green `yes` or dimmed `no`.
pub(crate) fn format_flag(value: bool) -> String {
    if value {
        format!("{}", "yes".green())
    } else {
        format!("{}", "no".dimmed())
    }
}
