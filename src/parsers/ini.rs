//! INI-style configuration files (NetworkManager, sddm, git)

use crate::error::ParseError;
use indexmap::IndexMap;

/// Section name → ordered key/value pairs.
pub type IniSections = IndexMap<String, IndexMap<String, String>>;

/// Parse INI text.
///
/// Comments start with `;` or `#`. Keys are separated from values by `=` or
/// `:`; a line indented deeper than its key continues the previous value.
/// Keys are lower-cased unless `preserve_case` is set. A later duplicate key
/// replaces the earlier value in place.
pub fn parse_ini(text: &str, preserve_case: bool) -> Result<IniSections, ParseError> {
    let mut sections = IniSections::new();
    let mut current: Option<String> = None;
    let mut last_key: Option<String> = None;
    let mut key_indent = 0;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
            if trimmed.is_empty() {
                last_key = None;
            }
            continue;
        }

        let indent = raw.len() - raw.trim_start().len();
        if indent > key_indent {
            if let (Some(section), Some(key)) = (&current, &last_key) {
                if let Some(value) = sections.get_mut(section).and_then(|s| s.get_mut(key)) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    continue;
                }
            }
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest.strip_suffix(']').ok_or_else(|| ParseError::Ini {
                line: line_no,
                message: format!("unterminated section header '{}'", trimmed),
            })?;
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            last_key = None;
            continue;
        }

        let Some(section) = current.clone() else {
            return Err(ParseError::Ini {
                line: line_no,
                message: "key/value pair outside of a section".to_string(),
            });
        };

        let split = trimmed.find(['=', ':']).ok_or_else(|| ParseError::Ini {
            line: line_no,
            message: format!("expected 'key = value', found '{}'", trimmed),
        })?;
        let key = trimmed[..split].trim();
        let key = if preserve_case {
            key.to_string()
        } else {
            key.to_lowercase()
        };
        let value = trimmed[split + 1..].trim().to_string();

        sections.entry(section).or_default().insert(key.clone(), value);
        last_key = Some(key);
        key_indent = indent;
    }

    Ok(sections)
}
