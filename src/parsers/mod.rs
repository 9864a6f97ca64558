//! Parsers for the configuration formats found on a scanned system

pub mod accounts;
pub mod ini;
pub mod kv;
pub mod net;

pub use accounts::{parse_group, parse_passwd, parse_shadow, parse_subids};
pub use ini::{parse_ini, IniSections};
pub use kv::parse_kv;
pub use net::{parse_hosts, parse_resolv, ResolvConf};

use crate::error::ScribeError;
use crate::nix::{AttrSet, Value};
use crate::system::SystemAccess;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Best-effort typed value for a configuration string.
pub fn infer_value(raw: &str) -> Value {
    let text = raw.trim();
    match text.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    let numeric = !text.is_empty()
        && text.contains('.')
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if numeric {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::String(raw.to_string())
}

/// INI sections as a nested attribute set with inferred values.
pub fn ini_to_value(sections: &IniSections) -> Value {
    Value::Attrs(
        sections
            .iter()
            .map(|(name, entries)| {
                let entries: AttrSet = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), infer_value(v)))
                    .collect();
                (name.clone(), Value::Attrs(entries))
            })
            .collect(),
    )
}

/// Reads configuration files through a [`SystemAccess`].
///
/// Key case is preserved; section and key names are matched exactly.
pub struct ConfigReader<'a> {
    system: &'a dyn SystemAccess,
}

impl<'a> ConfigReader<'a> {
    pub fn new(system: &'a dyn SystemAccess) -> Self {
        Self { system }
    }

    /// Read one INI file, `None` if it does not exist.
    pub fn read_ini(&self, path: &Path) -> Result<Option<IniSections>, ScribeError> {
        if !self.system.path_exists(path) {
            return Ok(None);
        }
        let text = self.system.read_file(path)?;
        Ok(Some(parse_ini(&text, true)?))
    }

    /// Merge INI files in order. Directories stand for their files, sorted by
    /// name; missing paths are skipped. Later files override earlier keys.
    pub fn read_merged(&self, paths: &[&str]) -> Result<IniSections, ScribeError> {
        let mut merged = IniSections::new();
        for file in self.expand(paths)? {
            let Some(sections) = self.read_ini(&file)? else {
                continue;
            };
            debug!(path = %file.display(), sections = sections.len(), "Merging config");
            for (name, entries) in sections {
                merged.entry(name).or_default().extend(entries);
            }
        }
        Ok(merged)
    }

    fn expand(&self, paths: &[&str]) -> Result<Vec<PathBuf>, ScribeError> {
        let mut files = Vec::new();
        for path in paths.iter().map(Path::new) {
            if !self.system.path_exists(path) {
                continue;
            }
            if self.system.root_path(path).is_dir() {
                files.extend(self.system.read_directory_files(path)?);
            } else {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}
