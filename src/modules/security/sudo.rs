//! sudo
//!
//! Reads `/etc/sudoers` with its `@include`/`@includedir` files expanded and
//! looks for the handful of patterns NixOS exposes as options. The rules
//! themselves are kept in the scan result for logging only.

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::nix::{AttrSet, Value};
use crate::system::SystemAccess;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SUDOERS_PATH: &str = "/etc/sudoers";
const MAX_INCLUDE_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SudoIr {
    pub enable: bool,
    pub wheel_needs_password: bool,
    pub exec_wheel_only: bool,
    pub rules: Vec<String>,
}

impl Default for SudoIr {
    fn default() -> Self {
        Self {
            enable: false,
            wheel_needs_password: true,
            exec_wheel_only: false,
            rules: Vec::new(),
        }
    }
}

pub struct Sudo;

enum Directive<'a> {
    Include(&'a str),
    IncludeDir(&'a str),
    Rule(&'a str),
    Skip,
}

/// `@name arg` or the older `#name arg`.
fn strip_directive<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    ['@', '#'].into_iter().find_map(|prefix| {
        line.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(name))
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map(str::trim)
    })
}

fn classify(line: &str) -> Directive<'_> {
    let line = line.trim();
    if let Some(dir) = strip_directive(line, "includedir") {
        Directive::IncludeDir(dir)
    } else if let Some(file) = strip_directive(line, "include") {
        Directive::Include(file)
    } else if line.is_empty() || line.starts_with('#') {
        Directive::Skip
    } else {
        Directive::Rule(line)
    }
}

/// Join backslash-continued lines.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        match line.strip_suffix('\\') {
            Some(head) => {
                current.push_str(head);
                current.push(' ');
            }
            None => {
                current.push_str(line);
                lines.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// sudo skips `includedir` entries containing a dot or ending in `~`.
fn is_included_name(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .is_some_and(|name| !name.contains('.') && !name.ends_with('~'))
}

fn resolve(base: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.parent().unwrap_or(Path::new("/")).join(target)
    }
}

/// Every rule of `path` and the files it includes, in order.
fn collect_rules(
    system: &dyn SystemAccess,
    path: &Path,
    depth: usize,
    rules: &mut Vec<String>,
) -> Result<(), ScribeError> {
    if depth > MAX_INCLUDE_DEPTH {
        warn!(path = %path.display(), "sudoers includes nested too deeply");
        return Ok(());
    }
    if !system.path_exists(path) {
        return Ok(());
    }
    let text = system.read_file(path)?;
    for line in logical_lines(&text) {
        match classify(&line) {
            Directive::Rule(rule) => rules.push(rule.to_string()),
            Directive::Include(file) => {
                collect_rules(system, &resolve(path, file), depth + 1, rules)?;
            }
            Directive::IncludeDir(dir) => {
                let dir = resolve(path, dir);
                if !system.path_exists(&dir) {
                    continue;
                }
                for file in system.read_directory_files(&dir)? {
                    if is_included_name(&file) {
                        collect_rules(system, &file, depth + 1, rules)?;
                    } else {
                        debug!(path = %file.display(), "Skipping sudoers fragment");
                    }
                }
            }
            Directive::Skip => {}
        }
    }
    Ok(())
}

fn wheel_without_password(rules: &[String]) -> bool {
    rules.iter().any(|rule| {
        rule.split_whitespace().next() == Some("%wheel") && rule.contains("NOPASSWD:")
    })
}

/// `stat -c "%a %G"` output for a binary others cannot execute.
fn others_cannot_execute(stat: &str) -> bool {
    stat.split_whitespace()
        .next()
        .and_then(|mode| mode.chars().last())
        .and_then(|c| c.to_digit(8))
        .is_some_and(|others| others & 1 == 0)
}

impl Module for Sudo {
    type Ir = SudoIr;

    fn name(&self) -> &'static str {
        "sudo"
    }

    fn category(&self) -> &'static str {
        "security"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<SudoIr, ScribeError> {
        let Some(sudo) = system.find_executable_path("sudo") else {
            return Ok(SudoIr::default());
        };
        if !system.path_exists(Path::new(SUDOERS_PATH)) {
            debug!("sudo installed without /etc/sudoers");
            return Ok(SudoIr::default());
        }

        let mut ir = SudoIr {
            enable: true,
            ..SudoIr::default()
        };
        collect_rules(system, Path::new(SUDOERS_PATH), 0, &mut ir.rules)?;
        ir.wheel_needs_password = !wheel_without_password(&ir.rules);

        let sudo = sudo.to_string_lossy().into_owned();
        match system.run_command(&["stat", "-c", "%a %G", sudo.as_str()]) {
            Ok(stat) => ir.exec_wheel_only = others_cannot_execute(&stat),
            Err(e) if e.is_elevation_request() => return Err(e.into()),
            Err(e) => warn!(error = %e, "Failed to read sudo permissions"),
        }
        Ok(ir)
    }

    fn map(&self, ir: SudoIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut sudo = AttrSet::new();
        sudo.insert("enable".into(), Value::Bool(true));
        if ir.exec_wheel_only {
            sudo.insert("execWheelOnly".into(), Value::Bool(true));
        }
        if !ir.wheel_needs_password {
            sudo.insert("wheelNeedsPassword".into(), Value::Bool(false));
        }

        let mut block = OptionBlock::new("sudo", "Sudo Configuration");
        block.set("security.sudo", sudo);
        Some(block)
    }
}
