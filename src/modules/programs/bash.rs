//! bash shell
//!
//! NixOS enables bash on its own and the users module turns it on for login
//! shells, so this module only carries the system-wide startup files.

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::{read_optional, Module};
use crate::nix::{AttrSet, Value};
use crate::system::SystemAccess;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const PROFILE_PATH: &str = "/etc/profile";
const LOGOUT_PATHS: [&str; 2] = ["/etc/bash_logout", "/etc/bash/bash_logout"];
const BASHRC_PATHS: [&str; 2] = ["/etc/bash.bashrc", "/etc/bashrc"];

static ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*alias(?:\s+--)?\s+([^=\s]+)=(?:'([^']*)'|"([^"]*)"|(\S+))"#).unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BashIr {
    pub enable: bool,
    pub login_shell_init: String,
    pub interactive_shell_init: String,
    pub logout: String,
    pub shell_aliases: IndexMap<String, String>,
    /// The bashrc sets its own `PS1`.
    pub sets_prompt: bool,
}

pub struct Bash;

/// The first of `paths` that exists, read.
fn read_first(system: &dyn SystemAccess, paths: &[&str]) -> Result<Option<String>, ScribeError> {
    for path in paths {
        if let Some(text) = read_optional(system, path)? {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

/// Split a bashrc into its aliases and everything else.
fn split_bashrc(text: &str, ir: &mut BashIr) {
    let mut remaining = Vec::new();
    for line in text.lines() {
        if let Some(caps) = ALIAS.captures(line) {
            let command = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            ir.shell_aliases.insert(caps[1].to_string(), command.to_string());
            continue;
        }
        if line.contains("PS1") {
            ir.sets_prompt = true;
        }
        remaining.push(line);
    }
    ir.interactive_shell_init = remaining.join("\n").trim().to_string();
}

impl Module for Bash {
    type Ir = BashIr;

    fn name(&self) -> &'static str {
        "bash"
    }

    fn category(&self) -> &'static str {
        "programs"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<BashIr, ScribeError> {
        if system.find_executable_path("bash").is_none() {
            return Ok(BashIr::default());
        }
        let mut ir = BashIr {
            enable: true,
            ..BashIr::default()
        };
        if let Some(profile) = read_optional(system, PROFILE_PATH)? {
            ir.login_shell_init = profile.trim().to_string();
        }
        if let Some(logout) = read_first(system, &LOGOUT_PATHS)? {
            ir.logout = logout.trim().to_string();
        }
        if let Some(bashrc) = read_first(system, &BASHRC_PATHS)? {
            split_bashrc(&bashrc, &mut ir);
        }
        Ok(ir)
    }

    fn map(&self, ir: BashIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut block = OptionBlock::new("bash", "Bash Shell Configuration");
        for (option, text) in [
            ("loginShellInit", ir.login_shell_init),
            ("interactiveShellInit", ir.interactive_shell_init),
            ("logout", ir.logout),
        ] {
            if !text.is_empty() {
                block.set(format!("programs.bash.{}", option), text);
            }
        }
        if !ir.shell_aliases.is_empty() {
            let aliases: AttrSet = ir
                .shell_aliases
                .into_iter()
                .map(|(name, command)| (name, Value::from(command)))
                .collect();
            block.set("programs.bash.shellAliases", aliases);
        }
        // Keep the distribution prompt from interactiveShellInit.
        if ir.sets_prompt {
            block.set("programs.bash.promptInit", "");
        }
        if block.is_empty() {
            return None;
        }
        Some(block)
    }
}
