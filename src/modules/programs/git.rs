//! Git

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::{read_optional, Module};
use crate::nix::{AttrSet, Value};
use crate::parsers::{ini_to_value, parse_ini, IniSections};
use crate::system::SystemAccess;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

const GITCONFIG_PATH: &str = "/etc/gitconfig";
const SHELL_INIT_FILES: [&str; 3] = ["/etc/bashrc", "/etc/bash.bashrc", "/etc/profile"];
const PROMPT_MARKERS: [&str; 3] = ["__git_ps1", "git-prompt.sh", "git-sh-prompt"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitIr {
    pub enable: bool,
    pub lfs: bool,
    pub prompt_enable: bool,
    pub config: IniSections,
}

pub struct Git;

/// Whether a system shell init file loads the git prompt.
fn prompt_enabled(system: &dyn SystemAccess) -> bool {
    SHELL_INIT_FILES
        .iter()
        .map(Path::new)
        .filter(|path| system.path_exists(path))
        .filter_map(|path| system.read_file(path).ok())
        .any(|text| PROMPT_MARKERS.iter().any(|marker| text.contains(marker)))
}

impl Module for Git {
    type Ir = GitIr;

    fn name(&self) -> &'static str {
        "git"
    }

    fn category(&self) -> &'static str {
        "programs"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<GitIr, ScribeError> {
        if system.find_executable_path("git").is_none() {
            return Ok(GitIr::default());
        }

        let mut ir = GitIr {
            enable: true,
            lfs: system.find_executable_path("git-lfs").is_some(),
            ..GitIr::default()
        };
        if let Some(text) = read_optional(system, GITCONFIG_PATH)? {
            match parse_ini(&text, true) {
                Ok(config) => ir.config = config,
                Err(e) => warn!(path = GITCONFIG_PATH, error = %e, "Failed to parse git config"),
            }
        }
        ir.prompt_enable = prompt_enabled(system);
        Ok(ir)
    }

    fn map(&self, ir: GitIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut git = AttrSet::new();
        git.insert("enable".into(), Value::Bool(true));
        if ir.prompt_enable {
            git.insert("prompt.enable".into(), Value::Bool(true));
        }
        if !ir.config.is_empty() {
            git.insert("config".into(), ini_to_value(&ir.config));
        }
        if ir.lfs {
            git.insert("lfs.enable".into(), Value::Bool(true));
        }

        let mut block = OptionBlock::new("git", "Git version control system");
        block.set("programs.git", git);
        Some(block)
    }
}
