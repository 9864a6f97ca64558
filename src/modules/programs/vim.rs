//! vim editor

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::{read_optional, Module};
use crate::system::path::normalize_guest;
use crate::system::SystemAccess;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const EDITOR_LINK: &str = "/usr/bin/editor";
const ENVIRONMENT_FILES: [&str; 2] = ["/etc/profile", "/etc/environment"];
const MAX_LINK_HOPS: usize = 16;

static EDITOR_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:export\s+)?(?:EDITOR|VISUAL)=['"]?(?:[^'"\s]*/)?vim?['"]?\s*$"#).unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VimIr {
    pub enable: bool,
    pub default_editor: bool,
}

pub struct Vim;

/// Follow `path` through every symlink, staying inside the scanned root.
fn resolve_link(system: &dyn SystemAccess, path: &Path) -> Option<PathBuf> {
    let mut guest = normalize_guest(path);
    for _ in 0..MAX_LINK_HOPS {
        let Ok(target) = fs::read_link(system.root_path(&guest)) else {
            return Some(guest);
        };
        let next = match guest.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target,
        };
        guest = normalize_guest(&next);
    }
    None
}

fn is_vim_binary(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().contains("vim"))
}

impl Vim {
    fn is_default_editor(system: &dyn SystemAccess) -> Result<bool, ScribeError> {
        if resolve_link(system, Path::new(EDITOR_LINK)).is_some_and(|p| is_vim_binary(&p)) {
            return Ok(true);
        }
        for path in ENVIRONMENT_FILES {
            if read_optional(system, path)?.is_some_and(|text| EDITOR_ASSIGNMENT.is_match(&text)) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Module for Vim {
    type Ir = VimIr;

    fn name(&self) -> &'static str {
        "vim"
    }

    fn category(&self) -> &'static str {
        "programs"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<VimIr, ScribeError> {
        if system.find_executable_path("vim").is_none() {
            return Ok(VimIr::default());
        }
        Ok(VimIr {
            enable: true,
            default_editor: Self::is_default_editor(system)?,
        })
    }

    fn map(&self, ir: VimIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut block = OptionBlock::new("vim", "vim editor");
        block.set("programs.vim.enable", true);
        if ir.default_editor {
            block.set("programs.vim.defaultEditor", true);
        }
        Some(block)
    }
}
