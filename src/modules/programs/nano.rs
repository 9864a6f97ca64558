//! nano editor

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::{read_optional, Module};
use crate::nix::Value;
use crate::system::SystemAccess;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NanoIr {
    pub enable: bool,
    pub nanorc: Option<String>,
}

pub struct Nano;

/// A nanorc with nothing but comments and blank lines.
fn is_default_nanorc(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

impl Module for Nano {
    type Ir = NanoIr;

    fn name(&self) -> &'static str {
        "nano"
    }

    fn category(&self) -> &'static str {
        "programs"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<NanoIr, ScribeError> {
        if system.find_executable_path("nano").is_none() {
            return Ok(NanoIr::default());
        }
        Ok(NanoIr {
            enable: true,
            nanorc: read_optional(system, "/etc/nanorc")?,
        })
    }

    fn map(&self, ir: NanoIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut block = OptionBlock::new("nano", "nano editor");
        block.set("programs.nano.enable", true);
        if let Some(nanorc) = ir.nanorc.filter(|text| !is_default_nanorc(text)) {
            block.set("programs.nano.nanorc", Value::from(nanorc));
        }
        Some(block)
    }
}
