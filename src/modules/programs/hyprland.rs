//! Hyprland compositor

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::system::SystemAccess;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HyprlandIr {
    pub enable: bool,
}

pub struct Hyprland;

impl Module for Hyprland {
    type Ir = HyprlandIr;

    fn name(&self) -> &'static str {
        "hyprland"
    }

    fn category(&self) -> &'static str {
        "programs"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<HyprlandIr, ScribeError> {
        Ok(HyprlandIr {
            enable: system.find_executable_path("Hyprland").is_some(),
        })
    }

    fn map(&self, ir: HyprlandIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut block = OptionBlock::new("hyprland", "Hyprland compositor");
        block.set("programs.hyprland.enable", true);
        Some(block)
    }
}
