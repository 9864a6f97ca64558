//! Desktop environments
//!
//! Each environment is detected by its session binary and maps to a single
//! `services.desktopManager.<name>.enable`.

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::system::SystemAccess;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DesktopIr {
    pub enable: bool,
    /// The binary that gave the environment away.
    pub found: Option<String>,
}

pub struct DesktopManager {
    name: &'static str,
    description: &'static str,
    executables: &'static [&'static str],
}

pub const PLASMA6: DesktopManager = DesktopManager {
    name: "plasma6",
    description: "KDE Plasma 6 Desktop Environment",
    executables: &["plasmashell"],
};

pub const GNOME: DesktopManager = DesktopManager {
    name: "gnome",
    description: "GNOME Desktop Environment",
    executables: &["gnome-shell"],
};

pub const COSMIC: DesktopManager = DesktopManager {
    name: "cosmic",
    description: "COSMIC Desktop Environment",
    executables: &["cosmic-session", "cosmic-comp"],
};

impl Module for DesktopManager {
    type Ir = DesktopIr;

    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> &'static str {
        "services"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<DesktopIr, ScribeError> {
        let found = self
            .executables
            .iter()
            .find_map(|name| system.find_executable_path(name))
            .map(|path| path.display().to_string());
        Ok(DesktopIr {
            enable: found.is_some(),
            found,
        })
    }

    fn map(&self, ir: DesktopIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut block = OptionBlock::new(self.name, self.description);
        block.set(format!("services.desktopManager.{}.enable", self.name), true);
        Some(block)
    }
}
