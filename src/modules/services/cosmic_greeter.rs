//! COSMIC greeter

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::system::SystemAccess;
use serde::Serialize;

const UNIT: &str = "cosmic-greeter-daemon";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CosmicGreeterIr {
    pub enable: bool,
}

pub struct CosmicGreeter;

impl Module for CosmicGreeter {
    type Ir = CosmicGreeterIr;

    fn name(&self) -> &'static str {
        "cosmic-greeter"
    }

    fn category(&self) -> &'static str {
        "services"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<CosmicGreeterIr, ScribeError> {
        Ok(CosmicGreeterIr {
            enable: system.units().is_enabled(UNIT),
        })
    }

    fn map(&self, ir: CosmicGreeterIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut block = OptionBlock::new("cosmic-greeter", "COSMIC greeter");
        block.set("services.displayManager.cosmic-greeter.enable", true);
        Some(block)
    }
}
