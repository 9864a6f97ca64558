//! Plasma Login Manager

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::nix::{AttrSet, Value};
use crate::parsers::{ConfigReader, IniSections};
use crate::system::SystemAccess;
use serde::Serialize;

const UNIT: &str = "plasmalogin";
const CONFIG_PATHS: [&str; 2] = ["/etc/plasmalogin.conf", "/etc/plasmalogin.conf.d"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlasmaLoginIr {
    pub enable: bool,
    pub config: IniSections,
}

pub struct PlasmaLogin;

impl Module for PlasmaLogin {
    type Ir = PlasmaLoginIr;

    fn name(&self) -> &'static str {
        "plasma-login-manager"
    }

    fn category(&self) -> &'static str {
        "services"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<PlasmaLoginIr, ScribeError> {
        if !system.units().is_enabled(UNIT) {
            return Ok(PlasmaLoginIr::default());
        }
        Ok(PlasmaLoginIr {
            enable: true,
            config: ConfigReader::new(system).read_merged(&CONFIG_PATHS)?,
        })
    }

    fn map(&self, ir: PlasmaLoginIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut login = AttrSet::new();
        login.insert("enable".into(), Value::Bool(true));

        let settings: AttrSet = ir
            .config
            .into_iter()
            .filter(|(_, options)| !options.is_empty())
            .map(|(section, options)| {
                let options: AttrSet = options
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect();
                (section, Value::Attrs(options))
            })
            .collect();
        if !settings.is_empty() {
            login.insert("settings".into(), Value::Attrs(settings).quote_dotted_keys());
        }

        let mut block = OptionBlock::new("plasma-login-manager", "Plasma Login Manager");
        block.set("services.displayManager.plasma-login-manager", login);
        Some(block)
    }
}
