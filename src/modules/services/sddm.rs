//! SDDM display manager

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::nix::{AttrSet, Value};
use crate::parsers::{ConfigReader, IniSections};
use crate::system::SystemAccess;
use serde::Serialize;
use tracing::warn;

const CONFIG_PATHS: [&str; 2] = ["/etc/sddm.conf", "/etc/sddm.conf.d"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SddmIr {
    pub enable: bool,
    pub config: IniSections,
}

pub struct Sddm;

impl Module for Sddm {
    type Ir = SddmIr;

    fn name(&self) -> &'static str {
        "sddm"
    }

    fn category(&self) -> &'static str {
        "services"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<SddmIr, ScribeError> {
        if !system.units().is_enabled("sddm") {
            return Ok(SddmIr::default());
        }
        let config = match ConfigReader::new(system).read_merged(&CONFIG_PATHS) {
            Ok(config) => config,
            Err(e) if e.is_elevation_request() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Failed to read sddm configuration");
                IniSections::new()
            }
        };
        Ok(SddmIr {
            enable: true,
            config,
        })
    }

    fn map(&self, ir: SddmIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut config = ir.config;
        let mut sddm = AttrSet::new();
        sddm.insert("enable".into(), Value::Bool(true));

        if let Some(general) = config.get_mut("General") {
            if let Some(server) = general.shift_remove("DisplayServer") {
                match server.to_lowercase().as_str() {
                    "wayland" => {
                        sddm.insert("wayland.enable".into(), Value::Bool(true));
                    }
                    "x11" => {
                        sddm.insert("wayland.enable".into(), Value::Bool(false));
                    }
                    _ => {}
                }
            }
            if let Some(numlock) = general.shift_remove("Numlock") {
                match numlock.to_lowercase().as_str() {
                    "on" => {
                        sddm.insert("autoNumlock".into(), Value::Bool(true));
                    }
                    "off" => {
                        sddm.insert("autoNumlock".into(), Value::Bool(false));
                    }
                    _ => {}
                }
            }
        }
        if let Some(theme) = config.get_mut("Theme").and_then(|t| t.shift_remove("Current")) {
            sddm.insert("theme".into(), Value::from(theme));
        }

        let settings: AttrSet = config
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
            sddm.insert("settings".into(), Value::Attrs(settings));
        }

        let mut block = OptionBlock::new("sddm", "Simple Desktop Display Manager");
        block.set("services.displayManager.sddm", sddm);
        Some(block)
    }
}
