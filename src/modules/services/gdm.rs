//! GNOME display manager

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::nix::{AttrSet, Value};
use crate::parsers::{infer_value, ConfigReader, IniSections};
use crate::system::SystemAccess;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

const EXECUTABLES: [&str; 2] = ["gdm", "gdm3"];
const CONFIG_PATHS: [&str; 3] = [
    "/etc/gdm/custom.conf",
    "/etc/gdm3/custom.conf",
    "/etc/gdm/daemon.conf",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GdmIr {
    pub enable: bool,
    pub config: IniSections,
}

pub struct Gdm;

impl Module for Gdm {
    type Ir = GdmIr;

    fn name(&self) -> &'static str {
        "gdm"
    }

    fn category(&self) -> &'static str {
        "services"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<GdmIr, ScribeError> {
        if !EXECUTABLES
            .iter()
            .any(|name| system.find_executable_path(name).is_some())
        {
            return Ok(GdmIr::default());
        }
        let mut ir = GdmIr {
            enable: true,
            config: IniSections::new(),
        };
        let Some(path) = CONFIG_PATHS
            .iter()
            .map(Path::new)
            .find(|p| system.path_exists(p))
        else {
            return Ok(ir);
        };
        match ConfigReader::new(system).read_ini(path) {
            Ok(config) => ir.config = config.unwrap_or_default(),
            Err(e) if e.is_elevation_request() => return Err(e),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to parse gdm configuration"),
        }
        Ok(ir)
    }

    fn map(&self, ir: GdmIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut config = ir.config;
        let mut gdm = AttrSet::new();
        gdm.insert("enable".into(), Value::Bool(true));

        if let Some(daemon) = config.get_mut("daemon") {
            if let Some(wayland) = daemon.shift_remove("WaylandEnable") {
                match wayland.to_lowercase().as_str() {
                    "true" => {
                        gdm.insert("wayland".into(), Value::Bool(true));
                    }
                    "false" => {
                        gdm.insert("wayland".into(), Value::Bool(false));
                    }
                    _ => {}
                }
            }
            if let Some(delay) = daemon.shift_remove("TimedLoginDelay") {
                match delay.trim().parse::<i64>() {
                    Ok(delay) => {
                        gdm.insert("autoLogin.delay".into(), Value::Int(delay));
                    }
                    Err(_) => warn!(value = %delay, "Failed to parse TimedLoginDelay"),
                }
            }
        }
        if let Some(debug) = config.get_mut("debug").and_then(|d| d.shift_remove("Enable")) {
            if debug.eq_ignore_ascii_case("true") {
                gdm.insert("debug".into(), Value::Bool(true));
            }
        }

        let settings: AttrSet = config
            .into_iter()
            .filter(|(_, options)| !options.is_empty())
            .map(|(section, options)| {
                let options: AttrSet = options
                    .into_iter()
                    .map(|(k, v)| (k, infer_value(&v)))
                    .collect();
                (section, Value::Attrs(options))
            })
            .collect();
        if !settings.is_empty() {
            gdm.insert("settings".into(), Value::Attrs(settings).quote_dotted_keys());
        }

        let mut block = OptionBlock::new("gdm", "GNOME Display Manager");
        block.set("services.displayManager.gdm", gdm);
        Some(block)
    }
}
