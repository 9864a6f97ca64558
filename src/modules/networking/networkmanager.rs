//! NetworkManager

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::nix::{AttrSet, Value};
use crate::parsers::{infer_value, ConfigReader, IniSections};
use crate::system::SystemAccess;
use serde::Serialize;

const CONFIG_PATHS: [&str; 2] = [
    "/etc/NetworkManager/NetworkManager.conf",
    "/etc/NetworkManager/conf.d",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkManagerIr {
    pub enable: bool,
    pub config: IniSections,
}

pub struct NetworkManager;

fn truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "yes" | "true" | "1")
}

impl Module for NetworkManager {
    type Ir = NetworkManagerIr;

    fn name(&self) -> &'static str {
        "networkmanager"
    }

    fn category(&self) -> &'static str {
        "networking"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<NetworkManagerIr, ScribeError> {
        let enable = system.units().is_enabled("NetworkManager");
        if !enable {
            return Ok(NetworkManagerIr::default());
        }
        let config = ConfigReader::new(system).read_merged(&CONFIG_PATHS)?;
        Ok(NetworkManagerIr { enable, config })
    }

    fn map(&self, ir: NetworkManagerIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut settings = ir.config;
        let mut nm = AttrSet::new();
        nm.insert("enable".into(), Value::Bool(true));

        if let Some(main) = settings.get_mut("main") {
            for key in ["dns", "dhcp"] {
                if let Some(value) = main.shift_remove(key) {
                    nm.insert(key.into(), Value::from(value));
                }
            }
        }

        let mut wifi = AttrSet::new();
        if let Some(powersave) = settings
            .get_mut("connection")
            .and_then(|c| c.shift_remove("wifi.powersave"))
        {
            // 2 disables power saving, 3 enables it.
            wifi.insert("powersave".into(), Value::Bool(powersave.trim() != "2"));
        }
        if let Some(random) = settings
            .get_mut("device")
            .and_then(|d| d.shift_remove("wifi.scan-rand-mac-address"))
        {
            wifi.insert("scanRandMacAddress".into(), Value::Bool(truthy(&random)));
        }
        if !wifi.is_empty() {
            nm.insert("wifi".into(), Value::Attrs(wifi));
        }

        let remaining: AttrSet = settings
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
        if !remaining.is_empty() {
            nm.insert("settings".into(), Value::Attrs(remaining).quote_dotted_keys());
        }

        let mut block = OptionBlock::new("networkmanager", "NetworkManager configuration");
        block.set("networking.networkmanager", nm);
        Some(block)
    }
}
