//! RealtimeKit

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::Module;
use crate::nix::{AttrSet, Value};
use crate::system::SystemAccess;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

const UNIT_PATHS: [&str; 3] = [
    "/lib/systemd/system/rtkit-daemon.service",
    "/usr/lib/systemd/system/rtkit-daemon.service",
    "/etc/systemd/system/rtkit-daemon.service",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RtkitIr {
    pub enable: bool,
    pub args: Vec<String>,
}

pub struct Rtkit;

/// Arguments following the program on the first `ExecStart=` line.
fn exec_start_args(unit: &str) -> Vec<String> {
    unit.lines()
        .filter_map(|line| line.trim().strip_prefix("ExecStart="))
        .map(|command| {
            command
                .split_whitespace()
                .skip(1)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .find(|args| !args.is_empty())
        .unwrap_or_default()
}

impl Module for Rtkit {
    type Ir = RtkitIr;

    fn name(&self) -> &'static str {
        "rtkit"
    }

    fn category(&self) -> &'static str {
        "security"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<RtkitIr, ScribeError> {
        if !system.units().exists("rtkit-daemon") {
            return Ok(RtkitIr::default());
        }

        let mut ir = RtkitIr {
            enable: true,
            args: Vec::new(),
        };
        let Some(path) = UNIT_PATHS
            .iter()
            .map(Path::new)
            .find(|p| system.path_exists(p))
        else {
            return Ok(ir);
        };
        match system.read_file(path) {
            Ok(unit) => ir.args = exec_start_args(&unit),
            Err(e) if e.is_elevation_request() => return Err(e.into()),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to read unit file"),
        }
        Ok(ir)
    }

    fn map(&self, ir: RtkitIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }
        let mut rtkit = AttrSet::new();
        rtkit.insert("enable".into(), Value::Bool(true));
        if !ir.args.is_empty() {
            rtkit.insert("args".into(), Value::from(ir.args));
        }
        let mut block = OptionBlock::new("rtkit", "RealtimeKit system service");
        block.set("security.rtkit", rtkit);
        Some(block)
    }
}
