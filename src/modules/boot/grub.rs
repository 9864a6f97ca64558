//! GRUB boot loader

use crate::document::{Asset, OptionBlock};
use crate::error::ScribeError;
use crate::modules::{read_optional, Module};
use crate::nix::{AttrSet, Value};
use crate::parsers::parse_kv;
use crate::system::SystemAccess;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

const GRUB_DEFAULT_PATH: &str = "/etc/default/grub";
const GRUB_CONFIG_PATH: &str = "/boot/grub/grub.cfg";
const MOUNTS_PATH: &str = "/proc/mounts";
const DEFAULT_TIMEOUT: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrubIr {
    pub enable: bool,
    pub efi_support: bool,
    pub use_os_prober: bool,
    pub enable_cryptodisk: bool,
    pub zfs_support: bool,
    pub timeout: i64,
    pub timeout_style: Option<String>,
    pub default: String,
    pub splash_image: Option<String>,
}

impl Default for GrubIr {
    fn default() -> Self {
        Self {
            enable: false,
            efi_support: false,
            use_os_prober: false,
            enable_cryptodisk: false,
            zfs_support: false,
            timeout: DEFAULT_TIMEOUT,
            timeout_style: None,
            default: "0".to_string(),
            splash_image: None,
        }
    }
}

pub struct Grub;

/// Whether any entry of a `/proc/mounts` table has filesystem type `zfs`.
fn has_zfs_mount(mounts: &str) -> bool {
    mounts
        .lines()
        .any(|line| line.split_whitespace().nth(2) == Some("zfs"))
}

impl Grub {
    fn apply_defaults(text: &str, ir: &mut GrubIr, system: &dyn SystemAccess) {
        let config = parse_kv(text);

        if let Some(timeout) = config.get("GRUB_TIMEOUT") {
            match timeout.parse() {
                Ok(t) => ir.timeout = t,
                Err(_) => warn!(value = %timeout, "Failed to parse GRUB_TIMEOUT"),
            }
        }
        if let Some(style) = config.get("GRUB_TIMEOUT_STYLE") {
            ir.timeout_style = Some(style.clone());
        }
        if let Some(default) = config.get("GRUB_DEFAULT") {
            ir.default = default.clone();
        }
        if let Some(disable) = config.get("GRUB_DISABLE_OS_PROBER") {
            ir.use_os_prober = disable.eq_ignore_ascii_case("false");
        }
        if let Some(crypto) = config.get("GRUB_ENABLE_CRYPTODISK") {
            ir.enable_cryptodisk = matches!(crypto.to_lowercase().as_str(), "y" | "yes" | "true");
        }
        if let Some(background) = config.get("GRUB_BACKGROUND") {
            if system.path_exists(Path::new(background)) {
                ir.splash_image = Some(background.clone());
            }
        }
    }
}

impl Module for Grub {
    type Ir = GrubIr;

    fn name(&self) -> &'static str {
        "grub"
    }

    fn category(&self) -> &'static str {
        "boot"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<GrubIr, ScribeError> {
        let mut ir = GrubIr::default();

        let has_config = system.path_exists(Path::new(GRUB_CONFIG_PATH));
        let has_default = system.path_exists(Path::new(GRUB_DEFAULT_PATH));
        let has_bin = system.find_executable_path("grub-install").is_some()
            || system.find_executable_path("grub-mkconfig").is_some();
        if !(has_config || has_default || has_bin) {
            return Ok(ir);
        }
        ir.enable = true;

        ir.efi_support = system.path_exists(Path::new("/sys/firmware/efi"));
        if let Some(mounts) = read_optional(system, MOUNTS_PATH)? {
            ir.zfs_support = has_zfs_mount(&mounts);
        }

        if let Some(text) = read_optional(system, GRUB_DEFAULT_PATH)? {
            Self::apply_defaults(&text, &mut ir, system);
        }

        Ok(ir)
    }

    fn map(&self, ir: GrubIr) -> Option<OptionBlock> {
        if !ir.enable {
            return None;
        }

        let mut grub = AttrSet::new();
        grub.insert("enable".into(), Value::Bool(true));
        if ir.efi_support {
            grub.insert("efiSupport".into(), Value::Bool(true));
        }
        if ir.zfs_support {
            grub.insert("zfsSupport".into(), Value::Bool(true));
        }
        if !ir.default.is_empty() && ir.default != "0" {
            grub.insert("default".into(), Value::from(ir.default));
        }
        if let Some(style) = ir.timeout_style {
            grub.insert("timeoutStyle".into(), Value::from(style));
        }
        if ir.use_os_prober {
            grub.insert("useOSProber".into(), Value::Bool(true));
        }
        if ir.enable_cryptodisk {
            grub.insert("enableCryptodisk".into(), Value::Bool(true));
        }
        if let Some(source) = ir.splash_image {
            let file_name = Path::new(&source)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let asset = Asset::new(&source, format!("boot-loader-grub-{}", file_name));
            grub.insert("splashImage".into(), Value::from(asset));
        }

        let mut block = OptionBlock::new("grub", "GRUB Bootloader Configuration");
        block.set("boot.loader.grub", grub);
        if ir.timeout != DEFAULT_TIMEOUT {
            block.set("boot.loader.timeout", ir.timeout);
        }
        Some(block)
    }
}
