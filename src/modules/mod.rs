//! Scanner/mapper modules
//!
//! Each module reads one topic from the scanned system into a typed
//! intermediate representation, then maps it to an [`OptionBlock`]. Scanning
//! and mapping are separate steps so the representation can be logged and
//! tested on its own.

pub mod boot;
pub mod networking;
pub mod programs;
pub mod security;
pub mod services;
pub mod users;

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::system::SystemAccess;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

/// A scanner/mapper pair for one topic.
pub trait Module {
    /// What the scanner found.
    type Ir: Serialize + Debug;

    fn name(&self) -> &'static str;

    /// Top-level grouping (`boot`, `networking`, ...), used for file layout.
    fn category(&self) -> &'static str;

    fn scan(&self, system: &dyn SystemAccess) -> Result<Self::Ir, ScribeError>;

    /// `None` when there is nothing to configure.
    fn map(&self, ir: Self::Ir) -> Option<OptionBlock>;
}

/// Object-safe view of a [`Module`].
pub trait DynModule {
    fn name(&self) -> &'static str;
    fn category(&self) -> &'static str;

    /// Scan, log the intermediate representation, and map.
    fn generate(&self, system: &dyn SystemAccess) -> Result<Option<OptionBlock>, ScribeError>;
}

impl<M: Module> DynModule for M {
    fn name(&self) -> &'static str {
        Module::name(self)
    }

    fn category(&self) -> &'static str {
        Module::category(self)
    }

    fn generate(&self, system: &dyn SystemAccess) -> Result<Option<OptionBlock>, ScribeError> {
        let ir = self.scan(system)?;
        match serde_json::to_string(&ir) {
            Ok(json) => debug!(module = Module::name(self), ir = %json, "Scanned"),
            Err(_) => debug!(module = Module::name(self), ir = ?ir, "Scanned"),
        }
        let block = self.map(ir);
        if block.is_none() {
            debug!(module = Module::name(self), "Nothing to configure");
        }
        Ok(block)
    }
}

/// Every built-in module, in generation order.
pub fn builtin_modules() -> Vec<Box<dyn DynModule>> {
    vec![
        Box::new(boot::grub::Grub),
        Box::new(networking::base::Networking),
        Box::new(networking::networkmanager::NetworkManager),
        Box::new(users::accounts::Users),
        Box::new(users::groups::Groups),
        Box::new(security::sudo::Sudo),
        Box::new(security::rtkit::Rtkit),
        Box::new(programs::bash::Bash),
        Box::new(programs::nano::Nano),
        Box::new(programs::vim::Vim),
        Box::new(programs::git::Git),
        Box::new(programs::hyprland::Hyprland),
        Box::new(services::sddm::Sddm),
        Box::new(services::gdm::Gdm),
        Box::new(services::cosmic_greeter::CosmicGreeter),
        Box::new(services::plasma_login::PlasmaLogin),
        Box::new(services::desktop::PLASMA6),
        Box::new(services::desktop::GNOME),
        Box::new(services::desktop::COSMIC),
    ]
}

/// Read an optional file: `None` when it does not exist.
pub(crate) fn read_optional(
    system: &dyn SystemAccess,
    path: &str,
) -> Result<Option<String>, ScribeError> {
    let path = std::path::Path::new(path);
    if !system.path_exists(path) {
        return Ok(None);
    }
    Ok(Some(system.read_file(path)?))
}
