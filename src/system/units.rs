//! Unit enablement from the systemd symlink farm
//!
//! Nothing here talks to a running service manager. Enablement is read from
//! the unit directories of the scanned root: unit files and aliases in the
//! directories themselves, `.wants`/`.requires` links for enablement, and
//! links to `/dev/null` for masking.

use crate::system::path::{join_root, normalize_guest};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Unit directories, lowest precedence first.
pub const UNIT_DIRECTORIES: [&str; 3] = [
    "/lib/systemd/system",
    "/usr/lib/systemd/system",
    "/etc/systemd/system",
];

pub const UNIT_SUFFIXES: &[&str] = &[
    ".service",
    ".socket",
    ".timer",
    ".target",
    ".path",
    ".mount",
    ".automount",
    ".swap",
    ".slice",
    ".scope",
    ".device",
];

/// Whether `name` ends in a unit suffix.
pub fn is_unit_name(name: &str) -> bool {
    UNIT_SUFFIXES
        .iter()
        .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
}

/// `name` with `.service` appended unless it already names a unit.
pub fn normalize_unit_name(name: &str) -> String {
    if is_unit_name(name) {
        name.to_string()
    } else {
        format!("{}.service", name)
    }
}

/// `foo@.service` for `foo@bar.service`.
fn template_base(unit: &str) -> Option<String> {
    let (prefix, rest) = unit.split_once('@')?;
    let suffix = UNIT_SUFFIXES.iter().find(|s| rest.ends_with(*s))?;
    Some(format!("{}@{}", prefix, suffix))
}

fn is_dev_null(target: &Path) -> bool {
    target == Path::new("/dev/null") || target.ends_with("dev/null")
}

/// Existing, enabled and masked units of a system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitState {
    existing: BTreeSet<String>,
    enabled: BTreeSet<String>,
    masked: BTreeSet<String>,
}

impl UnitState {
    /// Read the unit directories under `root`. Missing or unreadable
    /// directories are skipped.
    pub fn scan(root: &Path) -> Self {
        let mut state = Self::default();
        for dir in UNIT_DIRECTORIES {
            state.scan_directory(root, Path::new(dir));
        }
        debug!(
            existing = state.existing.len(),
            enabled = state.enabled.len(),
            masked = state.masked.len(),
            "Unit state loaded"
        );
        state
    }

    fn scan_directory(&mut self, root: &Path, guest_dir: &Path) {
        for entry in list_directory(&join_root(root, guest_dir)) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().is_dir() {
                if name.ends_with(".wants") || name.ends_with(".requires") {
                    self.scan_wants(root, &guest_dir.join(&name));
                }
                continue;
            }
            if !is_unit_name(&name) {
                continue;
            }

            let target = if entry.path_is_symlink() {
                read_link(entry.path())
            } else {
                None
            };
            match target {
                Some(target) if is_dev_null(&target) => {
                    self.existing.remove(&name);
                    self.masked.insert(name);
                }
                Some(target) => {
                    self.masked.remove(&name);
                    self.existing.insert(name);
                    // Alias such as display-manager.service -> sddm.service.
                    let target_name = target
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .filter(|n| is_unit_name(n));
                    if let Some(target_name) = target_name {
                        if resolves(root, guest_dir, &target) {
                            self.enabled.insert(target_name);
                        }
                    }
                }
                None => {
                    self.masked.remove(&name);
                    self.existing.insert(name);
                }
            }
        }
    }

    fn scan_wants(&mut self, root: &Path, guest_dir: &Path) {
        for entry in list_directory(&join_root(root, guest_dir)) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_unit_name(&name) {
                continue;
            }

            if !entry.path_is_symlink() {
                self.enabled.insert(name);
                continue;
            }
            let Some(target) = read_link(entry.path()) else {
                continue;
            };
            if is_dev_null(&target) {
                self.enabled.remove(&name);
                self.masked.insert(name);
            } else if resolves(root, guest_dir, &target) {
                self.enabled.insert(name);
            } else {
                debug!(unit = %name, target = %target.display(), "Dangling unit link");
            }
        }
    }

    /// Whether a unit file (or its template) is installed and not masked.
    pub fn exists(&self, name: &str) -> bool {
        let unit = normalize_unit_name(name);
        if self.masked.contains(&unit) {
            return false;
        }
        self.existing.contains(&unit)
            || template_base(&unit).is_some_and(|base| self.existing.contains(&base))
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        let unit = normalize_unit_name(name);
        self.enabled.contains(&unit) && !self.masked.contains(&unit) && self.exists(name)
    }

    /// Installed but not enabled.
    pub fn is_disabled(&self, name: &str) -> bool {
        let unit = normalize_unit_name(name);
        self.exists(name) && !self.enabled.contains(&unit)
    }

    pub fn is_masked(&self, name: &str) -> bool {
        self.masked.contains(&normalize_unit_name(name))
    }

    pub fn existing(&self) -> &BTreeSet<String> {
        &self.existing
    }

    pub fn enabled(&self) -> &BTreeSet<String> {
        &self.enabled
    }

    pub fn masked(&self) -> &BTreeSet<String> {
        &self.masked
    }
}

/// Direct children of `dir`, sorted by file name, without following links.
fn list_directory(dir: &Path) -> Vec<DirEntry> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    for entry in walker {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => debug!(dir = %dir.display(), error = %e, "Skipping unreadable unit entry"),
        }
    }
    entries
}

fn read_link(path: &Path) -> Option<PathBuf> {
    match fs::read_link(path) {
        Ok(target) => Some(target),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Failed to read unit link");
            None
        }
    }
}

/// Whether a link target exists on the scanned system. Relative targets are
/// taken relative to the directory holding the link.
fn resolves(root: &Path, guest_dir: &Path, target: &Path) -> bool {
    let guest = if target.is_absolute() {
        target.to_path_buf()
    } else {
        normalize_guest(&guest_dir.join(target))
    };
    join_root(root, &guest).exists()
}
