//! Unit enablement resolved from a systemd symlink farm

use super::test_utils::{link, unit_farm, write};
use nix_scribe::system::{SystemAccess, SystemContext, UnitState};
use tempfile::TempDir;

#[test]
fn test_wants_enablement() {
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    let units = UnitState::scan(root.path());

    assert!(units.is_enabled("nginx"));
    assert!(units.is_enabled("nginx.service"));
    assert!(!units.is_enabled("multi-user.target"));
}

#[test]
fn test_alias_enables_target() {
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    let units = UnitState::scan(root.path());

    assert!(units.is_enabled("sddm"));
    assert!(units.exists("display-manager"));
}

#[test]
fn test_dev_null_masks() {
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    let units = UnitState::scan(root.path());

    assert!(units.is_masked("bluetooth"));
    assert!(!units.exists("bluetooth"));
    assert!(!units.is_enabled("bluetooth"));
    assert!(!units.is_disabled("bluetooth"));
}

#[test]
fn test_template_instance() {
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    let units = UnitState::scan(root.path());

    assert!(units.exists("getty@tty1"));
    assert!(units.exists("getty@tty7"));
    assert!(units.is_enabled("getty@tty1"));
    assert!(!units.is_enabled("getty@tty7"));
}

#[test]
fn test_disabled_but_installed() {
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    let units = UnitState::scan(root.path());

    assert!(units.exists("gdm"));
    assert!(units.is_disabled("gdm"));
    assert!(!units.exists("lightdm"));
    assert!(!units.is_disabled("lightdm"));
}

#[test]
fn test_masked_in_wants_overrides_enablement() {
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    link(
        root.path(),
        "/etc/systemd/system/timers.target.wants/nginx.service",
        "/dev/null",
    );
    let units = UnitState::scan(root.path());
    assert!(units.is_masked("nginx"));
    assert!(!units.is_enabled("nginx"));
}

#[test]
fn test_relative_and_dangling_links() {
    let root = TempDir::new().unwrap();
    write(root.path(), "/usr/lib/systemd/system/cups.service", "");
    link(
        root.path(),
        "/etc/systemd/system/multi-user.target.wants/cups.service",
        "../../../../usr/lib/systemd/system/cups.service",
    );
    link(
        root.path(),
        "/etc/systemd/system/multi-user.target.wants/ghost.service",
        "/usr/lib/systemd/system/ghost.service",
    );
    let units = UnitState::scan(root.path());

    assert!(units.is_enabled("cups"));
    assert!(!units.is_enabled("ghost"));
}

#[test]
fn test_context_exposes_units() {
    let root = TempDir::new().unwrap();
    unit_farm(root.path());
    let system = SystemContext::new(root.path(), false);
    assert!(system.units().is_enabled("sddm"));
    assert_eq!(system.units(), &UnitState::scan(root.path()));
}
