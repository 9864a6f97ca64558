//! Saving document trees at each modularization level

use super::test_utils::{assignment_lines, write};
use nix_scribe::document::{Asset, ModularizationLevel, NixFile, OptionBlock};
use nix_scribe::error::{ContextError, SaveError};
use nix_scribe::nix::Value;
use nix_scribe::system::{SystemAccess, SystemContext, UnitState};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn block(name: &str, key: &str) -> OptionBlock {
    let mut block = OptionBlock::new(name, format!("{} settings", name));
    block.set(key, true);
    block
}

/// configuration → networking → {firewall (with asset), networkmanager}
fn document() -> NixFile {
    let mut firewall = NixFile::new("firewall", "");
    let mut fw = block("firewall", "networking.firewall.enable");
    fw.set(
        "networking.firewall.extraCommandsFile",
        Value::Asset(Asset::new("/etc/firewall.conf", "firewall.conf")),
    );
    firewall.add_block(fw);

    let mut networkmanager = NixFile::new("networkmanager", "");
    networkmanager.add_block(block("networkmanager", "networking.networkmanager.enable"));

    let mut networking = NixFile::new("networking", "Networking");
    networking.add_import(firewall);
    networking.add_import(networkmanager);

    let mut root = NixFile::new("configuration", "Generated by nix-scribe");
    root.add_block(block("nix", "nix.settings.auto-optimise-store"));
    root.add_import(networking);
    root.add_import("./hardware-configuration.nix");
    root
}

/// configuration → b → c → d, one block per node
fn deep_document() -> NixFile {
    let mut d = NixFile::new("d", "");
    d.add_block(block("d", "d.enable"));
    let mut c = NixFile::new("c", "");
    c.add_block(block("c", "c.enable"));
    c.add_import(d);
    let mut b = NixFile::new("b", "");
    b.add_block(block("b", "b.enable"));
    b.add_import(c);
    let mut root = NixFile::new("configuration", "");
    root.add_import(b);
    root
}

/// Passes everything through to a [`SystemContext`], recording each copy.
struct RecordingSystem {
    inner: SystemContext,
    copies: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl RecordingSystem {
    fn new(inner: SystemContext) -> Self {
        Self {
            inner,
            copies: RefCell::new(Vec::new()),
        }
    }

    fn destinations(&self) -> Vec<PathBuf> {
        self.copies.borrow().iter().map(|(_, to)| to.clone()).collect()
    }
}

impl SystemAccess for RecordingSystem {
    fn root_path(&self, path: &Path) -> PathBuf {
        self.inner.root_path(path)
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.inner.path_exists(path)
    }

    fn read_file(&self, path: &Path) -> Result<String, ContextError> {
        self.inner.read_file(path)
    }

    fn read_directory_files(&self, path: &Path) -> Result<Vec<PathBuf>, ContextError> {
        self.inner.read_directory_files(path)
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), ContextError> {
        self.copies
            .borrow_mut()
            .push((source.to_path_buf(), destination.to_path_buf()));
        self.inner.copy_file(source, destination)
    }

    fn find_executable_path(&self, name: &str) -> Option<PathBuf> {
        self.inner.find_executable_path(name)
    }

    fn run_command(&self, args: &[&str]) -> Result<String, ContextError> {
        self.inner.run_command(args)
    }

    fn units(&self) -> &UnitState {
        self.inner.units()
    }
}

fn system_with_asset() -> (TempDir, SystemContext) {
    let root = TempDir::new().unwrap();
    write(root.path(), "/etc/firewall.conf", "iptables -A INPUT -j ACCEPT\n");
    let system = SystemContext::new(root.path(), false);
    (root, system)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_single_file_with_asset() {
    let (_root, system) = system_with_asset();
    let out = TempDir::new().unwrap();

    let mut root = NixFile::new("configuration", "");
    let mut fw = block("firewall", "networking.firewall.enable");
    fw.set(
        "networking.firewall.extraCommandsFile",
        Value::Asset(Asset::from_source("/etc/firewall.conf")),
    );
    root.add_block(fw);

    let saved = root
        .save(out.path(), ModularizationLevel::SingleFile, &system)
        .unwrap();

    assert_eq!(saved.path, out.path().join("configuration.nix"));
    assert!(saved.children.is_empty());
    let text = read(&saved.path);
    assert!(text.contains("networking.firewall.extraCommandsFile = ./firewall.conf;"));
    assert!(text.ends_with("}\n"));
    assert_eq!(
        read(&out.path().join("firewall.conf")),
        "iptables -A INPUT -j ACCEPT\n"
    );
}

#[test]
fn test_high_level_writes_siblings() {
    let (_root, system) = system_with_asset();
    let out = TempDir::new().unwrap();

    let saved = document()
        .save(out.path(), ModularizationLevel::HighLevel, &system)
        .unwrap();

    let names: Vec<_> = saved.files().iter().map(|f| f.name.clone()).collect();
    assert_eq!(names, vec!["configuration", "networking", "firewall", "networkmanager"]);
    for file in ["configuration.nix", "networking.nix", "firewall.nix", "networkmanager.nix", "firewall.conf"] {
        assert!(out.path().join(file).is_file(), "missing {}", file);
    }

    let root = read(&out.path().join("configuration.nix"));
    assert!(root.contains("  imports = [\n    ./networking.nix\n    ./hardware-configuration.nix\n  ];\n"));
    let networking = read(&out.path().join("networking.nix"));
    assert!(networking.starts_with("# Networking\n{\n"));
    assert!(networking.contains("    ./firewall.nix\n    ./networkmanager.nix\n"));
}

#[test]
fn test_component_level_uses_directories() {
    let (_root, system) = system_with_asset();
    let out = TempDir::new().unwrap();

    let saved = document()
        .save(out.path(), ModularizationLevel::ComponentLevel, &system)
        .unwrap();

    let dir = out.path().join("networking");
    assert!(dir.join("default.nix").is_file());
    assert!(dir.join("firewall.nix").is_file());
    assert!(dir.join("networkmanager.nix").is_file());
    assert!(dir.join("firewall.conf").is_file());
    assert!(!out.path().join("firewall.conf").exists());

    let networking = &saved.children[0];
    assert_eq!(networking.import_path, "./networking");
    assert_eq!(networking.path, dir.join("default.nix"));
    assert_eq!(networking.children[0].assets, vec![dir.join("firewall.conf")]);

    let root = read(&out.path().join("configuration.nix"));
    assert!(root.contains("    ./networking\n"));
}

#[test]
fn test_levels_produce_same_assignments() {
    let (_root, system) = system_with_asset();
    let mut results = Vec::new();

    for level in ModularizationLevel::ALL {
        let out = TempDir::new().unwrap();
        let saved = document().save(out.path(), level, &system).unwrap();
        let texts: Vec<String> = saved.files().iter().map(|f| read(&f.path)).collect();
        results.push(assignment_lines(texts.iter().map(String::as_str)));
    }

    assert!(!results[0].is_empty());
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[test]
fn test_shared_asset_is_copied_once() {
    let (_root, system) = system_with_asset();
    let out = TempDir::new().unwrap();

    let asset = Asset::from_source("/etc/firewall.conf");
    let mut root = NixFile::new("configuration", "");
    let mut first = block("a", "a.enable");
    first.set("a.file", Value::Asset(asset.clone()));
    let mut second = block("b", "b.enable");
    second.set("b.file", Value::Asset(asset));
    root.add_block(first).add_block(second);

    let saved = root
        .save(out.path(), ModularizationLevel::SingleFile, &system)
        .unwrap();
    assert_eq!(saved.assets, vec![out.path().join("firewall.conf")]);
}

#[test]
fn test_missing_asset_aborts_with_node_name() {
    let root_dir = TempDir::new().unwrap();
    let system = SystemContext::new(root_dir.path(), false);
    let out = TempDir::new().unwrap();

    let mut root = NixFile::new("configuration", "");
    let mut b = block("grub", "boot.loader.grub.enable");
    b.set(
        "boot.loader.grub.splashImage",
        Value::Asset(Asset::new("/boot/grub/splash.png", "splash.png")),
    );
    root.add_block(b);

    let err = root
        .save(out.path(), ModularizationLevel::SingleFile, &system)
        .unwrap_err();
    match err {
        SaveError::AssetCopy { node, destination, .. } => {
            assert_eq!(node, "configuration");
            assert_eq!(destination, out.path().join("splash.png"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_output_directory_is_created() {
    let system = SystemContext::new(TempDir::new().unwrap().path(), false);
    let out = TempDir::new().unwrap();
    let target = out.path().join("nested/config");

    let saved = NixFile::new("configuration", "")
        .save(&target, ModularizationLevel::SingleFile, &system)
        .unwrap();
    assert_eq!(read(&saved.path), "{\n\n}\n");
}

#[test]
fn test_component_level_nests_three_deep() {
    let system = SystemContext::new(TempDir::new().unwrap().path(), false);
    let out = TempDir::new().unwrap();

    let saved = deep_document()
        .save(out.path(), ModularizationLevel::ComponentLevel, &system)
        .unwrap();

    let p = out.path();
    let paths: Vec<_> = saved.files().iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            p.join("configuration.nix"),
            p.join("b/default.nix"),
            p.join("b/c/default.nix"),
            p.join("b/c/d.nix"),
        ]
    );
    assert!(read(&p.join("configuration.nix")).contains("    ./b\n"));
    assert!(read(&p.join("b/default.nix")).contains("    ./c\n"));
    assert!(read(&p.join("b/c/default.nix")).contains("    ./d.nix\n"));
    assert!(read(&p.join("b/c/d.nix")).contains("d.enable = true;"));
}

#[test]
fn test_high_level_flattens_three_deep() {
    let system = SystemContext::new(TempDir::new().unwrap().path(), false);
    let out = TempDir::new().unwrap();

    let saved = deep_document()
        .save(out.path(), ModularizationLevel::HighLevel, &system)
        .unwrap();

    let p = out.path();
    let paths: Vec<_> = saved.files().iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        vec![p.join("configuration.nix"), p.join("b.nix"), p.join("c.nix"), p.join("d.nix")]
    );
    assert!(read(&p.join("b.nix")).contains("    ./c.nix\n"));
    assert!(read(&p.join("c.nix")).contains("    ./d.nix\n"));
    assert!(!p.join("b").exists());
}

#[test]
fn test_assets_are_copied_through_system_access() {
    let (_root, inner) = system_with_asset();
    let system = RecordingSystem::new(inner);
    let out = TempDir::new().unwrap();

    document()
        .save(out.path(), ModularizationLevel::ComponentLevel, &system)
        .unwrap();

    assert_eq!(
        *system.copies.borrow(),
        vec![(
            PathBuf::from("/etc/firewall.conf"),
            out.path().join("networking/firewall.conf")
        )]
    );
}

#[test]
fn test_asset_shared_by_siblings_is_copied_once() {
    let (_root, inner) = system_with_asset();
    let system = RecordingSystem::new(inner);
    let out = TempDir::new().unwrap();

    let asset = Asset::from_source("/etc/firewall.conf");
    let mut networking = NixFile::new("networking", "");
    for name in ["firewall", "nftables"] {
        let mut file = NixFile::new(name, "");
        let mut b = block(name, &format!("networking.{}.enable", name));
        b.set(format!("networking.{}.rulesFile", name), Value::Asset(asset.clone()));
        file.add_block(b);
        networking.add_import(file);
    }
    let mut root = NixFile::new("configuration", "");
    root.add_import(networking);

    root.save(out.path(), ModularizationLevel::ComponentLevel, &system)
        .unwrap();

    assert_eq!(system.destinations(), vec![out.path().join("networking/firewall.conf")]);
    assert!(out.path().join("networking/nftables.nix").is_file());
}
