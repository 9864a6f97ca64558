//! Persistence: flushing a document tree to disk
//!
//! A single [`NixFile::save`] call at the root walks the tree depth-first. Each
//! node first flushes its child nodes and swaps them for relative import paths,
//! then renders itself, then copies the assets of its blocks into its own
//! directory. `save` consumes the tree, so every node is written once.

use crate::document::{Asset, Import, NixFile};
use crate::error::SaveError;
use crate::nix::{NixWriter, WriterOptions};
use crate::system::SystemAccess;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// How a document tree is split across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ModularizationLevel {
    /// Everything in the root file.
    #[default]
    SingleFile = 0,
    /// One file per child node, all next to the root.
    HighLevel = 1,
    /// Nodes with children become directories with a `default.nix`.
    ComponentLevel = 2,
}

impl ModularizationLevel {
    pub const ALL: [ModularizationLevel; 3] = [
        ModularizationLevel::SingleFile,
        ModularizationLevel::HighLevel,
        ModularizationLevel::ComponentLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModularizationLevel::SingleFile => "single-file",
            ModularizationLevel::HighLevel => "high-level",
            ModularizationLevel::ComponentLevel => "component-level",
        }
    }
}

impl fmt::Display for ModularizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for ModularizationLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ModularizationLevel::SingleFile),
            1 => Ok(ModularizationLevel::HighLevel),
            2 => Ok(ModularizationLevel::ComponentLevel),
            other => Err(format!(
                "invalid modularization level {}, expected 0, 1 or 2",
                other
            )),
        }
    }
}

impl FromStr for ModularizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u8>() {
            return Self::try_from(n);
        }
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "single-file" | "single" => Ok(ModularizationLevel::SingleFile),
            "high-level" | "high" => Ok(ModularizationLevel::HighLevel),
            "component-level" | "component" => Ok(ModularizationLevel::ComponentLevel),
            _ => Err(format!(
                "invalid modularization level '{}', expected single-file, high-level or component-level",
                s
            )),
        }
    }
}

impl Serialize for ModularizationLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModularizationLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u8),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Self::try_from(n).map_err(serde::de::Error::custom),
            Repr::Name(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Where a node ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub name: String,
    pub path: PathBuf,
    /// Import expression used by the parent (`./name.nix` or `./name`).
    pub import_path: String,
    pub assets: Vec<PathBuf>,
    pub children: Vec<SavedFile>,
}

impl SavedFile {
    /// This file and every descendant, pre-order.
    pub fn files(&self) -> Vec<&SavedFile> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.files());
        }
        out
    }
}

impl NixFile {
    /// Write this node and all of its child nodes under `output_dir`.
    ///
    /// The root goes to `<output_dir>/<name>.nix`. Asset sources are read
    /// through `system`, so they are resolved against its root.
    pub fn save(
        self,
        output_dir: &Path,
        level: ModularizationLevel,
        system: &dyn SystemAccess,
    ) -> Result<SavedFile, SaveError> {
        self.save_with(output_dir, level, WriterOptions::default(), system)
    }

    pub fn save_with(
        self,
        output_dir: &Path,
        level: ModularizationLevel,
        options: WriterOptions,
        system: &dyn SystemAccess,
    ) -> Result<SavedFile, SaveError> {
        info!(
            node = %self.name,
            dir = %output_dir.display(),
            level = %level,
            "Saving configuration"
        );
        let mut session = SaveSession {
            level,
            options,
            system,
            written: HashMap::new(),
        };
        create_dir(&self.name, output_dir)?;
        let path = output_dir.join(format!("{}.nix", self.name));
        let import_path = format!("./{}.nix", self.name);
        let saved = session.flush(self, output_dir, path, import_path)?;
        info!(
            files = saved.files().len(),
            "Configuration saved"
        );
        Ok(saved)
    }
}

struct SaveSession<'a> {
    level: ModularizationLevel,
    options: WriterOptions,
    system: &'a dyn SystemAccess,
    /// Paths written in this save, with the asset source for copied assets.
    written: HashMap<PathBuf, Option<PathBuf>>,
}

impl SaveSession<'_> {
    fn claim(&mut self, node: &str, path: &Path, asset_source: Option<&Path>) -> Result<bool, SaveError> {
        match self.written.get(path) {
            None => {
                self.written
                    .insert(path.to_path_buf(), asset_source.map(Path::to_path_buf));
                Ok(true)
            }
            // Same asset reached from two nodes sharing a directory.
            Some(Some(previous)) if Some(previous.as_path()) == asset_source => Ok(false),
            Some(_) => Err(SaveError::DuplicateOutput {
                node: node.to_string(),
                path: path.to_path_buf(),
            }),
        }
    }

    fn flush_child(&mut self, child: NixFile, parent_dir: &Path) -> Result<SavedFile, SaveError> {
        if self.level == ModularizationLevel::ComponentLevel && child.has_file_imports() {
            let dir = parent_dir.join(&child.name);
            create_dir(&child.name, &dir)?;
            let path = dir.join("default.nix");
            let import_path = format!("./{}", child.name);
            self.flush(child, &dir, path, import_path)
        } else {
            let path = parent_dir.join(format!("{}.nix", child.name));
            let import_path = format!("./{}.nix", child.name);
            self.flush(child, parent_dir, path, import_path)
        }
    }

    fn flush(
        &mut self,
        mut node: NixFile,
        dir: &Path,
        path: PathBuf,
        import_path: String,
    ) -> Result<SavedFile, SaveError> {
        self.claim(&node.name, &path, None)?;

        debug!(node = %node.name, path = %path.display(), "Resolving imports");
        let mut children = Vec::new();
        let mut imports = Vec::with_capacity(node.imports.len());
        for import in std::mem::take(&mut node.imports) {
            match import {
                Import::Path(p) => imports.push(Import::Path(p)),
                Import::File(child) => {
                    let saved = self.flush_child(child, dir)?;
                    imports.push(Import::Path(saved.import_path.clone()));
                    children.push(saved);
                }
            }
        }
        node.imports = imports;

        debug!(node = %node.name, path = %path.display(), "Rendering");
        let mut writer = NixWriter::with_options(self.options.clone());
        node.render(&mut writer);
        let mut text = writer.into_text();
        text.push('\n');
        std::fs::write(&path, text).map_err(|source| SaveError::Write {
            node: node.name.clone(),
            path: path.clone(),
            source,
        })?;

        let assets: BTreeSet<&Asset> = node.blocks.iter().flat_map(|b| b.assets()).collect();
        if !assets.is_empty() {
            debug!(node = %node.name, count = assets.len(), "Writing assets");
        }
        let mut copied = Vec::with_capacity(assets.len());
        for asset in assets {
            let destination = dir.join(asset.target_filename());
            if !self.claim(&node.name, &destination, Some(asset.source_path()))? {
                continue;
            }
            self.system
                .copy_file(asset.source_path(), &destination)
                .map_err(|source| SaveError::AssetCopy {
                    node: node.name.clone(),
                    source_path: asset.source_path().to_path_buf(),
                    destination: destination.clone(),
                    source,
                })?;
            copied.push(destination);
        }

        debug!(node = %node.name, path = %path.display(), "Flushed");
        Ok(SavedFile {
            name: node.name,
            path,
            import_path,
            assets: copied,
            children,
        })
    }
}

fn create_dir(node: &str, dir: &Path) -> Result<(), SaveError> {
    std::fs::create_dir_all(dir).map_err(|source| SaveError::CreateDir {
        node: node.to_string(),
        path: dir.to_path_buf(),
        source,
    })
}
