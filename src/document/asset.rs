//! Auxiliary files shipped next to generated Nix files

use std::path::{Path, PathBuf};

/// A file on the scanned system that is copied next to the Nix file referencing
/// it. Rendered as `./<target_filename>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Asset {
    source_path: PathBuf,
    target_filename: String,
}

impl Asset {
    pub fn new(source_path: impl Into<PathBuf>, target_filename: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            target_filename: target_filename.into(),
        }
    }

    /// Asset keeping the source's own file name.
    pub fn from_source(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let target_filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source_path,
            target_filename,
        }
    }

    /// Path on the scanned system (guest path, not yet mapped under a root).
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn target_filename(&self) -> &str {
        &self.target_filename
    }
}
