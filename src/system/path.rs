//! Path mapping between the scanned system and the host

use std::path::{Component, Path, PathBuf};

/// Canonicalize the scan root, falling back to the path as given when it does
/// not exist yet.
pub fn canonicalize_root(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Lexically normalize an absolute guest path: drop `.`, resolve `..` without
/// climbing above `/`.
pub fn normalize_guest(path: &Path) -> PathBuf {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut out = PathBuf::from("/");
    out.extend(parts);
    out
}

/// Map a guest path under `root`.
pub fn join_root(root: &Path, guest: &Path) -> PathBuf {
    let normalized = normalize_guest(guest);
    match normalized.strip_prefix("/") {
        Ok(relative) if !relative.as_os_str().is_empty() => root.join(relative),
        _ => root.to_path_buf(),
    }
}
