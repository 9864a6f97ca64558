//! Access to the scanned system
//!
//! Every guest path is mapped under the scan root before touching the host, so
//! the same scanners work on the live system (`/`) and on a mounted image.
//! When a read is refused by the kernel, the context either retries through
//! `sudo` (if enabled) or reports [`ContextError::ElevationRequired`].

use crate::error::ContextError;
use crate::system::path::{canonicalize_root, join_root};
use crate::system::units::UnitState;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Directories probed for executables when scanning a root other than `/`.
pub const EXECUTABLE_DIRECTORIES: [&str; 5] =
    ["/usr/bin", "/bin", "/usr/sbin", "/sbin", "/usr/local/bin"];

/// Operations scanners and the persistence engine need from a system.
pub trait SystemAccess {
    /// Map a guest path under the scan root.
    fn root_path(&self, path: &Path) -> PathBuf;

    fn path_exists(&self, path: &Path) -> bool;

    fn read_file(&self, path: &Path) -> Result<String, ContextError>;

    /// Guest paths of the regular files in `path`, sorted by name.
    fn read_directory_files(&self, path: &Path) -> Result<Vec<PathBuf>, ContextError>;

    /// Copy a guest file to a host destination.
    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), ContextError>;

    /// Guest path of an executable, if installed.
    fn find_executable_path(&self, name: &str) -> Option<PathBuf>;

    /// Run a command, returning its standard output.
    fn run_command(&self, args: &[&str]) -> Result<String, ContextError>;

    /// Unit state read from the symlink farm when the system was opened.
    fn units(&self) -> &UnitState;
}

/// System rooted at a directory of the host.
#[derive(Debug, Clone)]
pub struct SystemContext {
    root: PathBuf,
    use_sudo: bool,
    units: UnitState,
}

impl SystemContext {
    pub fn new(root: impl AsRef<Path>, use_sudo: bool) -> Self {
        let root = canonicalize_root(root.as_ref());
        let units = UnitState::scan(&root);
        debug!(root = %root.display(), use_sudo, "System context created");
        Self {
            root,
            use_sudo,
            units,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the scan root is the running system.
    pub fn is_live(&self) -> bool {
        self.root == Path::new("/")
    }

    pub fn use_sudo(&self) -> bool {
        self.use_sudo
    }

    /// Check that `sudo` works (prompting for a password if needed) and enable
    /// it for later operations.
    pub fn verify_sudo(&mut self) -> Result<(), ContextError> {
        let status = Command::new("sudo")
            .arg("-v")
            .status()
            .map_err(|source| ContextError::CommandSpawn {
                command: "sudo -v".to_string(),
                source,
            })?;
        if !status.success() {
            return Err(ContextError::CommandFailed {
                command: "sudo -v".to_string(),
                stderr: format!("exited with {}", status),
            });
        }
        self.use_sudo = true;
        Ok(())
    }

    fn elevation(&self, path: &Path, description: &str) -> ContextError {
        ContextError::ElevationRequired {
            target: path.display().to_string(),
            description: description.to_string(),
        }
    }

    fn io_error(path: &Path, source: std::io::Error) -> ContextError {
        ContextError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Rewrite absolute arguments under the scan root.
    fn root_arguments(&self, args: &[&str]) -> Vec<String> {
        args.iter()
            .map(|arg| {
                if !self.is_live() && arg.starts_with('/') {
                    self.root_path(Path::new(arg)).display().to_string()
                } else {
                    arg.to_string()
                }
            })
            .collect()
    }

    fn sudo_output(&self, args: &[String]) -> Result<String, ContextError> {
        let command = format!("sudo {}", args.join(" "));
        debug!(command = %command, "Running with sudo");
        let output = Command::new("sudo")
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ContextError::CommandSpawn {
                command: command.clone(),
                source,
            })?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(ContextError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl SystemAccess for SystemContext {
    fn root_path(&self, path: &Path) -> PathBuf {
        join_root(&self.root, path)
    }

    fn path_exists(&self, path: &Path) -> bool {
        let host = self.root_path(path);
        match fs::metadata(&host) {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::PermissionDenied && self.use_sudo => {
                let args = ["test".to_string(), "-e".to_string(), host.display().to_string()];
                self.sudo_output(&args).is_ok()
            }
            Err(_) => false,
        }
    }

    fn read_file(&self, path: &Path) -> Result<String, ContextError> {
        let host = self.root_path(path);
        match fs::read(&host) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                if self.use_sudo {
                    self.sudo_output(&["cat".to_string(), host.display().to_string()])
                } else {
                    Err(self.elevation(path, "Read permission denied."))
                }
            }
            Err(e) => Err(Self::io_error(path, e)),
        }
    }

    fn read_directory_files(&self, path: &Path) -> Result<Vec<PathBuf>, ContextError> {
        let host = self.root_path(path);
        let names: Vec<String> = match fs::read_dir(&host) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter(|entry| entry.path().is_file())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                if !self.use_sudo {
                    return Err(self.elevation(path, "Directory listing permission denied."));
                }
                let args = [
                    "find".to_string(),
                    host.display().to_string(),
                    "-mindepth".to_string(),
                    "1".to_string(),
                    "-maxdepth".to_string(),
                    "1".to_string(),
                    "-type".to_string(),
                    "f".to_string(),
                    "-printf".to_string(),
                    "%f\\n".to_string(),
                ];
                self.sudo_output(&args)?
                    .lines()
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            Err(e) => return Err(Self::io_error(path, e)),
        };

        let mut files: Vec<PathBuf> = names.into_iter().map(|name| path.join(name)).collect();
        files.sort();
        Ok(files)
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), ContextError> {
        let host = self.root_path(source);
        debug!(source = %host.display(), destination = %destination.display(), "Copying file");
        match fs::copy(&host, destination) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                if !self.use_sudo {
                    return Err(self.elevation(source, "Copy permission denied."));
                }
                let args = [
                    "cp".to_string(),
                    "-p".to_string(),
                    host.display().to_string(),
                    destination.display().to_string(),
                ];
                self.sudo_output(&args).map(|_| ())
            }
            Err(e) => Err(Self::io_error(source, e)),
        }
    }

    fn find_executable_path(&self, name: &str) -> Option<PathBuf> {
        if self.is_live() {
            return which::which(name).ok();
        }
        EXECUTABLE_DIRECTORIES
            .iter()
            .map(|dir| Path::new(dir).join(name))
            .find(|guest| self.root_path(guest).is_file())
    }

    fn run_command(&self, args: &[&str]) -> Result<String, ContextError> {
        let Some((program, rest)) = args.split_first() else {
            return Err(ContextError::CommandFailed {
                command: String::new(),
                stderr: "empty command".to_string(),
            });
        };
        let argv = self.root_arguments(args);
        let command = argv.join(" ");
        debug!(command = %command, "Running command");

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ContextError::CommandSpawn {
                command: command.clone(),
                source,
            })?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.to_lowercase().contains("permission denied") {
            if self.use_sudo {
                return self.sudo_output(&argv);
            }
            warn!(program = %program, args = ?rest, "Command needs elevated privileges");
            return Err(self.elevation(Path::new(program), "Command requires elevated privileges."));
        }
        Err(ContextError::CommandFailed { command, stderr })
    }

    fn units(&self) -> &UnitState {
        &self.units
    }
}
