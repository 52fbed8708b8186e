use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error};

use crate::error::Error;

const ACCESS_PROBE_FILE: &str = ".procdir_access_probe.tmp";

#[cfg(target_os = "windows")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("explorer");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Reveal `path` in the platform file manager. Does not wait for it to close.
pub fn open_in_file_explorer(path: &Path) -> Result<(), Error> {
    if !path.exists() {
        return Err(Error::FolderNotFound(path.to_path_buf()));
    }
    let path = normalize_separators(path);
    match opener(&path).spawn() {
        Ok(_) => {
            debug!("Opened {} in the file explorer", path.display());
            Ok(())
        }
        Err(source) => {
            error!("Could not open {}: {}", path.display(), source);
            Err(Error::ExplorerLaunch { path, source })
        }
    }
}

/// Check that `dir` can be listed and written to by this process.
pub fn check_folder_access(dir: &Path) -> Result<(), Error> {
    if !dir.is_dir() {
        return Err(Error::FolderNotFound(dir.to_path_buf()));
    }
    fs::read_dir(dir)?;
    let probe = dir.join(ACCESS_PROBE_FILE);
    fs::write(&probe, b"probe").map_err(|e| {
        error!("Write access denied in {}: {}", dir.display(), e);
        e
    })?;
    fs::remove_file(&probe)?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn normalize_separators(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace('/', "\\"))
}

#[cfg(not(target_os = "windows"))]
fn normalize_separators(path: &Path) -> PathBuf {
    path.to_path_buf()
}
