use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::codec;
use crate::config::AreaRoots;
use crate::error::Error;
use crate::fs::FileSystem;
use crate::model::ProcessRequest;

/// Ensure the folder for `request` exists and return its path.
///
/// Creates the client and year levels as needed. Calling it again with the
/// same request is a no-op that returns the same path.
pub fn materialize(
    fs: &dyn FileSystem,
    roots: &AreaRoots,
    request: &ProcessRequest,
) -> Result<PathBuf, Error> {
    let (folder_name, path) = codec::encode(roots, request);
    ensure_dir(fs, &path)?;
    info!("Process folder ready: {} ({})", folder_name, path.display());
    Ok(path)
}

pub(crate) fn ensure_dir(fs: &dyn FileSystem, path: &Path) -> Result<(), Error> {
    if fs.is_dir(path) {
        debug!("Folder already exists: {}", path.display());
        return Ok(());
    }
    fs.create_dir_all(path).map_err(|source| Error::FolderCreation {
        path: path.to_path_buf(),
        source,
    })
}
