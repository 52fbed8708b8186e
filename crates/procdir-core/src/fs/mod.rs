pub mod memory;

pub use memory::MemoryFileSystem;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// The filesystem operations the registry and placement engine rely on.
///
/// `OsFileSystem` is the real disk; `MemoryFileSystem` backs tests.
pub trait FileSystem: Send + Sync {
    /// Direct child directories of `dir`. Errors if `dir` cannot be read.
    fn list_directories(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn list_directories(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| {
                let kind = err
                    .io_error()
                    .map(|e| e.kind())
                    .unwrap_or(io::ErrorKind::Other);
                io::Error::new(
                    kind,
                    format!("Error reading directory {}: {}", dir.display(), err),
                )
            })?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }
        Ok(dirs)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if from.is_file() => {
                // Rename cannot cross devices or shares; fall back to copy + delete.
                debug!(
                    "rename {} -> {} failed ({}), copying instead",
                    from.display(),
                    to.display(),
                    err
                );
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
            Err(err) => Err(err),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_directories_skips_files() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("b")).unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("note.txt"), "x").unwrap();

        let dirs = OsFileSystem.list_directories(tmp.path()).unwrap();
        assert_eq!(dirs, vec![tmp.path().join("a"), tmp.path().join("b")]);
    }

    #[test]
    fn test_list_directories_missing_root_is_not_found() {
        let tmp = tempdir().unwrap();
        let err = OsFileSystem
            .list_directories(&tmp.path().join("missing"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_move_file_consumes_source() {
        let tmp = tempdir().unwrap();
        let from = tmp.path().join("from.txt");
        let to = tmp.path().join("to.txt");
        fs::write(&from, "payload").unwrap();

        OsFileSystem.move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "payload");
    }
}
