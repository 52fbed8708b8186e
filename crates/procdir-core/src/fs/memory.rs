use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::FileSystem;

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// In-memory directory tree. Paths are used verbatim as keys, so callers
/// should stick to one spelling (absolute, no `.`/`..`).
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
        self.nodes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert_ancestors(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) -> io::Result<()> {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            match nodes.get(ancestor) {
                Some(Node::File(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} is a file", ancestor.display()),
                    ))
                }
                Some(Node::Dir) => {}
                None => {
                    nodes.insert(ancestor.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn check_parent(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => match nodes.get(parent) {
                Some(Node::Dir) => Ok(()),
                _ => Err(not_found(parent)),
            },
            _ => Ok(()),
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) -> io::Result<()> {
        Self::insert_ancestors(&mut self.nodes(), path.as_ref())
    }

    /// Create a file, creating its parent directories as needed.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> io::Result<()> {
        let path = path.as_ref();
        let mut nodes = self.nodes();
        if let Some(parent) = path.parent() {
            Self::insert_ancestors(&mut nodes, parent)?;
        }
        if matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a directory", path.display()),
            ));
        }
        nodes.insert(path.to_path_buf(), Node::File(contents.into()));
        Ok(())
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes().get(path.as_ref()) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Names of the files directly inside `dir`, sorted.
    pub fn file_names(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let dir = dir.as_ref();
        self.nodes()
            .iter()
            .filter(|(path, node)| matches!(node, Node::File(_)) && path.parent() == Some(dir))
            .filter_map(|(path, _)| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_directories(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let nodes = self.nodes();
        match nodes.get(dir) {
            Some(Node::Dir) => {}
            _ => return Err(not_found(dir)),
        }
        Ok(nodes
            .iter()
            .filter(|(path, node)| matches!(node, Node::Dir) && path.parent() == Some(dir))
            .map(|(path, _)| path.clone())
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.nodes().get(path), Some(Node::Dir))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        Self::insert_ancestors(&mut self.nodes(), path)
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();
        Self::check_parent(&nodes, to)?;
        match nodes.get(from) {
            Some(Node::File(_)) => {}
            _ => return Err(not_found(from)),
        }
        if let Some(node) = nodes.remove(from) {
            nodes.insert(to.to_path_buf(), node);
        }
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut nodes = self.nodes();
        Self::check_parent(&nodes, to)?;
        let bytes = match nodes.get(from) {
            Some(Node::File(bytes)) => bytes.clone(),
            _ => return Err(not_found(from)),
        };
        let len = bytes.len() as u64;
        nodes.insert(to.to_path_buf(), Node::File(bytes));
        Ok(len)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();
        match nodes.get(path) {
            Some(Node::File(_)) => {
                nodes.remove(path);
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }
}
