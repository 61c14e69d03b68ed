//! In-memory filesystem for deterministic tree and controller tests

use crate::domain::{DriveInfo, FileEntry};
use crate::error::{ExplorerError, Result};
use crate::filesystem::{is_reserved_dir_name, sort_entries, sort_paths_by_name, FileSystem};
use chrono::Local;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
enum MemNode {
    Dir,
    File { size: u64 },
}

#[derive(Debug, Default)]
pub struct MemoryFs {
    drives: Vec<DriveInfo>,
    nodes: BTreeMap<PathBuf, MemNode>,
    denied: RefCell<HashSet<PathBuf>>,
    /// Number of `list_subdirectories` calls, i.e. tree loads
    pub subdirectory_listings: Cell<usize>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drive(mut self, root: &str) -> Self {
        self.drives.push(DriveInfo::root(root));
        self.nodes.insert(PathBuf::from(root), MemNode::Dir);
        self
    }

    /// Adds a directory and any missing ancestors.
    pub fn dir(mut self, path: &str) -> Self {
        self.insert_dirs(Path::new(path));
        self
    }

    pub fn file(mut self, path: &str, size: u64) -> Self {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.nodes.insert(path, MemNode::File { size });
        self
    }

    /// Makes listing `path` fail as if permission were denied.
    pub fn deny(self, path: &str) -> Self {
        self.revoke(Path::new(path));
        self
    }

    /// Denies `path` from now on, for access that goes away mid-session.
    pub fn revoke(&self, path: &Path) {
        self.denied.borrow_mut().insert(path.to_path_buf());
    }

    pub fn listings(&self) -> usize {
        self.subdirectory_listings.get()
    }

    fn insert_dirs(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor == Path::new("/") {
                break;
            }
            self.nodes.entry(ancestor.to_path_buf()).or_insert(MemNode::Dir);
        }
    }

    fn children<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = (&'a PathBuf, &'a MemNode)> {
        self.nodes
            .iter()
            .filter(move |(p, _)| p.parent() == Some(path))
    }

    fn check_readable(&self, path: &Path) -> Result<()> {
        if self.denied.borrow().contains(path) {
            return Err(ExplorerError::io(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            ));
        }
        match self.nodes.get(path) {
            Some(MemNode::Dir) => Ok(()),
            _ => Err(ExplorerError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            )),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl FileSystem for MemoryFs {
    fn list_drives(&self) -> Vec<DriveInfo> {
        self.drives.clone()
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<FileEntry>> {
        self.check_readable(path)?;
        let now = Local::now();
        let mut entries: Vec<FileEntry> = self
            .children(path)
            .filter_map(|(p, node)| {
                let name = file_name(p);
                match node {
                    MemNode::Dir if is_reserved_dir_name(&name) => None,
                    MemNode::Dir => Some(FileEntry::directory(p.clone(), name, now)),
                    MemNode::File { size } => Some(FileEntry::file(p.clone(), name, *size, now)),
                }
            })
            .collect();
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn list_subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.subdirectory_listings
            .set(self.subdirectory_listings.get() + 1);
        self.check_readable(path)?;
        let mut dirs: Vec<PathBuf> = self
            .children(path)
            .filter(|(_, node)| matches!(node, MemNode::Dir))
            .map(|(p, _)| p.clone())
            .collect();
        sort_paths_by_name(&mut dirs);
        Ok(dirs)
    }

    fn has_subdirectories(&self, path: &Path) -> bool {
        self.check_readable(path).is_ok()
            && self
                .children(path)
                .any(|(_, node)| matches!(node, MemNode::Dir))
    }

    fn can_access(&self, path: &Path) -> bool {
        self.check_readable(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.nodes.get(path), Some(MemNode::Dir))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.nodes.get(path), Some(MemNode::File { .. }))
    }
}
