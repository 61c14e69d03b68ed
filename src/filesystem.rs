//! Filesystem access: drives, directory listings and accessibility probes
//!
//! Everything above this module talks to the disk through the [`FileSystem`]
//! trait so the tree and the controller can be driven by an in-memory
//! implementation in tests. All calls are synchronous.

use crate::domain::{DriveInfo, FileEntry};
use crate::error::{ExplorerError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{DiskKind, Disks};
use tracing::{debug, warn};

/// Folder holding audio auditions for instrument presets. Never listed.
pub const PREVIEWS_DIR: &str = ".previews";

pub fn is_reserved_dir_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(PREVIEWS_DIR)
}

pub trait FileSystem {
    /// Ready, mounted drives. Never fails; enumeration problems yield an empty list.
    fn list_drives(&self) -> Vec<DriveInfo>;

    /// Directories first, then files, each group ordered by name. The reserved
    /// previews folder is never included and unreadable entries are skipped.
    fn list_directory(&self, path: &Path) -> Result<Vec<FileEntry>>;

    /// Full paths of the immediate subdirectories of `path`, ordered by name.
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Whether `path` has at least one subdirectory. Only looks one level down.
    fn has_subdirectories(&self, path: &Path) -> bool;

    /// True iff listing the children of `path` succeeds.
    fn can_access(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;
}

/// Directories before files, then case-insensitive name order with the exact
/// name as a tie breaker so the order is total.
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn sort_paths_by_name(paths: &mut [PathBuf]) {
    let name = |p: &PathBuf| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    };
    paths.sort_by(|a, b| name(a).cmp(&name(b)).then_with(|| a.cmp(b)));
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        LocalFileSystem
    }

    fn entry_is_dir(entry: &fs::DirEntry) -> Option<bool> {
        let file_type = entry.file_type().ok()?;
        if file_type.is_symlink() {
            // Follow links so linked folders show up as folders
            fs::metadata(entry.path()).ok().map(|m| m.is_dir())
        } else {
            Some(file_type.is_dir())
        }
    }
}

fn drive_type_name(kind: DiskKind, removable: bool) -> &'static str {
    if removable {
        return "Removable";
    }
    match kind {
        DiskKind::HDD => "HDD",
        DiskKind::SSD => "SSD",
        DiskKind::Unknown(_) => "Fixed",
    }
}

impl FileSystem for LocalFileSystem {
    fn list_drives(&self) -> Vec<DriveInfo> {
        let disks = Disks::new_with_refreshed_list();
        let mut seen = HashSet::new();
        let mut drives = Vec::new();

        for disk in disks.list() {
            let mount_point = disk.mount_point().to_path_buf();
            if !seen.insert(mount_point.clone()) {
                continue;
            }
            // Not ready (e.g. an empty card reader)
            if fs::metadata(&mount_point).is_err() {
                debug!("Skipping drive that is not ready: {:?}", mount_point);
                continue;
            }
            let label = disk.name().to_string_lossy();
            drives.push(DriveInfo::new(
                mount_point,
                &label,
                drive_type_name(disk.kind(), disk.is_removable()),
                disk.total_space(),
                disk.available_space(),
            ));
        }

        if drives.is_empty() {
            warn!("Drive enumeration returned no ready drives");
        }
        drives.sort_by(|a, b| a.name.cmp(&b.name));
        drives
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<FileEntry>> {
        let read_dir = fs::read_dir(path).map_err(|e| ExplorerError::io(path, e))?;
        let mut entries = Vec::new();

        for entry_result in read_dir {
            // Skip entries that cannot be read (permission errors, broken links, ...)
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry in {:?}: {}", path, e);
                    continue;
                }
            };

            let entry_path = entry.path();
            let file_entry = match FileEntry::from_path(&entry_path) {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping {:?}: {}", entry_path, e);
                    continue;
                }
            };
            if file_entry.is_directory && is_reserved_dir_name(&file_entry.name) {
                continue;
            }
            entries.push(file_entry);
        }

        sort_entries(&mut entries);
        Ok(entries)
    }

    fn list_subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let read_dir = fs::read_dir(path).map_err(|e| ExplorerError::io(path, e))?;
        let mut dirs: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .filter(|entry| Self::entry_is_dir(entry).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        sort_paths_by_name(&mut dirs);
        Ok(dirs)
    }

    fn has_subdirectories(&self, path: &Path) -> bool {
        match fs::read_dir(path) {
            Ok(read_dir) => read_dir
                .filter_map(|entry| entry.ok())
                .any(|entry| Self::entry_is_dir(&entry).unwrap_or(false)),
            Err(_) => false,
        }
    }

    fn can_access(&self, path: &Path) -> bool {
        fs::read_dir(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    mod list_directory_tests {
        use super::*;

        #[test]
        fn test_directories_precede_files_sorted_by_name() {
            let temp_dir = TempDir::new().unwrap();
            let dir = temp_dir.path();
            fs::write(dir.join("b.wav"), b"b").unwrap();
            fs::write(dir.join("A.mp3"), b"a").unwrap();
            fs::create_dir(dir.join("zeta")).unwrap();
            fs::create_dir(dir.join("Alpha")).unwrap();

            let entries = LocalFileSystem.list_directory(dir).unwrap();

            assert_eq!(names(&entries), vec!["Alpha", "zeta", "A.mp3", "b.wav"]);
            assert!(entries[0].is_directory && entries[1].is_directory);
            assert!(!entries[2].is_directory && !entries[3].is_directory);
        }

        #[test]
        fn test_previews_folder_is_excluded() {
            let temp_dir = TempDir::new().unwrap();
            let dir = temp_dir.path();
            fs::create_dir(dir.join(".previews")).unwrap();
            fs::create_dir(dir.join("Kits")).unwrap();
            fs::write(dir.join("lead.nki"), b"x").unwrap();

            let entries = LocalFileSystem.list_directory(dir).unwrap();

            assert_eq!(names(&entries), vec!["Kits", "lead.nki"]);
        }

        #[test]
        fn test_file_metadata_is_captured() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("loop.ogg"), vec![0u8; 2048]).unwrap();

            let entries = LocalFileSystem.list_directory(temp_dir.path()).unwrap();

            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].size, 2048);
            assert_eq!(entries[0].extension, ".ogg");
            assert_eq!(entries[0].display_size().as_deref(), Some("2.00 KB"));
        }

        #[cfg(unix)]
        #[test]
        fn test_dangling_link_is_skipped_and_linked_folder_listed() {
            let temp_dir = TempDir::new().unwrap();
            let dir = temp_dir.path();
            fs::create_dir(dir.join("Downloads")).unwrap();
            std::os::unix::fs::symlink(dir.join("missing.wav"), dir.join("broken.wav")).unwrap();
            std::os::unix::fs::symlink(dir.join("Downloads"), dir.join("linked")).unwrap();

            let entries = LocalFileSystem.list_directory(dir).unwrap();

            assert_eq!(names(&entries), vec!["Downloads", "linked"]);
            assert!(entries.iter().all(|e| e.is_directory));
            assert_eq!(entries[0].icon, "⬇️");
        }

        #[test]
        fn test_empty_directory() {
            let temp_dir = TempDir::new().unwrap();
            let entries = LocalFileSystem.list_directory(temp_dir.path()).unwrap();
            assert!(entries.is_empty());
        }

        #[test]
        fn test_nonexistent_directory_is_an_error() {
            let result = LocalFileSystem.list_directory(Path::new("/nonexistent/directory/42"));
            assert!(matches!(result, Err(ExplorerError::Io { .. })));
        }
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn test_list_subdirectories_only_returns_directories() {
            let temp_dir = TempDir::new().unwrap();
            let dir = temp_dir.path();
            fs::create_dir(dir.join("b")).unwrap();
            fs::create_dir(dir.join("A")).unwrap();
            fs::write(dir.join("file.txt"), b"x").unwrap();

            let subdirs = LocalFileSystem.list_subdirectories(dir).unwrap();

            assert_eq!(subdirs, vec![dir.join("A"), dir.join("b")]);
        }

        #[test]
        fn test_has_subdirectories() {
            let temp_dir = TempDir::new().unwrap();
            let dir = temp_dir.path();
            assert!(!LocalFileSystem.has_subdirectories(dir));

            fs::write(dir.join("file.txt"), b"x").unwrap();
            assert!(!LocalFileSystem.has_subdirectories(dir));

            fs::create_dir(dir.join("sub")).unwrap();
            assert!(LocalFileSystem.has_subdirectories(dir));
        }

        #[test]
        fn test_can_access() {
            let temp_dir = TempDir::new().unwrap();
            let file = temp_dir.path().join("file.txt");
            fs::write(&file, b"x").unwrap();

            assert!(LocalFileSystem.can_access(temp_dir.path()));
            assert!(!LocalFileSystem.can_access(&file));
            assert!(!LocalFileSystem.can_access(Path::new("/nonexistent/directory/42")));
        }

        #[test]
        fn test_reserved_name_is_case_insensitive() {
            assert!(is_reserved_dir_name(".previews"));
            assert!(is_reserved_dir_name(".PREVIEWS"));
            assert!(!is_reserved_dir_name("previews"));
        }
    }
}
