pub mod classify;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use classify::MediaKind;

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * 1024 * 1024;

/// One row of a directory listing.
///
/// Entries are immutable snapshots taken when the directory is read; nothing
/// updates them afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    /// Extension with its leading dot, as spelled on disk (`".WAV"`). Empty for
    /// directories and extensionless files.
    pub extension: String,
    pub size: u64,
    pub modified_date: DateTime<Local>,
    pub is_directory: bool,
    pub icon: &'static str,
}

impl FileEntry {
    /// Reads the metadata of `path`, following symlinks. A missing
    /// modification time reads as the Unix epoch.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified_date: DateTime<Local> = metadata
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH)
            .into();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        if metadata.is_dir() {
            Ok(Self::directory(path.to_path_buf(), name, modified_date))
        } else {
            Ok(Self::file(
                path.to_path_buf(),
                name,
                metadata.len(),
                modified_date,
            ))
        }
    }

    pub fn directory(path: PathBuf, name: String, modified_date: DateTime<Local>) -> Self {
        let icon = classify::folder_icon(&name);
        FileEntry {
            name,
            path,
            extension: String::new(),
            size: 0,
            modified_date,
            is_directory: true,
            icon,
        }
    }

    pub fn file(path: PathBuf, name: String, size: u64, modified_date: DateTime<Local>) -> Self {
        let extension = dotted_extension(&path);
        let icon = classify::file_icon(&extension);
        FileEntry {
            name,
            path,
            extension,
            size,
            modified_date,
            is_directory: false,
            icon,
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        if self.is_directory {
            MediaKind::Other
        } else {
            MediaKind::from_extension(&self.extension)
        }
    }

    /// Human readable size; `None` for directories, which have no meaningful size.
    pub fn display_size(&self) -> Option<String> {
        if self.is_directory {
            None
        } else {
            Some(format_size(self.size))
        }
    }

    pub fn display_date(&self) -> String {
        self.modified_date.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn drag_payload(&self) -> DragPayload {
        DragPayload {
            path: self.path.clone(),
            is_directory: self.is_directory,
        }
    }
}

/// What a platform layer needs to materialize a native file or folder handle
/// when the user drags an entry out of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub path: PathBuf,
    pub is_directory: bool,
}

/// A mounted, ready volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveInfo {
    /// Mount point, used as the full path of the tree root
    pub name: PathBuf,
    pub display_name: String,
    pub drive_type: String,
    pub total_size: u64,
    pub available_space: u64,
}

impl DriveInfo {
    pub fn new(
        mount_point: PathBuf,
        label: &str,
        drive_type: impl Into<String>,
        total_size: u64,
        available_space: u64,
    ) -> Self {
        let drive_type = drive_type.into();
        let display_name = if label.is_empty() {
            format!("{} ({})", mount_point.display(), drive_type)
        } else {
            format!("{} ({})", label, mount_point.display())
        };
        DriveInfo {
            name: mount_point,
            display_name,
            drive_type,
            total_size,
            available_space,
        }
    }

    /// A bare root with no size information.
    pub fn root(mount_point: impl Into<PathBuf>) -> Self {
        let mount_point = mount_point.into();
        DriveInfo {
            display_name: mount_point.display().to_string(),
            name: mount_point,
            drive_type: String::new(),
            total_size: 0,
            available_space: 0,
        }
    }

    pub fn display_size(&self) -> String {
        format_capacity(self.total_size)
    }

    pub fn display_free_space(&self) -> String {
        format_capacity(self.available_space)
    }

    pub fn usage_percentage(&self) -> f64 {
        if self.total_size == 0 {
            return 0.0;
        }
        let used = self.total_size.saturating_sub(self.available_space);
        used as f64 / self.total_size as f64 * 100.0
    }
}

/// A single extension filter toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub extension: String,
    pub enabled: bool,
}

impl FilterRule {
    pub fn new(extension: impl Into<String>, enabled: bool) -> Self {
        FilterRule {
            extension: normalize_extension(&extension.into()),
            enabled,
        }
    }

    pub fn display_name(&self) -> String {
        self.extension.to_uppercase()
    }
}

/// A bookmarked directory. Serialized with the field names of the favorites file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FavoriteEntry {
    pub name: String,
    pub full_path: PathBuf,
}

impl FavoriteEntry {
    pub fn new(name: impl Into<String>, full_path: impl Into<PathBuf>) -> Self {
        FavoriteEntry {
            name: name.into(),
            full_path: full_path.into(),
        }
    }
}

/// Lowercases an extension and makes sure it carries a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Case-insensitive path comparison key, matching how paths are compared on
/// the desktop platforms this explorer targets.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

pub fn paths_equal(a: &Path, b: &Path) -> bool {
    path_key(a) == path_key(b)
}

fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

pub fn format_size(size: u64) -> String {
    if size < KB {
        format!("{} B", size)
    } else if size < MB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else if size < GB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else {
        format!("{:.2} GB", size as f64 / GB as f64)
    }
}

fn format_capacity(size: u64) -> String {
    if size < GB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else {
        format!("{:.2} GB", size as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod file_entry_tests {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_file_entry_from_path() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("kick.WAV");
            fs::write(&path, b"RIFF....").unwrap();

            let entry = FileEntry::from_path(&path).unwrap();

            assert_eq!(entry.name, "kick.WAV");
            assert_eq!(entry.extension, ".WAV");
            assert_eq!(entry.size, 8);
            assert!(!entry.is_directory);
            assert_eq!(entry.media_kind(), MediaKind::Audio);
            assert_eq!(entry.icon, "🎵");
        }

        #[test]
        fn test_file_entry_from_directory() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("Downloads");
            fs::create_dir(&path).unwrap();

            let entry = FileEntry::from_path(&path).unwrap();

            assert!(entry.is_directory);
            assert!(entry.extension.is_empty());
            assert_eq!(entry.icon, "⬇️");
            assert_eq!(entry.display_size(), None);
            assert_eq!(entry.media_kind(), MediaKind::Other);
        }

        #[test]
        fn test_file_entry_nonexistent_file() {
            let result = FileEntry::from_path(Path::new("/nonexistent/file.txt"));
            assert!(result.is_err());
        }

        #[test]
        fn test_display_date_format() {
            let date = Local::now();
            let entry = FileEntry::file(PathBuf::from("a.txt"), "a.txt".into(), 1, date);
            assert_eq!(
                entry.display_date(),
                date.format("%Y-%m-%d %H:%M:%S").to_string()
            );
        }

        #[test]
        fn test_drag_payload() {
            let entry = FileEntry::directory(PathBuf::from("/x/Loops"), "Loops".into(), Local::now());
            let payload = entry.drag_payload();
            assert_eq!(payload.path, PathBuf::from("/x/Loops"));
            assert!(payload.is_directory);
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_size_thresholds() {
            assert_eq!(format_size(0), "0 B");
            assert_eq!(format_size(1023), "1023 B");
            assert_eq!(format_size(1536), "1.50 KB");
            assert_eq!(format_size(5 * MB), "5.00 MB");
            assert_eq!(format_size(2 * GB), "2.00 GB");
        }

        #[test]
        fn test_drive_display_and_usage() {
            let drive = DriveInfo::new(PathBuf::from("D:\\"), "Samples", "Fixed", 4 * GB, GB);
            assert_eq!(drive.display_name, "Samples (D:\\)");
            assert_eq!(drive.display_size(), "4.00 GB");
            assert_eq!(drive.display_free_space(), "1.00 GB");
            assert!((drive.usage_percentage() - 75.0).abs() < f64::EPSILON);
        }

        #[test]
        fn test_drive_without_label_uses_type() {
            let drive = DriveInfo::new(PathBuf::from("/mnt/usb"), "", "Removable", 512 * MB, 0);
            assert_eq!(drive.display_name, "/mnt/usb (Removable)");
            assert_eq!(drive.display_size(), "512.00 MB");
        }

        #[test]
        fn test_usage_of_empty_drive_is_zero() {
            assert_eq!(DriveInfo::root("/").usage_percentage(), 0.0);
        }
    }

    mod extension_tests {
        use super::*;

        #[test]
        fn test_normalize_extension() {
            assert_eq!(normalize_extension("WAV"), ".wav");
            assert_eq!(normalize_extension(".Mp3"), ".mp3");
            assert_eq!(normalize_extension(""), "");
        }

        #[test]
        fn test_filter_rule_display_name() {
            let rule = FilterRule::new("nki", true);
            assert_eq!(rule.extension, ".nki");
            assert_eq!(rule.display_name(), ".NKI");
        }

        #[test]
        fn test_paths_equal_ignores_case() {
            assert!(paths_equal(Path::new("/Music/Kits"), Path::new("/music/kits")));
            assert!(!paths_equal(Path::new("/music/kits"), Path::new("/music/kit")));
        }
    }
}
