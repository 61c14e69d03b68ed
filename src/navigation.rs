//! Navigation history and the extension filter applied to directory listings

use crate::domain::{normalize_extension, FileEntry, FilterRule};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Extensions offered as filters out of the box, all enabled.
pub const DEFAULT_FILTER_EXTENSIONS: [&str; 8] =
    [".wav", ".mp3", ".ogg", ".fxp", ".nki", ".nksn", ".nkm", ".mid"];

/// Current directory plus a back stack.
///
/// The history never holds the same path twice in a row, and after a
/// successful navigation its last element is the current path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current_path: Option<PathBuf>,
    history: Vec<PathBuf>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    pub fn can_go_back(&self) -> bool {
        self.history.len() > 1
    }

    /// Records a completed navigation.
    pub fn visit(&mut self, path: PathBuf) {
        if self.history.last() != Some(&path) {
            self.history.push(path.clone());
        }
        self.current_path = Some(path);
    }

    /// The entry before the tail of the history, which a back navigation
    /// lists. `None` when there is nothing to go back to.
    pub fn back_target(&self) -> Option<&Path> {
        if !self.can_go_back() {
            return None;
        }
        self.history.get(self.history.len() - 2).map(PathBuf::as_path)
    }

    /// Drops the tail of the history and makes the new tail current. Call
    /// only after the back target was listed successfully.
    pub fn go_back(&mut self) {
        if self.can_go_back() {
            self.history.pop();
            self.current_path = self.history.last().cloned();
        }
    }

    /// Filesystem parent of the current path, if any.
    pub fn parent(&self) -> Option<PathBuf> {
        self.current_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

/// Ordered set of extension filters, unique by extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    rules: Vec<FilterRule>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::new(
            DEFAULT_FILTER_EXTENSIONS
                .iter()
                .map(|ext| FilterRule::new(*ext, true)),
        )
    }
}

impl FilterSet {
    /// Later duplicates of an extension are dropped.
    pub fn new(rules: impl IntoIterator<Item = FilterRule>) -> Self {
        let mut seen = HashSet::new();
        let rules = rules
            .into_iter()
            .map(|rule| FilterRule::new(rule.extension, rule.enabled))
            .filter(|rule| seen.insert(rule.extension.clone()))
            .collect();
        FilterSet { rules }
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Enables or disables one extension, adding it if unknown. Returns true
    /// when something changed.
    pub fn set_enabled(&mut self, extension: &str, enabled: bool) -> bool {
        let extension = normalize_extension(extension);
        match self.rules.iter_mut().find(|r| r.extension == extension) {
            Some(rule) if rule.enabled == enabled => false,
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => {
                self.rules.push(FilterRule { extension, enabled });
                true
            }
        }
    }

    pub fn enabled_extensions(&self) -> HashSet<String> {
        self.rules
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.extension.clone())
            .collect()
    }

    /// Recomputes the visible subset of `all` from scratch.
    ///
    /// Directories are kept iff `show_folders`. Files are kept iff their
    /// extension is among the enabled ones; with nothing enabled no file is
    /// shown at all.
    pub fn apply(&self, all: &[FileEntry], show_folders: bool) -> Vec<FileEntry> {
        let enabled = self.enabled_extensions();
        all.iter()
            .filter(|entry| {
                if entry.is_directory {
                    show_folders
                } else {
                    !enabled.is_empty() && enabled.contains(&entry.extension.to_lowercase())
                }
            })
            .cloned()
            .collect()
    }
}

/// File and folder counts for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSummary {
    pub total_files: usize,
    pub total_dirs: usize,
    pub visible_files: usize,
    pub visible_dirs: usize,
}

impl ListingSummary {
    pub fn of(all: &[FileEntry], visible: &[FileEntry]) -> Self {
        let count = |entries: &[FileEntry], dirs: bool| {
            entries.iter().filter(|e| e.is_directory == dirs).count()
        };
        ListingSummary {
            total_files: count(all, false),
            total_dirs: count(all, true),
            visible_files: count(visible, false),
            visible_dirs: count(visible, true),
        }
    }

    pub fn files_hidden(&self) -> bool {
        self.visible_files < self.total_files
    }
}
