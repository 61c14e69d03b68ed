//! Bookmarked directories persisted as a JSON array

use crate::domain::{paths_equal, FavoriteEntry};
use crate::error::{ExplorerError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ordered favorites, unique by case-insensitive path. Insertion order is
/// display order.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
    entries: Vec<FavoriteEntry>,
}

impl FavoritesStore {
    /// Loads favorites from `path`. A missing file is an empty list and an
    /// unreadable or malformed one is logged and treated the same way.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to load favorites from {:?}: {}", path, e);
                Vec::new()
            }
        };

        let mut store = FavoritesStore {
            path,
            entries: Vec::with_capacity(entries.len()),
        };
        // Hand-edited files may carry duplicates
        for entry in entries {
            if !store.contains(&entry.full_path) {
                store.entries.push(entry);
            }
        }
        store
    }

    /// Records are read one at a time so a single bad one costs only itself.
    /// A record without a path is dropped; one without a name is named after
    /// the last component of its path.
    fn read(path: &Path) -> Result<Vec<FavoriteEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path).map_err(|e| ExplorerError::io(path, e))?;
        let records: Vec<Value> = serde_json::from_str(&contents)?;

        let mut entries = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            let mut entry: FavoriteEntry = match serde_json::from_value(record) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping favorite #{} in {:?}: {}", i, path, e);
                    continue;
                }
            };
            if entry.full_path.as_os_str().is_empty() {
                warn!("Skipping favorite #{} in {:?}: no path", i, path);
                continue;
            }
            if entry.name.is_empty() {
                entry.name = entry
                    .full_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| entry.full_path.display().to_string());
            }
            entries.push(entry);
        }
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&FavoriteEntry> {
        self.entries.get(index)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| paths_equal(&e.full_path, path))
    }

    /// Appends a favorite. Returns false, leaving the list untouched, when the
    /// path is already present.
    pub fn add(&mut self, full_path: impl Into<PathBuf>, name: impl Into<String>) -> bool {
        let full_path = full_path.into();
        if self.contains(&full_path) {
            debug!("Favorite already present: {:?}", full_path);
            return false;
        }
        self.entries.push(FavoriteEntry::new(name, full_path));
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<FavoriteEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ExplorerError::ConfigError(format!("Failed to create data directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, contents).map_err(|e| {
            ExplorerError::ConfigError(format!("Failed to write favorites file: {}", e))
        })?;

        debug!("Saved {} favorites to {:?}", self.entries.len(), self.path);
        Ok(())
    }
}
