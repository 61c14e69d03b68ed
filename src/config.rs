//! Data directory, user settings and window geometry

use crate::error::{ExplorerError, Result};
use crate::i18n::DEFAULT_LANGUAGE;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SETTINGS_FILE: &str = "settings.json";
const FAVORITES_FILE: &str = "favorites.json";

const KEY_SHOW_FOLDERS: &str = "ShowFolders";
const KEY_LANGUAGE: &str = "Language";
const KEY_WINDOW_WIDTH: &str = "WindowWidth";
const KEY_WINDOW_HEIGHT: &str = "WindowHeight";
const KEY_TREE_WIDTH: &str = "TreeWidth";

/// Where persisted state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Uses `data_dir` when given, else the platform data directory
    /// (`~/.local/share/dirpane` on Linux).
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        match data_dir {
            Some(dir) => Ok(AppPaths { data_dir: dir }),
            None => Self::default_location(),
        }
    }

    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("dirpane"))
            .ok_or_else(|| {
                ExplorerError::ConfigError("Could not determine data directory".to_string())
            })?;
        Ok(AppPaths { data_dir })
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.data_dir.join(FAVORITES_FILE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub width: f64,
    pub height: f64,
    pub tree_width: f64,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        WindowGeometry {
            width: 1200.0,
            height: 800.0,
            tree_width: 250.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub show_folders: bool,
    pub language: String,
    pub window: WindowGeometry,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            show_folders: false,
            language: DEFAULT_LANGUAGE.to_string(),
            window: WindowGeometry::default(),
        }
    }
}

impl Settings {
    /// Reads each known key on its own, falling back to the default for any
    /// key that is missing or has the wrong type.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Settings::default();
        let number = |key: &str, default: f64| {
            map.get(key)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default)
        };

        Settings {
            show_folders: map
                .get(KEY_SHOW_FOLDERS)
                .and_then(Value::as_bool)
                .unwrap_or(defaults.show_folders),
            language: map
                .get(KEY_LANGUAGE)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.language),
            window: WindowGeometry {
                width: number(KEY_WINDOW_WIDTH, defaults.window.width),
                height: number(KEY_WINDOW_HEIGHT, defaults.window.height),
                tree_width: number(KEY_TREE_WIDTH, defaults.window.tree_width),
            },
        }
    }
}

/// The settings file. Every write merges into what is on disk so unrelated
/// keys written by someone else survive.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails; anything unreadable yields defaults.
    pub fn load(&self) -> Settings {
        match self.read_map() {
            Ok(map) => Settings::from_map(&map),
            Err(e) => {
                warn!("Failed to load settings from {:?}: {}", self.path, e);
                Settings::default()
            }
        }
    }

    pub fn load_window(&self) -> WindowGeometry {
        self.load().window
    }

    pub fn save_preferences(&self, show_folders: bool, language: &str) -> Result<()> {
        let mut updates = Map::new();
        updates.insert(KEY_SHOW_FOLDERS.to_string(), Value::Bool(show_folders));
        updates.insert(KEY_LANGUAGE.to_string(), Value::String(language.to_string()));
        self.merge(updates)
    }

    pub fn save_window(&self, geometry: WindowGeometry) -> Result<()> {
        let mut updates = Map::new();
        updates.insert(KEY_WINDOW_WIDTH.to_string(), geometry.width.into());
        updates.insert(KEY_WINDOW_HEIGHT.to_string(), geometry.height.into());
        updates.insert(KEY_TREE_WIDTH.to_string(), geometry.tree_width.into());
        self.merge(updates)
    }

    /// Read-modify-write: overlays `updates` onto the stored object.
    pub fn merge(&self, updates: Map<String, Value>) -> Result<()> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                warn!("Replacing unreadable settings file {:?}: {}", self.path, e);
                Map::new()
            }
        };
        map.extend(updates);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ExplorerError::ConfigError(format!("Failed to create data directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, contents).map_err(|e| {
            ExplorerError::ConfigError(format!("Failed to write settings file: {}", e))
        })?;

        debug!("Saved settings to {:?}", self.path);
        Ok(())
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| ExplorerError::io(&self.path, e))?;
        let value: Value = serde_json::from_str(&contents)?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ExplorerError::ConfigError(
                "Settings file is not a JSON object".to_string(),
            )),
        }
    }
}
