//! Dirpane - a dual-pane file explorer core
//!
//! This crate holds everything behind a drive tree plus file list explorer:
//! lazily loaded directory tree, navigation history, extension filters,
//! audio preview resolution, favorites and persisted settings. Rendering,
//! drag and drop and the audio device belong to the host application.

pub mod audio;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod explorer;
pub mod favorites;
pub mod filesystem;
pub mod i18n;
pub mod logging;
pub mod navigation;
pub mod tree;

rust_i18n::i18n!("locales", fallback = "zh-CN");

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types for convenience
pub use audio::{AudioCommand, AudioSender, PlaybackState};
pub use config::{AppPaths, Settings, SettingsStore, WindowGeometry};
pub use domain::{DragPayload, DriveInfo, FavoriteEntry, FileEntry, FilterRule, MediaKind};
pub use error::{ExplorerError, Result};
pub use events::{EventBus, ExplorerEvent, SubscriptionId};
pub use explorer::Explorer;
pub use favorites::FavoritesStore;
pub use filesystem::{FileSystem, LocalFileSystem};
pub use i18n::{Locale, Localizer, Message};
pub use navigation::{FilterSet, NavigationState};
pub use tree::{DirectoryTree, NodeId, TreeNode};
