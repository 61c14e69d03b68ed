//! The explorer controller
//!
//! [`Explorer`] owns the directory tree, navigation state, the cached listing
//! of the current directory and everything persisted for the user. Every
//! operation is synchronous and absorbs its own errors: failures end up in
//! the status line and the log, never in a panic or an aborted session.

use crate::audio::{self, AudioCommand, AudioSender, PlaybackState, PreviewResolution};
use crate::config::{AppPaths, SettingsStore, WindowGeometry};
use crate::domain::{DragPayload, DriveInfo, FavoriteEntry, FileEntry, FilterRule};
use crate::error::{ExplorerError, Result};
use crate::events::{EventBus, EventCallback, ExplorerEvent, SubscriptionId};
use crate::favorites::FavoritesStore;
use crate::filesystem::FileSystem;
use crate::i18n::{Locale, Localizer, Message};
use crate::navigation::{FilterSet, ListingSummary, NavigationState};
use crate::tree::{DirectoryTree, NodeId};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
enum HistoryStep {
    Push,
    Back,
}

pub struct Explorer<F: FileSystem> {
    fs: F,
    tree: DirectoryTree,
    nav: NavigationState,
    all_entries: Vec<FileEntry>,
    visible_entries: Vec<FileEntry>,
    filters: FilterSet,
    show_folders: bool,
    drives: Vec<DriveInfo>,
    selected_node: Option<NodeId>,
    selected_file: Option<FileEntry>,
    status: String,
    localizer: Localizer,
    /// The language written to settings. Differs from the localizer's
    /// locale while a session override is active.
    language: Locale,
    playback: PlaybackState,
    audio: AudioSender,
    favorites: FavoritesStore,
    settings: SettingsStore,
    events: EventBus,
}

impl<F: FileSystem> Explorer<F> {
    /// Restores settings and favorites from the stores and loads the drives.
    pub fn new(
        fs: F,
        settings: SettingsStore,
        favorites: FavoritesStore,
        audio: AudioSender,
    ) -> Self {
        let saved = settings.load();
        let locale = Locale::from_code(&saved.language).unwrap_or_else(|| {
            warn!("Unsupported language {:?} in settings", saved.language);
            Locale::default()
        });

        let mut explorer = Explorer {
            fs,
            tree: DirectoryTree::new(),
            nav: NavigationState::new(),
            all_entries: Vec::new(),
            visible_entries: Vec::new(),
            filters: FilterSet::default(),
            show_folders: saved.show_folders,
            drives: Vec::new(),
            selected_node: None,
            selected_file: None,
            status: String::new(),
            localizer: Localizer::new(locale),
            language: locale,
            playback: PlaybackState::default(),
            audio,
            favorites,
            settings,
            events: EventBus::new(),
        };
        explorer.load_drives();
        explorer
    }

    /// Uses the settings and favorites files under `paths`.
    pub fn open(fs: F, paths: &AppPaths, audio: AudioSender) -> Self {
        Self::new(
            fs,
            SettingsStore::new(paths.settings_path()),
            FavoritesStore::load(paths.favorites_path()),
            audio,
        )
    }

    pub fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ---- Accessors ----

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.nav.current_path()
    }

    pub fn history(&self) -> &[PathBuf] {
        self.nav.history()
    }

    pub fn all_entries(&self) -> &[FileEntry] {
        &self.all_entries
    }

    pub fn visible_entries(&self) -> &[FileEntry] {
        &self.visible_entries
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn show_folders(&self) -> bool {
        self.show_folders
    }

    pub fn drives(&self) -> &[DriveInfo] {
        &self.drives
    }

    pub fn selected_tree_node(&self) -> Option<NodeId> {
        self.selected_node
    }

    pub fn selected_file(&self) -> Option<&FileEntry> {
        self.selected_file.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        self.favorites.entries()
    }

    pub fn summary(&self) -> ListingSummary {
        ListingSummary::of(&self.all_entries, &self.visible_entries)
    }

    // ---- Drives and navigation ----

    /// Re-enumerates drives and reseeds the tree with one root per drive.
    pub fn load_drives(&mut self) {
        self.drives = self.fs.list_drives();
        self.tree.seed_roots(&self.drives);
        self.selected_node = None;
        info!("Found {} drives", self.drives.len());

        self.set_status(Message::DrivesFound(self.drives.len()));
        self.events.emit(ExplorerEvent::DrivesChanged);
        self.events.emit(ExplorerEvent::TreeChanged);
    }

    /// Lists `path` and makes it current. On failure the previous state is
    /// left untouched, the status says why and false is returned.
    pub fn navigate_to(&mut self, path: &Path) -> bool {
        self.enter_directory(path, HistoryStep::Push)
    }

    /// Re-lists the previous directory. The history only shrinks once that
    /// listing has succeeded.
    pub fn navigate_back(&mut self) -> bool {
        match self.nav.back_target().map(Path::to_path_buf) {
            Some(previous) => self.enter_directory(&previous, HistoryStep::Back),
            None => false,
        }
    }

    pub fn navigate_up(&mut self) -> bool {
        match self.nav.parent() {
            Some(parent) => self.navigate_to(&parent),
            None => false,
        }
    }

    /// Re-reads the current directory, or the drives when nothing is open.
    pub fn refresh(&mut self) -> bool {
        let Some(path) = self.nav.current_path().map(Path::to_path_buf) else {
            self.load_drives();
            return true;
        };

        if let Some(id) = self.tree.find(&path) {
            if let Err(e) = self.tree.refresh(id, &self.fs) {
                debug!("Tree refresh of {:?} failed: {}", path, e);
            }
        }
        self.navigate_to(&path)
    }

    fn read_directory(&self, path: &Path) -> Result<Vec<FileEntry>> {
        if !self.fs.can_access(path) {
            return Err(ExplorerError::Inaccessible(path.to_path_buf()));
        }
        self.fs.list_directory(path)
    }

    fn enter_directory(&mut self, path: &Path, step: HistoryStep) -> bool {
        let entries = match self.read_directory(path) {
            Ok(entries) => entries,
            Err(ExplorerError::Inaccessible(path)) => {
                warn!("Cannot access {:?}", path);
                self.set_status(Message::CannotAccessPath(path.display().to_string()));
                return false;
            }
            Err(e) => {
                warn!("Failed to list {:?}: {}", path, e);
                self.set_status(Message::Error(e.to_string()));
                return false;
            }
        };

        debug!("Navigated to {:?} ({} entries)", path, entries.len());
        self.all_entries = entries;
        match step {
            HistoryStep::Push => self.nav.visit(path.to_path_buf()),
            HistoryStep::Back => self.nav.go_back(),
        }
        self.set_selected_file(None);
        self.recompute_visible();
        self.events.emit(ExplorerEvent::PathChanged(path.to_path_buf()));
        self.sync_tree_selection(path);
        true
    }

    fn sync_tree_selection(&mut self, path: &Path) {
        match self.tree.select_path(path, &self.fs) {
            Ok(id) => self.select_node(Some(id)),
            Err(e) => {
                debug!("Could not reveal {:?} in tree: {}", path, e);
                self.select_node(None);
            }
        }
        self.events.emit(ExplorerEvent::TreeChanged);
    }

    fn select_node(&mut self, id: Option<NodeId>) {
        if id == self.selected_node {
            return;
        }
        let previous = self.selected_node.take();
        match id {
            Some(id) => match self.tree.set_selected(id, previous) {
                Ok(()) => self.selected_node = Some(id),
                Err(e) => debug!("Tree selection failed: {}", e),
            },
            None => {
                if let Some(prev) = previous {
                    self.tree.clear_selected(prev);
                }
            }
        }
        self.events
            .emit(ExplorerEvent::TreeSelectionChanged(self.selected_node));
    }

    // ---- Filters ----

    pub fn set_filter(&mut self, rules: Vec<FilterRule>) {
        self.filters = FilterSet::new(rules);
        self.recompute_visible();
    }

    pub fn toggle_filter(&mut self, extension: &str, enabled: bool) {
        if self.filters.set_enabled(extension, enabled) {
            self.recompute_visible();
        }
    }

    /// Shows or hides folders in the file list and remembers the choice.
    pub fn set_show_folders(&mut self, show_folders: bool) {
        if self.show_folders == show_folders {
            return;
        }
        self.show_folders = show_folders;
        self.recompute_visible();
        self.persist_preferences();
        self.events
            .emit(ExplorerEvent::ShowFoldersChanged(show_folders));
    }

    fn recompute_visible(&mut self) {
        self.visible_entries = self.filters.apply(&self.all_entries, self.show_folders);

        let still_visible = self
            .selected_file
            .as_ref()
            .map(|sel| self.visible_entries.iter().any(|e| e.path == sel.path));
        if still_visible == Some(false) {
            self.set_selected_file(None);
        }

        let summary = self.summary();
        let message = if summary.files_hidden() {
            Message::FilesDisplay {
                visible_files: summary.visible_files,
                total_files: summary.total_files,
                visible_dirs: summary.visible_dirs,
            }
        } else {
            Message::FilesTotal {
                files: summary.total_files,
                dirs: summary.total_dirs,
            }
        };
        self.set_status(message);
        self.events.emit(ExplorerEvent::EntriesChanged);
    }

    // ---- File selection ----

    /// Selects a visible entry. Audio files start playing and instrument
    /// presets play their preview if one exists.
    pub fn select_file(&mut self, path: &Path) -> bool {
        let Some(entry) = self.visible_entries.iter().find(|e| e.path == path).cloned() else {
            return false;
        };
        self.set_selected_file(Some(entry.clone()));
        if entry.is_directory {
            return true;
        }

        match audio::resolve_preview(&self.fs, &entry.path, entry.media_kind()) {
            PreviewResolution::Play(target) => self.play(target),
            PreviewResolution::NoPreview => {
                self.set_status(Message::NoPreviewAudio(entry.name.clone()));
            }
            PreviewResolution::NotPlayable => {}
        }
        true
    }

    /// Moves the selection down, wrapping to the first entry.
    pub fn select_next_file(&mut self) -> bool {
        let len = self.visible_entries.len();
        if len == 0 {
            return false;
        }
        let next = match self.selected_index() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        let path = self.visible_entries[next].path.clone();
        self.select_file(&path)
    }

    /// Moves the selection up, wrapping to the last entry.
    pub fn select_previous_file(&mut self) -> bool {
        let len = self.visible_entries.len();
        if len == 0 {
            return false;
        }
        let prev = match self.selected_index() {
            Some(i) if i > 0 => i - 1,
            _ => len - 1,
        };
        let path = self.visible_entries[prev].path.clone();
        self.select_file(&path)
    }

    /// Double click: directories are opened, files report their size.
    pub fn activate_entry(&mut self, path: &Path) -> bool {
        let Some(entry) = self.visible_entries.iter().find(|e| e.path == path).cloned() else {
            return false;
        };
        if entry.is_directory {
            return self.navigate_to(&entry.path);
        }
        self.set_status(Message::SelectedFile {
            name: entry.name.clone(),
            size: entry.display_size().unwrap_or_default(),
        });
        true
    }

    pub fn drag_payload(&self) -> Option<DragPayload> {
        self.selected_file.as_ref().map(FileEntry::drag_payload)
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = self.selected_file.as_ref()?;
        self.visible_entries
            .iter()
            .position(|e| e.path == selected.path)
    }

    fn set_selected_file(&mut self, entry: Option<FileEntry>) {
        let path = entry.as_ref().map(|e| e.path.clone());
        if self.selected_file.as_ref().map(|e| &e.path) == path.as_ref() {
            return;
        }
        self.selected_file = entry;
        self.events
            .emit(ExplorerEvent::FileSelectionChanged(path));
    }

    // ---- Tree ----

    /// Selects a tree node and opens its directory.
    pub fn select_tree_node(&mut self, id: NodeId) -> bool {
        let path = match self.tree.node(id) {
            Ok(node) if !node.is_placeholder() => node.full_path().to_path_buf(),
            Ok(_) => return false,
            Err(e) => {
                debug!("{}", e);
                return false;
            }
        };
        self.select_node(Some(id));
        self.navigate_to(&path)
    }

    /// Expands or collapses a node, loading it on first expansion.
    pub fn toggle_tree_node(&mut self, id: NodeId) -> bool {
        let result = self.tree.expand(id, &self.fs);
        self.events.emit(ExplorerEvent::TreeChanged);
        match result {
            Ok(expanded) => expanded,
            Err(e) => {
                warn!("Failed to expand tree node: {}", e);
                let path = self
                    .tree
                    .get(id)
                    .map(|n| n.full_path().display().to_string())
                    .unwrap_or_default();
                self.set_status(Message::CannotAccessPath(path));
                false
            }
        }
    }

    /// Reveals `path` in the tree, selects it and asks the view to scroll
    /// to it.
    pub fn expand_and_scroll_to(&mut self, path: &Path) -> Option<NodeId> {
        self.set_status(Message::LocatingFolder);
        let result = self.tree.select_path(path, &self.fs);
        self.events.emit(ExplorerEvent::TreeChanged);

        match result {
            Ok(id) => {
                self.select_node(Some(id));
                let name = self
                    .tree
                    .get(id)
                    .map(|n| n.name().to_string())
                    .unwrap_or_default();
                self.set_status(Message::LocatedTo(name));
                self.events.emit(ExplorerEvent::ScrollToNode(id));
                Some(id)
            }
            Err(ExplorerError::RevealFailed { depth, segment }) => {
                warn!("Reveal of {:?} stopped at level {}: {}", path, depth, segment);
                self.set_status(Message::DirectoryNotFound { depth, segment });
                None
            }
            Err(e) => {
                warn!("Reveal of {:?} failed: {}", path, e);
                self.set_status(Message::CannotLocateFolder);
                None
            }
        }
    }

    // ---- Favorites ----

    pub fn add_favorite(&mut self, path: &Path, name: &str) -> bool {
        if !self.favorites.add(path, name) {
            self.set_status(Message::AlreadyInFavorites(name.to_string()));
            return false;
        }
        self.save_favorites();
        self.set_status(Message::AddedToFavorites(name.to_string()));
        self.events.emit(ExplorerEvent::FavoritesChanged);
        true
    }

    /// Bookmarks a tree node under its display name.
    pub fn add_favorite_from_node(&mut self, id: NodeId) -> bool {
        let (path, name) = match self.tree.get(id) {
            Some(node) if !node.is_placeholder() => {
                (node.full_path().to_path_buf(), node.name().to_string())
            }
            _ => return false,
        };
        self.add_favorite(&path, &name)
    }

    pub fn remove_favorite(&mut self, index: usize) -> Option<FavoriteEntry> {
        let removed = self.favorites.remove(index)?;
        self.save_favorites();
        self.set_status(Message::RemovedFromFavorites(removed.name.clone()));
        self.events.emit(ExplorerEvent::FavoritesChanged);
        Some(removed)
    }

    /// Opens a favorite directory and reveals it in the tree.
    pub fn open_favorite(&mut self, index: usize) -> bool {
        let Some(favorite) = self.favorites.get(index).cloned() else {
            return false;
        };
        if !self.fs.is_dir(&favorite.full_path) {
            self.set_status(Message::PathNotFound(
                favorite.full_path.display().to_string(),
            ));
            return false;
        }

        self.set_status(Message::NavigatingToFavorite(favorite.name.clone()));
        if !self.navigate_to(&favorite.full_path) {
            return false;
        }
        self.expand_and_scroll_to(&favorite.full_path).is_some()
    }

    fn save_favorites(&mut self) {
        if let Err(e) = self.favorites.save() {
            warn!("Failed to save favorites: {}", e);
            self.set_status(Message::Error(e.to_string()));
        }
    }

    // ---- Language and window ----

    pub fn change_language(&mut self, code: &str) -> Result<()> {
        let locale = Locale::from_code(code).ok_or_else(|| {
            ExplorerError::ConfigError(format!("Unsupported language: {}", code))
        })?;
        let shown_changed = self.localizer.set_locale(locale);
        if !shown_changed && self.language == locale {
            return Ok(());
        }
        self.language = locale;
        info!("Language changed to {}", locale);
        self.persist_preferences();
        self.set_status(Message::LanguageChanged(locale.native_name().to_string()));
        self.events
            .emit(ExplorerEvent::LanguageChanged(locale.code().to_string()));
        Ok(())
    }

    /// Switches the message language for this session only. Later writes
    /// of the settings keep the stored language.
    pub fn override_language(&mut self, locale: Locale) {
        self.localizer.set_locale(locale);
    }

    pub fn save_window_settings(&self, geometry: WindowGeometry) -> Result<()> {
        self.settings.save_window(geometry)
    }

    pub fn load_window_settings(&self) -> WindowGeometry {
        self.settings.load_window()
    }

    fn persist_preferences(&mut self) {
        let code = self.language.code();
        if let Err(e) = self.settings.save_preferences(self.show_folders, code) {
            warn!("Failed to save settings: {}", e);
            self.set_status(Message::Error(e.to_string()));
        }
    }

    // ---- Playback ----

    fn play(&mut self, path: PathBuf) {
        let name = file_name(&path);
        self.audio.send(AudioCommand::Play(path.clone()));
        self.playback.started(path);
        self.set_status(Message::Playing(name));
        self.events.emit(ExplorerEvent::PlaybackChanged);
    }

    /// Pauses while playing, otherwise replays the last file.
    pub fn toggle_play_pause(&mut self) {
        if self.playback.is_playing {
            self.audio.send(AudioCommand::Pause);
            self.playback.is_playing = false;
            self.set_status(Message::Paused);
            self.events.emit(ExplorerEvent::PlaybackChanged);
        } else if let Some(path) = self.playback.current_file.clone() {
            self.play(path);
        }
    }

    pub fn stop(&mut self) {
        self.audio.send(AudioCommand::Stop);
        self.playback.stopped();
        self.events.emit(ExplorerEvent::PlaybackChanged);
    }

    /// Position report from the player.
    pub fn update_playback_position(&mut self, position: f64, duration: f64) {
        if self.playback.update_position(position, duration) {
            self.events.emit(ExplorerEvent::PlaybackChanged);
        }
    }

    /// The player reached the end of the file.
    pub fn playback_finished(&mut self) {
        self.playback.stopped();
        self.events.emit(ExplorerEvent::PlaybackChanged);
    }

    pub fn seek(&mut self, seconds: f64) {
        if let Some(target) = self.playback.seek_target(seconds) {
            self.audio.send(AudioCommand::Seek(target));
            self.playback.position = target;
            self.events.emit(ExplorerEvent::PlaybackChanged);
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        if let Some(volume) = self.playback.set_volume(volume) {
            self.audio.send(AudioCommand::SetVolume(volume));
            self.events.emit(ExplorerEvent::PlaybackChanged);
        }
    }

    fn set_status(&mut self, message: Message) {
        self.status = self.localizer.text(&message);
        self.events
            .emit(ExplorerEvent::StatusChanged(self.status.clone()));
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
