//! Localized status text
//!
//! Translations live in `locales/*.yml` and are compiled in by `rust-i18n`.
//! [`Localizer`] is an ordinary value owned by the explorer and passes its
//! locale to every lookup, so the crate never touches the process-wide
//! locale. Switching language mutates that value only.

use rust_i18n::t;
use std::fmt;

pub const DEFAULT_LANGUAGE: &str = "zh-CN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    ZhCn,
    ZhTw,
    En,
    Ja,
    Ko,
}

/// Every supported locale with its native name, in menu order.
pub const LANGUAGES: [(Locale, &str); 5] = [
    (Locale::ZhCn, "简体中文"),
    (Locale::ZhTw, "繁體中文"),
    (Locale::En, "English"),
    (Locale::Ja, "日本語"),
    (Locale::Ko, "한국어"),
];

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::ZhTw => "zh-TW",
            Locale::En => "en",
            Locale::Ja => "ja",
            Locale::Ko => "ko",
        }
    }

    /// Case-insensitive; accepts `_` for `-` and a bare region-less `zh`.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().replace('_', "-").to_lowercase();
        match code.as_str() {
            "zh-cn" | "zh-hans" | "zh" => Some(Locale::ZhCn),
            "zh-tw" | "zh-hant" | "zh-hk" => Some(Locale::ZhTw),
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            "ja" | "ja-jp" => Some(Locale::Ja),
            "ko" | "ko-kr" => Some(Locale::Ko),
            _ => None,
        }
    }

    pub fn native_name(self) -> &'static str {
        LANGUAGES
            .iter()
            .find(|(locale, _)| *locale == self)
            .map(|(_, name)| *name)
            .unwrap_or("")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A status line with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    DrivesFound(usize),
    CannotAccessPath(String),
    Error(String),
    FilesDisplay {
        visible_files: usize,
        total_files: usize,
        visible_dirs: usize,
    },
    FilesTotal {
        files: usize,
        dirs: usize,
    },
    SelectedFile {
        name: String,
        size: String,
    },
    Playing(String),
    Paused,
    NoPreviewAudio(String),
    AlreadyInFavorites(String),
    AddedToFavorites(String),
    RemovedFromFavorites(String),
    NavigatingToFavorite(String),
    PathNotFound(String),
    LocatingFolder,
    LocatedTo(String),
    DirectoryNotFound {
        depth: usize,
        segment: String,
    },
    CannotLocateFolder,
    LanguageChanged(String),
}

#[derive(Debug, Clone, Default)]
pub struct Localizer {
    locale: Locale,
}

impl Localizer {
    pub fn new(locale: Locale) -> Self {
        Localizer { locale }
    }

    /// Unknown codes fall back to the default language.
    pub fn from_code(code: &str) -> Self {
        Self::new(Locale::from_code(code).unwrap_or_default())
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Returns true when the locale actually changed.
    pub fn set_locale(&mut self, locale: Locale) -> bool {
        if self.locale == locale {
            return false;
        }
        self.locale = locale;
        true
    }

    /// Looks the message up in this localizer's own locale. The translation
    /// tables are shared, the choice of language is not.
    pub fn text(&self, message: &Message) -> String {
        let locale = self.locale.code();
        let text = match message {
            Message::DrivesFound(count) => t!("status.drives_found", locale = locale, count = count),
            Message::CannotAccessPath(path) => {
                t!("status.cannot_access_path", locale = locale, path = path)
            }
            Message::Error(error) => t!("status.error", locale = locale, error = error),
            Message::FilesDisplay {
                visible_files,
                total_files,
                visible_dirs,
            } => t!(
                "status.files_display",
                locale = locale,
                visible = visible_files,
                total = total_files,
                dirs = visible_dirs
            ),
            Message::FilesTotal { files, dirs } => {
                t!("status.files_total", locale = locale, files = files, dirs = dirs)
            }
            Message::SelectedFile { name, size } => {
                t!("status.selected_file", locale = locale, name = name, size = size)
            }
            Message::Playing(name) => t!("status.playing", locale = locale, name = name),
            Message::Paused => t!("status.paused", locale = locale),
            Message::NoPreviewAudio(name) => {
                t!("status.no_preview_audio", locale = locale, name = name)
            }
            Message::AlreadyInFavorites(name) => {
                t!("status.already_in_favorites", locale = locale, name = name)
            }
            Message::AddedToFavorites(name) => {
                t!("status.added_to_favorites", locale = locale, name = name)
            }
            Message::RemovedFromFavorites(name) => {
                t!("status.removed_from_favorites", locale = locale, name = name)
            }
            Message::NavigatingToFavorite(name) => {
                t!("status.navigating_to_favorite", locale = locale, name = name)
            }
            Message::PathNotFound(path) => t!("status.path_not_found", locale = locale, path = path),
            Message::LocatingFolder => t!("status.locating_folder", locale = locale),
            Message::LocatedTo(name) => t!("status.located_to", locale = locale, name = name),
            Message::DirectoryNotFound { depth, segment } => t!(
                "status.directory_not_found",
                locale = locale,
                depth = depth,
                segment = segment
            ),
            Message::CannotLocateFolder => t!("status.cannot_locate_folder", locale = locale),
            Message::LanguageChanged(language) => {
                t!("status.language_changed", locale = locale, language = language)
            }
        };
        text.into_owned()
    }
}
