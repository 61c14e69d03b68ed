//! Icon and playback classification by extension or folder name

/// How a selected file takes part in audio preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Played directly
    Audio,
    /// Instrument/preset file whose audition lives in a sibling `.previews` folder
    InstrumentPreset,
    Other,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        match ext.trim_start_matches('.') {
            "wav" | "mp3" | "ogg" => MediaKind::Audio,
            "nki" | "nksn" | "fxp" | "nkm" => MediaKind::InstrumentPreset,
            _ => MediaKind::Other,
        }
    }
}

pub fn file_icon(ext: &str) -> &'static str {
    let ext = ext.to_lowercase();
    match ext.trim_start_matches('.') {
        "txt" => "📝",
        "doc" | "docx" => "📄",
        "pdf" => "📕",
        "xls" | "xlsx" | "ppt" | "pptx" => "📊",
        "zip" | "rar" | "7z" => "📦",
        "jpg" | "jpeg" | "png" | "gif" | "bmp" => "🖼️",
        "mp3" | "wav" | "flac" | "ogg" => "🎵",
        "mp4" | "avi" | "mkv" => "🎬",
        "exe" | "msi" => "⚙️",
        "cs" | "java" | "py" | "js" => "💻",
        "html" | "css" => "🌐",
        "nki" | "nksn" | "fxp" | "nkm" => "🎹",
        "mid" | "midi" => "🎼",
        _ => "📄",
    }
}

pub fn folder_icon(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "documents" | "文档" => "📚",
        "downloads" | "下载" => "⬇️",
        "pictures" | "图片" => "🖼️",
        "music" | "音乐" => "🎵",
        "videos" | "视频" => "🎬",
        "desktop" | "桌面" => "🖥️",
        _ => "📁",
    }
}

/// Expander glyph for a tree node.
pub fn expander_icon(is_expanded: bool) -> &'static str {
    if is_expanded {
        "▼"
    } else {
        "▶"
    }
}
