//! Playback commands, playback state and instrument preview lookup
//!
//! The explorer never touches an audio device. It sends [`AudioCommand`]s
//! down a channel to whatever player the host wires up and receives position
//! updates back through [`PlaybackState::update_position`].

use crate::domain::MediaKind;
use crate::filesystem::{FileSystem, PREVIEWS_DIR};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Preview audio extensions in lookup priority order.
pub const PREVIEW_EXTENSIONS: [&str; 3] = [".ogg", ".mp3", ".wav"];

pub const DEFAULT_VOLUME: f64 = 0.5;

/// Changes smaller than this are ignored.
const CHANGE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    Play(PathBuf),
    Pause,
    Stop,
    /// Always within `[0, 1]`
    SetVolume(f64),
    /// Position in seconds
    Seek(f64),
}

/// Sending half handed to the explorer.
///
/// A dropped player is not an error for the explorer, so sends are fire and
/// forget and a closed channel is only logged.
#[derive(Debug, Clone)]
pub struct AudioSender {
    tx: UnboundedSender<AudioCommand>,
}

impl AudioSender {
    pub fn send(&self, command: AudioCommand) {
        debug!("Audio command: {:?}", command);
        if self.tx.send(command).is_err() {
            debug!("Audio player is gone, command dropped");
        }
    }
}

pub fn channel() -> (AudioSender, UnboundedReceiver<AudioCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AudioSender { tx }, rx)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Seconds
    pub position: f64,
    /// Seconds
    pub duration: f64,
    pub volume: f64,
    pub current_file: Option<PathBuf>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            volume: DEFAULT_VOLUME,
            current_file: None,
        }
    }
}

impl PlaybackState {
    /// Clamps and stores a new volume. Returns the stored value when it moved
    /// by more than the change threshold.
    pub fn set_volume(&mut self, volume: f64) -> Option<f64> {
        let volume = if volume.is_nan() {
            self.volume
        } else {
            volume.clamp(0.0, 1.0)
        };
        if (volume - self.volume).abs() > CHANGE_THRESHOLD {
            self.volume = volume;
            Some(volume)
        } else {
            None
        }
    }

    /// Applies a position report from the player. Returns true when the
    /// visible state changed.
    pub fn update_position(&mut self, position: f64, duration: f64) -> bool {
        let mut changed = false;
        if (position - self.position).abs() > CHANGE_THRESHOLD {
            self.position = position;
            changed = true;
        }
        if (duration - self.duration).abs() > CHANGE_THRESHOLD {
            self.duration = duration;
            changed = true;
        }
        changed
    }

    /// Position requested by the user; clamped into the known duration.
    pub fn seek_target(&self, seconds: f64) -> Option<f64> {
        let upper = if self.duration > 0.0 {
            self.duration
        } else {
            f64::MAX
        };
        let target = seconds.max(0.0).min(upper);
        if (target - self.position).abs() > CHANGE_THRESHOLD {
            Some(target)
        } else {
            None
        }
    }

    pub fn started(&mut self, file: PathBuf) {
        self.current_file = Some(file);
        self.is_playing = true;
        self.position = 0.0;
    }

    pub fn stopped(&mut self) {
        self.is_playing = false;
        self.position = 0.0;
    }
}

/// What selecting a file should do to playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewResolution {
    /// Play this file
    Play(PathBuf),
    /// Instrument preset without any audition file
    NoPreview,
    /// Not playable; leave playback alone
    NotPlayable,
}

/// Decides what to play for a selected file.
pub fn resolve_preview<F: FileSystem>(fs: &F, path: &Path, kind: MediaKind) -> PreviewResolution {
    match kind {
        MediaKind::Audio => PreviewResolution::Play(path.to_path_buf()),
        MediaKind::InstrumentPreset => match find_preview_file(fs, path) {
            Some(preview) => PreviewResolution::Play(preview),
            None => PreviewResolution::NoPreview,
        },
        MediaKind::Other => PreviewResolution::NotPlayable,
    }
}

/// Looks for `<dir>/.previews/<file name><ext>` for each preview extension in
/// priority order and returns the first that exists.
pub fn find_preview_file<F: FileSystem>(fs: &F, source: &Path) -> Option<PathBuf> {
    let dir = source.parent()?;
    let file_name = source.file_name()?.to_string_lossy();
    let previews = dir.join(PREVIEWS_DIR);

    let found = PREVIEW_EXTENSIONS
        .iter()
        .map(|ext| previews.join(format!("{}{}", file_name, ext)))
        .find(|candidate| fs.is_file(candidate));

    if found.is_none() {
        debug!("No preview audio for {:?}", source);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFs;

    mod preview_lookup_tests {
        use super::*;

        #[test]
        fn test_mp3_preview_when_only_mp3_exists() {
            let fs = MemoryFs::new()
                .drive("/c")
                .file("/c/Kits/X.nki", 10)
                .file("/c/Kits/.previews/X.nki.mp3", 10);

            assert_eq!(
                find_preview_file(&fs, Path::new("/c/Kits/X.nki")),
                Some(PathBuf::from("/c/Kits/.previews/X.nki.mp3"))
            );
        }

        #[test]
        fn test_ogg_wins_over_mp3_and_wav() {
            let fs = MemoryFs::new()
                .drive("/c")
                .file("/c/Kits/X.nki", 10)
                .file("/c/Kits/.previews/X.nki.wav", 10)
                .file("/c/Kits/.previews/X.nki.mp3", 10)
                .file("/c/Kits/.previews/X.nki.ogg", 10);

            assert_eq!(
                find_preview_file(&fs, Path::new("/c/Kits/X.nki")),
                Some(PathBuf::from("/c/Kits/.previews/X.nki.ogg"))
            );
        }

        #[test]
        fn test_missing_preview() {
            let fs = MemoryFs::new()
                .drive("/c")
                .file("/c/Kits/X.nki", 10)
                .file("/c/Kits/.previews/Y.nki.ogg", 10);

            assert_eq!(find_preview_file(&fs, Path::new("/c/Kits/X.nki")), None);
            assert_eq!(
                resolve_preview(&fs, Path::new("/c/Kits/X.nki"), MediaKind::InstrumentPreset),
                PreviewResolution::NoPreview
            );
        }

        #[test]
        fn test_audio_files_play_directly() {
            let fs = MemoryFs::new().drive("/c").file("/c/kick.wav", 10);
            assert_eq!(
                resolve_preview(&fs, Path::new("/c/kick.wav"), MediaKind::Audio),
                PreviewResolution::Play(PathBuf::from("/c/kick.wav"))
            );
            assert_eq!(
                resolve_preview(&fs, Path::new("/c/notes.txt"), MediaKind::Other),
                PreviewResolution::NotPlayable
            );
        }
    }

    mod playback_state_tests {
        use super::*;

        #[test]
        fn test_initial_state() {
            let state = PlaybackState::default();
            assert!(!state.is_playing);
            assert_eq!(state.volume, 0.5);
            assert_eq!(state.current_file, None);
        }

        #[test]
        fn test_volume_is_clamped() {
            let mut state = PlaybackState::default();
            assert_eq!(state.set_volume(1.7), Some(1.0));
            assert_eq!(state.set_volume(-3.0), Some(0.0));
            assert_eq!(state.volume, 0.0);
        }

        #[test]
        fn test_small_volume_changes_are_ignored() {
            let mut state = PlaybackState::default();
            assert_eq!(state.set_volume(0.505), None);
            assert_eq!(state.volume, 0.5);
            assert_eq!(state.set_volume(f64::NAN), None);
        }

        #[test]
        fn test_position_updates_below_threshold_are_noops() {
            let mut state = PlaybackState::default();
            assert!(state.update_position(1.0, 30.0));
            assert!(!state.update_position(1.005, 30.0));
            assert_eq!(state.position, 1.0);
            assert!(state.update_position(1.5, 30.0));
        }

        #[test]
        fn test_seek_target_is_clamped_to_duration() {
            let mut state = PlaybackState::default();
            state.update_position(0.0, 10.0);
            assert_eq!(state.seek_target(25.0), Some(10.0));
            assert_eq!(state.seek_target(-1.0), None);
            assert_eq!(state.seek_target(4.0), Some(4.0));
        }
    }

    #[test]
    fn test_channel_delivers_commands_in_order() {
        let (sender, mut rx) = channel();
        sender.send(AudioCommand::Play(PathBuf::from("/c/a.wav")));
        sender.send(AudioCommand::SetVolume(0.8));

        assert_eq!(rx.try_recv().unwrap(), AudioCommand::Play(PathBuf::from("/c/a.wav")));
        assert_eq!(rx.try_recv().unwrap(), AudioCommand::SetVolume(0.8));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let (sender, rx) = channel();
        drop(rx);
        sender.send(AudioCommand::Stop);
    }
}
