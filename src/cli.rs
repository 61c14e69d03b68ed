// CLI module for argument parsing

use crate::i18n::Locale;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dirpane - browse drives and folders, audition samples, keep favorites
#[derive(Parser, Debug, Clone)]
#[command(name = "dirpane")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding settings.json and favorites.json
    ///
    /// Defaults to the platform data directory.
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Language for messages in this run (zh-CN, zh-TW, en, ja, ko)
    #[arg(long = "lang", global = true)]
    pub lang: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List ready drives
    Drives,

    /// List a directory through the extension filters
    Ls {
        /// Directory to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only show files with this extension; repeatable
        ///
        /// Example: --ext wav --ext .mp3
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Include folders in the listing
        #[arg(long = "folders", action = ArgAction::SetTrue)]
        folders: bool,
    },

    /// Reveal a directory in the drive tree and print the expanded tree
    Tree {
        path: PathBuf,
    },

    /// Resolve what selecting a file would play
    Preview {
        file: PathBuf,
    },

    /// Manage favorite folders
    #[command(subcommand)]
    Fav(FavCommand),

    /// Show or change persisted settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FavCommand {
    List,
    Add {
        path: PathBuf,
        /// Display name; defaults to the folder name
        #[arg(long = "name")]
        name: Option<String>,
    },
    Remove {
        index: usize,
    },
    /// Open a favorite and list it
    Open {
        index: usize,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SettingsCommand {
    Show,
    Language {
        code: String,
    },
    Folders {
        #[arg(value_enum)]
        visibility: Visibility,
    },
    Window {
        width: f64,
        height: f64,
        tree_width: f64,
    },
}

/// Folder visibility in file listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Visibility {
    Show,
    Hide,
}

impl From<Visibility> for bool {
    fn from(visibility: Visibility) -> Self {
        visibility == Visibility::Show
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Locale requested with `--lang`, if any
    pub fn locale(&self) -> Option<Locale> {
        self.lang.as_deref().and_then(Locale::from_code)
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref lang) = self.lang {
            if Locale::from_code(lang).is_none() {
                return Err(unsupported_language(lang));
            }
        }

        match &self.command {
            Command::Ls { extensions, .. } => {
                if let Some(bad) = extensions
                    .iter()
                    .find(|e| e.trim().trim_start_matches('.').is_empty())
                {
                    return Err(format!("Invalid extension: '{}'", bad));
                }
            }
            Command::Settings(SettingsCommand::Language { code }) => {
                if Locale::from_code(code).is_none() {
                    return Err(unsupported_language(code));
                }
            }
            Command::Settings(SettingsCommand::Window {
                width,
                height,
                tree_width,
            }) => {
                for (name, value) in [("width", width), ("height", height), ("tree-width", tree_width)] {
                    if !value.is_finite() || *value <= 0.0 {
                        return Err(format!("{} must be a positive number, got {}", name, value));
                    }
                }
                if tree_width >= width {
                    return Err(format!(
                        "tree-width ({}) must be smaller than width ({})",
                        tree_width, width
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

fn unsupported_language(code: &str) -> String {
    format!(
        "Unsupported language: '{}'. Use one of zh-CN, zh-TW, en, ja, ko",
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    mod args_tests {
        use super::*;

        #[test]
        fn test_ls_defaults() {
            let args = parse(&["dirpane", "ls"]);
            assert_eq!(
                args.command,
                Command::Ls {
                    path: PathBuf::from("."),
                    extensions: vec![],
                    folders: false,
                }
            );
            assert_eq!(args.verbose, 0);
            assert!(args.data_dir.is_none());
        }

        #[test]
        fn test_ls_with_filters() {
            let args = parse(&["dirpane", "ls", "/music", "--ext", "wav", "--ext", ".nki", "--folders"]);
            assert_eq!(
                args.command,
                Command::Ls {
                    path: PathBuf::from("/music"),
                    extensions: vec!["wav".to_string(), ".nki".to_string()],
                    folders: true,
                }
            );
            assert!(args.validate().is_ok());
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let args = parse(&["dirpane", "drives", "-vv", "--lang", "en", "--data-dir", "/tmp/dp"]);
            assert_eq!(args.verbose, 2);
            assert_eq!(args.locale(), Some(Locale::En));
            assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/dp")));
        }

        #[test]
        fn test_fav_subcommands() {
            assert_eq!(parse(&["dirpane", "fav", "list"]).command, Command::Fav(FavCommand::List));
            assert_eq!(
                parse(&["dirpane", "fav", "add", "/music/Kits", "--name", "Kits"]).command,
                Command::Fav(FavCommand::Add {
                    path: PathBuf::from("/music/Kits"),
                    name: Some("Kits".to_string()),
                })
            );
            assert_eq!(
                parse(&["dirpane", "fav", "open", "2"]).command,
                Command::Fav(FavCommand::Open { index: 2 })
            );
        }

        #[test]
        fn test_settings_folders_visibility() {
            let args = parse(&["dirpane", "settings", "folders", "show"]);
            match args.command {
                Command::Settings(SettingsCommand::Folders { visibility }) => {
                    assert!(bool::from(visibility));
                }
                other => panic!("unexpected command: {:?}", other),
            }
            assert!(Args::try_parse_from(["dirpane", "settings", "folders", "maybe"]).is_err());
        }

        #[test]
        fn test_missing_subcommand_is_an_error() {
            assert!(Args::try_parse_from(["dirpane"]).is_err());
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_unknown_global_language() {
            let args = parse(&["dirpane", "drives", "--lang", "fr"]);
            let result = args.validate();
            assert!(result.unwrap_err().contains("Unsupported language"));
        }

        #[test]
        fn test_unknown_settings_language() {
            let args = parse(&["dirpane", "settings", "language", "xx"]);
            assert!(args.validate().is_err());
            let args = parse(&["dirpane", "settings", "language", "zh-TW"]);
            assert!(args.validate().is_ok());
        }

        #[test]
        fn test_empty_extension() {
            let args = parse(&["dirpane", "ls", "--ext", "."]);
            assert!(args.validate().unwrap_err().contains("Invalid extension"));
        }

        #[test]
        fn test_window_dimensions() {
            let args = parse(&["dirpane", "settings", "window", "1200", "800", "250"]);
            assert!(args.validate().is_ok());

            let args = parse(&["dirpane", "settings", "window", "1200", "0", "250"]);
            assert!(args.validate().unwrap_err().contains("height"));

            let args = parse(&["dirpane", "settings", "window", "300", "800", "400"]);
            assert!(args.validate().unwrap_err().contains("smaller than width"));
        }
    }
}
