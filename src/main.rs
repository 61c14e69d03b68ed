use dirpane::audio::{self, AudioCommand};
use dirpane::cli::{Args, Command, FavCommand, SettingsCommand};
use dirpane::config::{AppPaths, SettingsStore, WindowGeometry};
use dirpane::domain::{FileEntry, FilterRule};
use dirpane::filesystem::LocalFileSystem;
use dirpane::{logging, Explorer, Result};

use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;

fn main() {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let paths = AppPaths::resolve(args.data_dir.clone())?;
    let (sender, mut player) = audio::channel();
    let mut explorer = Explorer::open(LocalFileSystem::new(), &paths, sender);
    if let Some(locale) = args.locale() {
        explorer.override_language(locale);
    }

    match args.command {
        Command::Drives => {
            for drive in explorer.drives() {
                println!(
                    "{:<32} {:<10} {:>12} free of {:>12} ({:.1}% used)",
                    drive.display_name,
                    drive.drive_type,
                    drive.display_free_space(),
                    drive.display_size(),
                    drive.usage_percentage()
                );
            }
        }
        Command::Ls {
            path,
            extensions,
            folders,
        } => {
            if !extensions.is_empty() {
                explorer.set_filter(
                    extensions
                        .iter()
                        .map(|ext| FilterRule::new(ext.as_str(), true))
                        .collect(),
                );
            }
            if explorer.navigate_to(&absolute(&path)) {
                let entries = if folders {
                    explorer.filters().apply(explorer.all_entries(), true)
                } else {
                    explorer.visible_entries().to_vec()
                };
                print_entries(&entries);
            }
        }
        Command::Tree { path } => {
            explorer.expand_and_scroll_to(&absolute(&path));
            print_tree(&explorer);
        }
        Command::Preview { file } => {
            let file = absolute(&file);
            let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
            explorer.set_filter(vec![FilterRule::new(
                file.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                true,
            )]);
            if explorer.navigate_to(&parent) {
                explorer.select_file(&file);
            }
            print_player_commands(&mut player);
        }
        Command::Fav(command) => run_fav(&mut explorer, command),
        Command::Settings(command) => run_settings(&mut explorer, &paths, command)?,
    }

    println!("{}", explorer.status());
    Ok(())
}

fn run_fav(explorer: &mut Explorer<LocalFileSystem>, command: FavCommand) {
    match command {
        FavCommand::List => {
            for (i, fav) in explorer.favorites().iter().enumerate() {
                println!("{:>3}  {:<24} {}", i, fav.name, fav.full_path.display());
            }
        }
        FavCommand::Add { path, name } => {
            let path = absolute(&path);
            let name = name.unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            });
            explorer.add_favorite(&path, &name);
        }
        FavCommand::Remove { index } => {
            explorer.remove_favorite(index);
        }
        FavCommand::Open { index } => {
            if explorer.open_favorite(index) {
                print_entries(explorer.visible_entries());
            }
        }
    }
}

fn run_settings(
    explorer: &mut Explorer<LocalFileSystem>,
    paths: &AppPaths,
    command: SettingsCommand,
) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let store = SettingsStore::new(paths.settings_path());
            let settings = store.load();
            println!("file:         {}", store.path().display());
            println!("show folders: {}", settings.show_folders);
            println!("language:     {}", settings.language);
            println!(
                "window:       {} x {} (tree {})",
                settings.window.width, settings.window.height, settings.window.tree_width
            );
        }
        SettingsCommand::Language { code } => explorer.change_language(&code)?,
        SettingsCommand::Folders { visibility } => explorer.set_show_folders(visibility.into()),
        SettingsCommand::Window {
            width,
            height,
            tree_width,
        } => explorer.save_window_settings(WindowGeometry {
            width,
            height,
            tree_width,
        })?,
    }
    Ok(())
}

fn print_entries(entries: &[FileEntry]) {
    for entry in entries {
        println!(
            "{} {:<40} {:>12}  {}",
            entry.icon,
            entry.name,
            entry.display_size().unwrap_or_default(),
            entry.display_date()
        );
    }
}

fn print_tree(explorer: &Explorer<LocalFileSystem>) {
    let tree = explorer.tree();
    for (id, depth) in tree.visible_rows() {
        let Some(node) = tree.get(id) else { continue };
        if node.is_placeholder() {
            continue;
        }
        let expander = if node.children().is_empty() {
            " "
        } else {
            node.expander_icon()
        };
        let marker = if node.is_selected() { " *" } else { "" };
        println!("{}{} {}{}", "  ".repeat(depth), expander, node.name(), marker);
    }
}

fn print_player_commands(player: &mut UnboundedReceiver<AudioCommand>) {
    while let Ok(command) = player.try_recv() {
        if let AudioCommand::Play(path) = command {
            println!("play {}", path.display());
        }
    }
}

/// Tree roots are absolute mount points, so relative arguments are resolved
/// first.
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
