//! Supported games and their plugin descriptors

mod crimeboss;
mod hitman;
mod noita;
mod packed;
mod payday;
mod titanfall;
mod zuma;

use crate::content::ContentTable;
use crate::error::{Error, Result};
use crate::host::GameDirs;
use crate::layout::{Fixer, LayoutRule};
use crate::projectors::Projector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Supported games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    Payday2,
    PaydayTheHeist,
    Raid,
    CrimeBoss,
    Hitman3,
    Noita,
    Titanfall2,
    Zuma,
    CassetteBeasts,
    EmuVr,
    RoadToVostok,
}

impl GameType {
    /// Parse from stable game ID.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|g| g.id().eq_ignore_ascii_case(id.trim()))
    }

    /// Like [`from_id`](Self::from_id), as a library error.
    pub fn parse(id: &str) -> Result<Self> {
        Self::from_id(id).ok_or_else(|| Error::UnknownGame(id.to_string()))
    }

    /// Get the game ID string
    pub fn id(&self) -> &'static str {
        self.def().short_name
    }

    /// Get the display name
    pub fn display_name(&self) -> &'static str {
        self.def().name
    }

    pub fn def(&self) -> &'static GameDef {
        match self {
            GameType::Payday2 => &payday::PAYDAY2,
            GameType::PaydayTheHeist => &payday::PAYDAY_THE_HEIST,
            GameType::Raid => &payday::RAID,
            GameType::CrimeBoss => &crimeboss::CRIME_BOSS,
            GameType::Hitman3 => &hitman::HITMAN3,
            GameType::Noita => &noita::NOITA,
            GameType::Titanfall2 => &titanfall::TITANFALL2,
            GameType::Zuma => &zuma::ZUMA,
            GameType::CassetteBeasts => &packed::CASSETTE_BEASTS,
            GameType::EmuVr => &packed::EMU_VR,
            GameType::RoadToVostok => &packed::ROAD_TO_VOSTOK,
        }
    }

    /// Get all supported game types
    pub fn all() -> &'static [GameType] {
        &[
            GameType::Payday2,
            GameType::PaydayTheHeist,
            GameType::Raid,
            GameType::CrimeBoss,
            GameType::Hitman3,
            GameType::Noita,
            GameType::Titanfall2,
            GameType::Zuma,
            GameType::CassetteBeasts,
            GameType::EmuVr,
            GameType::RoadToVostok,
        ]
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Where mods are overlaid, relative to the game install unless noted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPath {
    Game(&'static str),
    /// Under the roaming application data directory
    AppData(&'static str),
}

impl DataPath {
    pub fn resolve(&self, game_dir: &Path) -> PathBuf {
        match *self {
            DataPath::Game("") => game_dir.to_path_buf(),
            DataPath::Game(relative) => game_dir.join(relative),
            DataPath::AppData(relative) => directories::BaseDirs::new()
                .map(|dirs| dirs.config_dir().join(relative))
                .unwrap_or_else(|| game_dir.join(relative)),
        }
    }
}

/// A launch entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executable {
    pub title: &'static str,
    /// Relative to the game directory
    pub binary: &'static str,
    pub arguments: &'static str,
}

impl Executable {
    pub const fn new(title: &'static str, binary: &'static str) -> Self {
        Self {
            title,
            binary,
            arguments: "",
        }
    }

    pub const fn with_arguments(mut self, arguments: &'static str) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn file_name(&self) -> &'static str {
        self.binary.rsplit('/').next().unwrap_or(self.binary)
    }
}

/// Static description of one game's plugin
#[derive(Debug)]
pub struct GameDef {
    pub game: GameType,
    pub name: &'static str,
    pub short_name: &'static str,
    pub steam_app_id: Option<u32>,
    /// Folder under `steamapps/common`
    pub steam_folder: &'static str,
    pub binary: &'static str,
    pub data_path: DataPath,
    pub documents: Option<&'static str>,
    pub saves: Option<&'static str>,
    pub save_extension: Option<&'static str>,
    pub ini_files: &'static [&'static str],
    pub executables: &'static [Executable],
    pub layout: LayoutRule,
    pub fixer: fn() -> Fixer,
    pub content: Option<&'static ContentTable>,
    pub projectors: fn() -> Vec<Box<dyn Projector>>,
    /// Created under the data directory when a profile is initialized
    pub data_dirs: &'static [&'static str],
    pub seed_profile: fn(&GameDirs) -> Result<()>,
    /// `(profile file, game file)` pairs the host overlays
    pub mappings: &'static [(&'static str, &'static str)],
}

impl GameDef {
    /// Labelled descriptor fields that are set, for display
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = Vec::new();
        if let Some(id) = self.steam_app_id {
            details.push(("Steam app", id.to_string()));
        }
        if let Some(documents) = self.documents {
            details.push(("Documents", documents.to_string()));
        }
        if let Some(saves) = self.saves {
            details.push(("Saves", saves.to_string()));
        }
        if let Some(extension) = self.save_extension {
            details.push(("Save files", format!("*.{extension}")));
        }
        if !self.ini_files.is_empty() {
            details.push(("Config files", self.ini_files.join(", ")));
        }
        details
    }
}

fn no_projectors() -> Vec<Box<dyn Projector>> {
    Vec::new()
}

fn no_seed(_dirs: &GameDirs) -> Result<()> {
    Ok(())
}

/// Game detection utilities
pub struct GameDetector;

impl GameDetector {
    /// Look for the game in every Steam library.
    pub fn detect(game: GameType) -> Option<PathBuf> {
        let def = game.def();
        Self::find_steam_libraries()
            .into_iter()
            .map(|steamapps| steamapps.join("common").join(def.steam_folder))
            .find(|install| install.join(def.binary).is_file())
    }

    /// Find all Steam library folders
    fn find_steam_libraries() -> Vec<PathBuf> {
        let mut libraries = Vec::new();

        let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) else {
            return libraries;
        };
        let possible_paths = [
            home.join(".steam/steam"),
            home.join(".local/share/Steam"),
            PathBuf::from("/usr/share/steam"),
        ];

        for base in possible_paths {
            let steamapps = base.join("steamapps");
            if !steamapps.exists() {
                continue;
            }
            if !libraries.contains(&steamapps) {
                libraries.push(steamapps.clone());
            }

            // Parse libraryfolders.vdf for additional libraries
            let vdf_path = steamapps.join("libraryfolders.vdf");
            if let Ok(content) = std::fs::read_to_string(&vdf_path) {
                for path in library_paths(&content) {
                    let lib_path = PathBuf::from(path).join("steamapps");
                    if lib_path.exists() && !libraries.contains(&lib_path) {
                        libraries.push(lib_path);
                    }
                }
            }
        }

        libraries
    }
}

/// `"path"` values of a `libraryfolders.vdf`
fn library_paths(vdf: &str) -> Vec<&str> {
    vdf.lines()
        .filter(|line| line.contains("\"path\""))
        .filter_map(|line| line.split('"').nth(3))
        .collect()
}
