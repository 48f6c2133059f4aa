//! Zuma Deluxe

use super::{DataPath, Executable, GameDef, GameType};
use crate::content::DIESEL_CONTENT;
use crate::error::{read_required, IoContext, Result};
use crate::host::GameDirs;
use crate::layout::{Fixer, HoistChildren, LayoutRule, MarkerAtRoot, MarkerOneDown, Target, ValidMarker};
use crate::projectors::zuma::{GAME_LEVELS, PROFILE_LEVELS};
use crate::projectors::{LevelFragments, LevelsOverride, Projector};
use crate::tree::EntryKind;
use std::fs;

const LEVELS: &str = "levels";
const MAP_MARKER: &str = "map.txt";

/// Top-level folders of the game's data
const DATA_FOLDERS: &[&str] = &[
    "images",
    "levels",
    "music",
    "sounds",
    "fonts",
    "properties",
    "userdata",
];

fn fixer() -> Fixer {
    Fixer::new()
        .then(MarkerAtRoot {
            marker: MAP_MARKER,
            kind: EntryKind::File,
            requires: None,
            target: Target::placeholder(LEVELS),
        })
        .then(MarkerOneDown {
            marker: MAP_MARKER,
            sibling: None,
            dest: LEVELS,
        })
        .then(HoistChildren {
            known: DATA_FOLDERS,
        })
}

fn projectors() -> Vec<Box<dyn Projector>> {
    vec![Box::new(LevelsOverride), Box::new(LevelFragments)]
}

/// The profile keeps its own `levels.xml`, starting from the game's.
fn seed_profile(dirs: &GameDirs) -> Result<()> {
    let profile_levels = dirs.profile_dir.join(PROFILE_LEVELS);
    let missing = fs::metadata(&profile_levels).map_or(true, |m| m.len() == 0);
    if missing {
        let content = read_required(&dirs.data_dir.join(GAME_LEVELS))?;
        fs::write(&profile_levels, content).at(&profile_levels)?;
        tracing::info!("Seeded {}", profile_levels.display());
    }
    Ok(())
}

pub static ZUMA: GameDef = GameDef {
    game: GameType::Zuma,
    name: "Zuma Deluxe",
    short_name: "zuma",
    steam_app_id: Some(3330),
    steam_folder: "Zuma Deluxe",
    binary: "Zuma.exe",
    data_path: DataPath::Game(""),
    documents: Some("%PROGRAMDATA%/Steam/Zuma/userdata"),
    saves: None,
    save_extension: Some("sav"),
    ini_files: &[],
    executables: &[
        Executable::new("Zuma Deluxe", "Zuma.exe"),
        Executable::new("Delta Patcher", "DeltaPatcher.exe"),
    ],
    layout: LayoutRule::new(&[
        ValidMarker::Dir("images"),
        ValidMarker::Dir("levels"),
        ValidMarker::Dir("music"),
        ValidMarker::Dir("sounds"),
        ValidMarker::Dir("fonts"),
        ValidMarker::Dir("properties"),
        ValidMarker::Dir("userdata"),
        ValidMarker::RootExtension("exe"),
    ]),
    fixer,
    content: Some(&DIESEL_CONTENT),
    projectors,
    data_dirs: &[""],
    seed_profile,
    mappings: &[(PROFILE_LEVELS, GAME_LEVELS)],
};
