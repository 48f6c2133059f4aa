//! Crime Boss: Rockay City (Unreal Engine 4, UE4SS)

use super::{DataPath, Executable, GameDef, GameType};
use crate::content::CRIMEBOSS_CONTENT;
use crate::error::Result;
use crate::host::GameDirs;
use crate::layout::{Fixer, LayoutRule, MarkerAtRoot, MarkerOneDown, Target, TypeScatter, ValidMarker};
use crate::projectors::ue4ss::{Ue4ssMods, UE4SS_MODS_DIR};
use crate::projectors::{Projector, Ue4ssModList};
use crate::tree::EntryKind;

const PAK_MODS: &str = "Content/Paks/~Mods";
const BINARIES: &str = "Binaries/Win64";
const NATIVE_MODS: &str = "Mods";
const MOVIES: &str = "Content/Movies";
const UE4SS_DLL: &str = "UE4SS.dll";

fn fixer() -> Fixer {
    Fixer::new()
        .then(MarkerAtRoot {
            marker: UE4SS_DLL,
            kind: EntryKind::File,
            requires: None,
            target: Target::Into(BINARIES),
        })
        .then(MarkerAtRoot {
            marker: "Content",
            kind: EntryKind::Directory,
            requires: None,
            target: Target::placeholder(NATIVE_MODS),
        })
        .then(MarkerOneDown {
            marker: "Content",
            sibling: None,
            dest: NATIVE_MODS,
        })
        .then(TypeScatter {
            routes: &[
                ("pak", PAK_MODS),
                ("utoc", PAK_MODS),
                ("ucas", PAK_MODS),
                ("dll", UE4SS_MODS_DIR),
                ("bk2", MOVIES),
            ],
        })
}

fn projectors() -> Vec<Box<dyn Projector>> {
    vec![Box::new(Ue4ssModList)]
}

fn seed_profile(dirs: &GameDirs) -> Result<()> {
    if Ue4ssMods::seed(&dirs.profile_dir)? {
        tracing::info!("Seeded UE4SS mod lists in {}", dirs.profile_dir.display());
    }
    Ok(())
}

pub static CRIME_BOSS: GameDef = GameDef {
    game: GameType::CrimeBoss,
    name: "Crime Boss Rockay City",
    short_name: "crimeboss",
    steam_app_id: Some(2933080),
    steam_folder: "CrimeBoss",
    binary: "CrimeBoss/Binaries/Win64/CrimeBoss-Win64-Shipping.exe",
    data_path: DataPath::Game("CrimeBoss"),
    documents: Some("%USERPROFILE%/Saved Games/CrimeBoss/Steam/Saved/Config/WindowsNoEditor"),
    saves: None,
    save_extension: Some("sav"),
    ini_files: &["GameUserSettings.ini", "Input.ini"],
    executables: &[Executable::new(
        "Crime Boss: Rockay City",
        "CrimeBoss/Binaries/Win64/CrimeBoss-Win64-Shipping.exe",
    )],
    layout: LayoutRule::new(&[
        ValidMarker::Dir(PAK_MODS),
        ValidMarker::Dir(BINARIES),
        ValidMarker::DirWithout {
            dir: NATIVE_MODS,
            unless: UE4SS_DLL,
        },
    ]),
    fixer,
    content: Some(&CRIMEBOSS_CONTENT),
    projectors,
    data_dirs: &[PAK_MODS, UE4SS_MODS_DIR, NATIVE_MODS],
    seed_profile,
    mappings: &[],
};
