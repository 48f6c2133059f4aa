//! Hitman: World of Assassination, modded through Simple Mod Framework

use super::{no_seed, DataPath, Executable, GameDef, GameType};
use crate::layout::{Fixer, LayoutRule, MarkerAtRoot, Target, UnwrapSingle, ValidMarker};
use crate::projectors::smf::{SMF_DIR, SMF_MANIFEST, SMF_MODS_DIR};
use crate::projectors::{Projector, SmfConfig};
use crate::rename::NameSource;
use crate::tree::EntryKind;

/// SMF folders are named after the manifest id
const SMF_TARGET: Target = Target::Placeholder {
    root: SMF_MODS_DIR,
    naming: NameSource::Manifest {
        file: SMF_MANIFEST,
        keys: &["id"],
    },
};

fn fixer() -> Fixer {
    Fixer::new()
        .then(MarkerAtRoot {
            marker: SMF_MANIFEST,
            kind: EntryKind::File,
            requires: None,
            target: SMF_TARGET,
        })
        .then(UnwrapSingle { target: SMF_TARGET })
}

fn projectors() -> Vec<Box<dyn Projector>> {
    vec![Box::new(SmfConfig)]
}

pub static HITMAN3: GameDef = GameDef {
    game: GameType::Hitman3,
    name: "Hitman: World of Assassination",
    short_name: "hitman3",
    steam_app_id: Some(1659040),
    steam_folder: "HITMAN 3",
    binary: "Retail/HITMAN3.exe",
    data_path: DataPath::Game(""),
    documents: None,
    saves: None,
    save_extension: None,
    ini_files: &[],
    executables: &[
        Executable::new("Hitman: World of Assassination", "Retail/HITMAN3.exe"),
        Executable::new("Launcher", "Launcher.exe"),
        Executable::new(
            "Configure via Simple Mod Framework",
            "Simple Mod Framework/Mod Manager/Mod Manager.exe",
        ),
        Executable::new("Deploy via Simple Mod Framework", "Simple Mod Framework/Deploy.exe"),
    ],
    layout: LayoutRule::new(&[ValidMarker::Dir(SMF_DIR)]),
    fixer,
    content: None,
    projectors,
    data_dirs: &[""],
    seed_profile: no_seed,
    mappings: &[],
};
