//! Games whose mods are single packed files: Cassette Beasts, Emu VR, Road to Vostok

use super::{no_projectors, no_seed, DataPath, Executable, GameDef, GameType};
use crate::layout::{CollectByExtension, Fixer, LayoutRule, ValidMarker};

const UGC_DIR: &str = "Custom/UGC";
const VOSTOK_MODS: &str = "mods";

fn cassette_fixer() -> Fixer {
    Fixer::new().then(CollectByExtension {
        ext: "pck",
        dest: "",
        one_down: true,
    })
}

fn emuvr_fixer() -> Fixer {
    Fixer::new().then(CollectByExtension {
        ext: "ugc",
        dest: UGC_DIR,
        one_down: true,
    })
}

fn vostok_fixer() -> Fixer {
    Fixer::new().then(CollectByExtension {
        ext: "zip",
        dest: VOSTOK_MODS,
        one_down: false,
    })
}

pub static CASSETTE_BEASTS: GameDef = GameDef {
    game: GameType::CassetteBeasts,
    name: "Cassette Beasts",
    short_name: "cassette-beasts",
    steam_app_id: Some(1321440),
    steam_folder: "Cassette Beasts",
    binary: "CassetteBeasts.exe",
    data_path: DataPath::AppData("CassetteBeasts/mods"),
    documents: Some("%APPDATA%/CassetteBeasts"),
    saves: None,
    save_extension: Some("gcpf"),
    ini_files: &["settings.cfg"],
    executables: &[
        Executable::new("Cassette Beasts (Mods)", "CassetteBeasts.exe").with_arguments("-load-mods"),
        Executable::new("Cassette Beasts (No Mods)", "CassetteBeasts.exe"),
    ],
    layout: LayoutRule::new(&[ValidMarker::RootExtension("pck")]),
    fixer: cassette_fixer,
    content: None,
    projectors: no_projectors,
    data_dirs: &[""],
    seed_profile: no_seed,
    mappings: &[],
};

pub static EMU_VR: GameDef = GameDef {
    game: GameType::EmuVr,
    name: "Emu VR",
    short_name: "emuvr",
    steam_app_id: None,
    steam_folder: "EmuVR",
    binary: "EmuVR.exe",
    data_path: DataPath::Game(""),
    documents: Some("%GAME_PATH%/Saved Data"),
    saves: Some("%GAME_PATH%/Saved Data"),
    save_extension: None,
    ini_files: &["settings.ini"],
    executables: &[
        Executable::new("Emu VR", "EmuVR.exe"),
        Executable::new("Force SteamVR", "Force SteamVR.exe"),
        Executable::new("Force Oculus", "Force Oculus.exe"),
        Executable::new("Force Virtual Desktop Streamer", "Force Virtual Desktop Streamer.exe"),
        Executable::new("Force Desktop", "Force Desktop.exe"),
    ],
    layout: LayoutRule::new(&[ValidMarker::Dir(UGC_DIR)]),
    fixer: emuvr_fixer,
    content: None,
    projectors: no_projectors,
    data_dirs: &[""],
    seed_profile: no_seed,
    mappings: &[],
};

pub static ROAD_TO_VOSTOK: GameDef = GameDef {
    game: GameType::RoadToVostok,
    name: "Road to Vostok",
    short_name: "road-to-vostok",
    steam_app_id: Some(1963610),
    steam_folder: "Road to Vostok Demo",
    binary: "Road_to_Vostok_Demo.exe",
    data_path: DataPath::Game(""),
    documents: Some("%APPDATA%/Godot/app_userdata/Road to Vostok"),
    saves: None,
    save_extension: Some("tres"),
    ini_files: &["settings.cfg"],
    executables: &[
        Executable::new("Road to Vostok (Use Injector)", "Road_to_Vostok_Demo.exe")
            .with_arguments("--main-pack Injector.pck"),
        Executable::new("Road to Vostok (No Mods)", "Road_to_Vostok_Demo.exe"),
    ],
    layout: LayoutRule::new(&[
        ValidMarker::DirWithout {
            dir: VOSTOK_MODS,
            unless: "mod.txt",
        },
        ValidMarker::RootExtension("pck"),
    ]),
    fixer: vostok_fixer,
    content: None,
    projectors: no_projectors,
    data_dirs: &[VOSTOK_MODS],
    seed_profile: no_seed,
    mappings: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CheckReturn, FixOutcome};
    use crate::tree::{EntryKind, ModTree};

    #[test]
    fn test_cassette_beasts_pulls_packs_up() {
        let tree = ModTree::from_paths("", &["monsters.pck"]);
        assert_eq!(CASSETTE_BEASTS.layout.check(&tree), CheckReturn::Valid);

        let mut tree = ModTree::from_paths("", &["Mod v1/monsters.pck", "Mod v1/readme.txt"]);
        assert_eq!(CASSETTE_BEASTS.layout.check(&tree), CheckReturn::Fixable);
        assert!(cassette_fixer().fix(&mut tree).is_fixed());
        assert_eq!(tree.file_paths(), vec!["Mod v1/readme.txt", "monsters.pck"]);
        assert_eq!(CASSETTE_BEASTS.layout.check(&tree), CheckReturn::Valid);
    }

    #[test]
    fn test_emuvr_collects_ugc() {
        let mut tree = ModTree::from_paths("", &["arcade.ugc", "Pack/console.UGC", "Pack/label.png"]);
        assert!(emuvr_fixer().fix(&mut tree).is_fixed());
        assert!(tree.exists("Custom/UGC/arcade.ugc", EntryKind::File));
        assert!(tree.exists("Custom/UGC/console.UGC", EntryKind::File));
        assert!(tree.exists("Pack/label.png", EntryKind::File));
    }

    #[test]
    fn test_vostok_markers_and_zips() {
        let tree = ModTree::from_paths("", &["mods/Weapons.zip"]);
        assert_eq!(ROAD_TO_VOSTOK.layout.check(&tree), CheckReturn::Valid);
        let tree = ModTree::from_paths("", &["mod.txt", "mods/x.gd"]);
        assert_eq!(ROAD_TO_VOSTOK.layout.check(&tree), CheckReturn::Fixable);

        let mut tree = ModTree::from_paths("", &["Weapons.zip", "Nested/Other.zip"]);
        assert!(vostok_fixer().fix(&mut tree).is_fixed());
        assert!(tree.exists("mods/Weapons.zip", EntryKind::File));
        assert!(tree.exists("Nested/Other.zip", EntryKind::File));

        let mut tree = ModTree::from_paths("", &["readme.md"]);
        assert_eq!(vostok_fixer().fix(&mut tree), FixOutcome::Unrecognized);
    }
}
