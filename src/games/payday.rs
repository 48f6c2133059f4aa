//! Diesel engine games: Payday 2, Payday: The Heist, RAID: World War II
//!
//! Payday mods come in three shapes: BLT mods (`mod.txt`) under `mods/`,
//! custom heists (`main.xml` plus `levels/`) under `maps/`, and asset
//! overrides (`main.xml` alone) under `assets/mod_overrides/`.

use super::{no_seed, DataPath, Executable, GameDef, GameType};
use crate::content::DIESEL_CONTENT;
use crate::layout::{
    AllInto, Fixer, LayoutRule, MarkerAtRoot, MarkerOneDown, MarkerTwoDown, SingleEntry, Target,
    ValidMarker,
};
use crate::projectors::dll_mirror::{DllMirror, LOADER_DLLS};
use crate::projectors::Projector;
use crate::tree::EntryKind;

const MODS: &str = "mods";
const MAPS: &str = "maps";
const OVERRIDES: &str = "assets/mod_overrides";

const BLT_MARKER: &str = "mod.txt";
const MAP_MARKER: &str = "main.xml";
const LEVELS: &str = "levels";

fn payday_fixer() -> Fixer {
    Fixer::new()
        .then(MarkerAtRoot {
            marker: BLT_MARKER,
            kind: EntryKind::File,
            requires: None,
            target: Target::placeholder(MODS),
        })
        .then(MarkerOneDown {
            marker: BLT_MARKER,
            sibling: None,
            dest: MODS,
        })
        .then(MarkerOneDown {
            marker: MAP_MARKER,
            sibling: Some(LEVELS),
            dest: MAPS,
        })
        .then(MarkerOneDown {
            marker: MAP_MARKER,
            sibling: None,
            dest: OVERRIDES,
        })
        .then(MarkerAtRoot {
            marker: MAP_MARKER,
            kind: EntryKind::File,
            requires: Some(LEVELS),
            target: Target::placeholder(MAPS),
        })
        .then(MarkerAtRoot {
            marker: MAP_MARKER,
            kind: EntryKind::File,
            requires: None,
            target: Target::placeholder(OVERRIDES),
        })
        .then(MarkerTwoDown {
            marker: BLT_MARKER,
            sibling: None,
            dest: MODS,
        })
        .then(MarkerTwoDown {
            marker: MAP_MARKER,
            sibling: Some(LEVELS),
            dest: MAPS,
        })
        .then(MarkerTwoDown {
            marker: MAP_MARKER,
            sibling: None,
            dest: OVERRIDES,
        })
        .then(SingleEntry { dest: OVERRIDES })
        .then(AllInto {
            target: Target::placeholder(OVERRIDES),
        })
}

fn raid_fixer() -> Fixer {
    Fixer::new().then(AllInto {
        target: Target::placeholder(""),
    })
}

fn loader_mirror() -> Vec<Box<dyn Projector>> {
    vec![Box::new(DllMirror::new(LOADER_DLLS))]
}

pub static PAYDAY2: GameDef = GameDef {
    game: GameType::Payday2,
    name: "Payday 2",
    short_name: "payday-2",
    steam_app_id: Some(218620),
    steam_folder: "PAYDAY 2",
    binary: "payday2_win32_release.exe",
    data_path: DataPath::Game(""),
    documents: Some("%USERPROFILE%/AppData/Local/PAYDAY 2"),
    saves: Some("%USERPROFILE%/AppData/Local/PAYDAY 2/saves"),
    save_extension: None,
    ini_files: &["renderer_settings.xml"],
    executables: &[
        Executable::new("Payday 2", "payday2_win32_release.exe"),
        Executable::new("Payday 2 VR", "payday2_win32_release_vr.exe"),
    ],
    layout: LayoutRule::new(&[
        ValidMarker::Dir(OVERRIDES),
        ValidMarker::Dir(MODS),
        ValidMarker::Dir(MAPS),
        ValidMarker::RootFile("IPHLPAPI.dll"),
        ValidMarker::RootFile("WSOCK32.dll"),
    ]),
    fixer: payday_fixer,
    content: Some(&DIESEL_CONTENT),
    projectors: loader_mirror,
    data_dirs: &[MAPS, MODS, OVERRIDES],
    seed_profile: no_seed,
    mappings: &[],
};

pub static PAYDAY_THE_HEIST: GameDef = GameDef {
    game: GameType::PaydayTheHeist,
    name: "Payday: The Heist",
    short_name: "pdth",
    steam_app_id: Some(24240),
    steam_folder: "PAYDAY The Heist",
    binary: "payday_win32_release.exe",
    data_path: DataPath::Game(""),
    documents: Some("%LOCALAPPDATA%/PAYDAY"),
    saves: None,
    save_extension: None,
    ini_files: &["renderer_settings.xml"],
    executables: &[Executable::new("Payday: The Heist", "payday_win32_release.exe")],
    layout: LayoutRule::new(&[
        ValidMarker::Dir(OVERRIDES),
        ValidMarker::Dir(MODS),
        ValidMarker::Dir(MAPS),
        ValidMarker::RootExtension("dll"),
    ]),
    fixer: payday_fixer,
    content: Some(&DIESEL_CONTENT),
    projectors: loader_mirror,
    data_dirs: &[""],
    seed_profile: no_seed,
    mappings: &[],
};

pub static RAID: GameDef = GameDef {
    game: GameType::Raid,
    name: "RAID World War II",
    short_name: "raidww2",
    steam_app_id: Some(414740),
    steam_folder: "RAID World War II",
    binary: "raid_win64_release.exe",
    data_path: DataPath::Game(MODS),
    documents: Some("%LOCALAPPDATA%/RAID WW2"),
    saves: None,
    save_extension: None,
    ini_files: &["renderer_settings.xml"],
    executables: &[Executable::new("Raid: World War II", "raid_win64_release.exe")],
    layout: LayoutRule::new(&[ValidMarker::SingleEntry]),
    fixer: raid_fixer,
    content: Some(&DIESEL_CONTENT),
    projectors: loader_mirror,
    data_dirs: &[""],
    seed_profile: no_seed,
    mappings: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CheckReturn, FixOutcome, PLACEHOLDER};
    use crate::rename::{NameSource, PendingRename};
    use crate::tree::ModTree;

    fn fix(paths: &[&str]) -> (ModTree, FixOutcome) {
        let mut tree = ModTree::from_paths("", paths);
        let outcome = payday_fixer().fix(&mut tree);
        (tree, outcome)
    }

    #[test]
    fn test_payday2_valid_markers() {
        for paths in [
            &["assets/mod_overrides/Skin/a.texture"][..],
            &["mods/Cool/mod.txt"],
            &["maps/Heist/main.xml"],
            &["IPHLPAPI.dll"],
            &["wsock32.dll"],
        ] {
            let tree = ModTree::from_paths("", paths);
            assert_eq!(PAYDAY2.layout.check(&tree), CheckReturn::Valid, "{paths:?}");
        }
        let tree = ModTree::from_paths("", &["other.dll"]);
        assert_eq!(PAYDAY2.layout.check(&tree), CheckReturn::Fixable);
        assert_eq!(PAYDAY_THE_HEIST.layout.check(&tree), CheckReturn::Valid);
    }

    #[test]
    fn test_root_mod_txt_goes_to_placeholder() {
        let (tree, outcome) = fix(&["mod.txt", "data.bin", "mods/existing.cfg"]);
        assert_eq!(
            outcome,
            FixOutcome::Fixed {
                strategy: "marker-at-root",
                pending: Some(PendingRename::new("mods/FOLDERNAME", NameSource::ModName)),
            }
        );
        assert_eq!(
            tree.file_paths(),
            vec!["mods/FOLDERNAME/data.bin", "mods/FOLDERNAME/mod.txt", "mods/existing.cfg"]
        );
    }

    #[test]
    fn test_wrapped_blt_mod_moves_under_mods() {
        let (tree, outcome) = fix(&["CoolMod/mod.txt", "CoolMod/lua/main.lua"]);
        assert!(outcome.is_fixed());
        assert_eq!(tree.file_paths(), vec!["mods/CoolMod/lua/main.lua", "mods/CoolMod/mod.txt"]);
    }

    #[test]
    fn test_heist_and_override_routing() {
        let (tree, _) = fix(&["Heist/main.xml", "Heist/levels/a.world"]);
        assert_eq!(tree.file_paths(), vec!["maps/Heist/levels/a.world", "maps/Heist/main.xml"]);

        let (tree, _) = fix(&["Skin/main.xml", "Skin/units/gun.model"]);
        assert_eq!(
            tree.file_paths(),
            vec!["assets/mod_overrides/Skin/main.xml", "assets/mod_overrides/Skin/units/gun.model"]
        );

        let (tree, outcome) = fix(&["main.xml", "levels/a.world"]);
        assert!(tree.exists("maps/FOLDERNAME/levels/a.world", EntryKind::File));
        assert!(matches!(outcome, FixOutcome::Fixed { pending: Some(_), .. }));
    }

    #[test]
    fn test_double_wrapped_archive() {
        let (tree, outcome) = fix(&["Download/CoolMod/mod.txt"]);
        assert_eq!(
            outcome,
            FixOutcome::Fixed {
                strategy: "marker-two-down",
                pending: None
            }
        );
        assert_eq!(tree.file_paths(), vec!["mods/Download/mod.txt"]);
    }

    #[test]
    fn test_last_resorts() {
        let (tree, outcome) = fix(&["Textures/units/gun.texture"]);
        assert_eq!(
            outcome,
            FixOutcome::Fixed {
                strategy: "single-entry",
                pending: None
            }
        );
        assert_eq!(tree.file_paths(), vec!["assets/mod_overrides/Textures/units/gun.texture"]);

        let (tree, _) = fix(&["readme.txt", "units/gun.texture"]);
        let expected = format!("assets/mod_overrides/{PLACEHOLDER}/readme.txt");
        assert!(tree.exists(&expected, EntryKind::File));
    }

    #[test]
    fn test_raid_single_entry() {
        let tree = ModTree::from_paths("", &["MyMod/mod.txt"]);
        assert_eq!(RAID.layout.check(&tree), CheckReturn::Valid);

        let mut tree = ModTree::from_paths("", &["mod.txt", "main.lua"]);
        assert_eq!(RAID.layout.check(&tree), CheckReturn::Fixable);
        let outcome = raid_fixer().fix(&mut tree);
        assert_eq!(
            outcome,
            FixOutcome::Fixed {
                strategy: "all-into",
                pending: Some(PendingRename::new(PLACEHOLDER, NameSource::ModName)),
            }
        );
        assert_eq!(RAID.layout.check(&tree), CheckReturn::Valid);
    }
}
