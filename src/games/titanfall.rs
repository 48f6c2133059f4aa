//! Titanfall 2 with the Northstar client

use super::{DataPath, Executable, GameDef, GameType};
use crate::content::TITANFALL_CONTENT;
use crate::error::{IoContext, Result};
use crate::host::GameDirs;
use crate::layout::{
    AllInto, Fixer, LayoutRule, MarkerAtRoot, MarkerOneDown, MarkerTwoDown, SingleEntry, Target,
    ValidMarker,
};
use crate::projectors::northstar::{
    DEFAULT_ENABLED_MODS, ENABLED_MODS_FILE, MOD_MANIFEST, NORTHSTAR_MODS_DIR,
};
use crate::projectors::{NorthstarAllowList, Projector};
use crate::rename::NameSource;
use crate::tree::EntryKind;
use std::fs;

const GAME_ENABLED_MODS: &str = "R2Northstar/enabledmods.json";

fn fixer() -> Fixer {
    Fixer::new()
        .then(MarkerAtRoot {
            marker: MOD_MANIFEST,
            kind: EntryKind::File,
            requires: None,
            target: Target::Placeholder {
                root: NORTHSTAR_MODS_DIR,
                naming: NameSource::Manifest {
                    file: MOD_MANIFEST,
                    keys: &["Name", "name"],
                },
            },
        })
        .then(MarkerOneDown {
            marker: MOD_MANIFEST,
            sibling: None,
            dest: NORTHSTAR_MODS_DIR,
        })
        .then(MarkerTwoDown {
            marker: MOD_MANIFEST,
            sibling: None,
            dest: NORTHSTAR_MODS_DIR,
        })
        .then(SingleEntry {
            dest: NORTHSTAR_MODS_DIR,
        })
        .then(AllInto {
            target: Target::placeholder(NORTHSTAR_MODS_DIR),
        })
}

fn projectors() -> Vec<Box<dyn Projector>> {
    vec![Box::new(NorthstarAllowList)]
}

/// Give the profile its own allow-list, copied from the game when it has one.
fn seed_profile(dirs: &GameDirs) -> Result<()> {
    let profile_list = dirs.profile_dir.join(ENABLED_MODS_FILE);
    let missing = fs::metadata(&profile_list).map_or(true, |m| m.len() == 0);
    if !missing {
        return Ok(());
    }

    let game_list = dirs.game_dir.join(GAME_ENABLED_MODS);
    if game_list.is_file() {
        fs::copy(&game_list, &profile_list).at(&game_list)?;
        tracing::info!("Copied {} into the profile", game_list.display());
    } else {
        fs::write(&profile_list, DEFAULT_ENABLED_MODS).at(&profile_list)?;
        tracing::info!("Wrote default {}", profile_list.display());
    }
    Ok(())
}

pub static TITANFALL2: GameDef = GameDef {
    game: GameType::Titanfall2,
    name: "Titanfall 2",
    short_name: "titanfall-2",
    steam_app_id: Some(1237970),
    steam_folder: "Titanfall2",
    binary: "Titanfall2.exe",
    data_path: DataPath::Game(""),
    documents: Some("%USERPROFILE%/Documents/Respawn/Titanfall2/profile"),
    saves: Some("%USERPROFILE%/Documents/Respawn/Titanfall2/profile/savegames/"),
    save_extension: None,
    ini_files: &["profile.cfg"],
    executables: &[
        Executable::new("Titanfall 2", "Titanfall2.exe"),
        Executable::new("Northstar", "NorthstarLauncher.exe"),
    ],
    layout: LayoutRule::new(&[ValidMarker::Dir("R2Northstar")]),
    fixer,
    content: Some(&TITANFALL_CONTENT),
    projectors,
    data_dirs: &[NORTHSTAR_MODS_DIR],
    seed_profile,
    mappings: &[(ENABLED_MODS_FILE, GAME_ENABLED_MODS)],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::GameSupport;
    use crate::layout::{CheckReturn, FixOutcome};
    use crate::rename::PendingRename;
    use crate::tree::ModTree;
    use std::path::Path;
    use tempfile::TempDir;

    fn dirs(root: &Path) -> GameDirs {
        GameDirs {
            game_dir: root.join("game"),
            data_dir: root.join("game"),
            profile_dir: root.join("profile"),
            mods_dir: root.join("mods"),
        }
    }

    #[test]
    fn test_northstar_dir_is_valid() {
        let tree = ModTree::from_paths("", &["R2Northstar/mods/A/mod.json"]);
        assert_eq!(TITANFALL2.layout.check(&tree), CheckReturn::Valid);
    }

    #[test]
    fn test_root_manifest_names_from_mod_json() {
        let mut tree = ModTree::from_paths("", &["mod.json", "mod/scripts/vscripts/a.nut"]);
        let outcome = fixer().fix(&mut tree);
        assert_eq!(
            outcome,
            FixOutcome::Fixed {
                strategy: "marker-at-root",
                pending: Some(PendingRename::new(
                    "R2Northstar/mods/FOLDERNAME",
                    NameSource::Manifest {
                        file: "mod.json",
                        keys: &["Name", "name"]
                    }
                )),
            }
        );
    }

    #[test]
    fn test_last_resort_uses_mod_name() {
        let mut tree = ModTree::from_paths("", &["a.vpk", "b.vpk"]);
        let outcome = fixer().fix(&mut tree);
        assert_eq!(
            outcome,
            FixOutcome::Fixed {
                strategy: "all-into",
                pending: Some(PendingRename::new(
                    "R2Northstar/mods/FOLDERNAME",
                    NameSource::ModName
                )),
            }
        );
    }

    #[test]
    fn test_wrapped_and_double_wrapped() {
        let mut tree = ModTree::from_paths("", &["Author.Mod/mod.json", "icon.png"]);
        fixer().fix(&mut tree);
        assert!(tree.exists("R2Northstar/mods/Author.Mod/mod.json", EntryKind::File));
        assert!(tree.exists("icon.png", EntryKind::File));

        let mut tree = ModTree::from_paths("", &["Download/Author.Mod/mod.json"]);
        fixer().fix(&mut tree);
        assert!(tree.exists("R2Northstar/mods/Download/mod.json", EntryKind::File));
    }

    #[test]
    fn test_profile_seed_prefers_game_copy() {
        let root = TempDir::new().unwrap();
        let support = GameSupport::new(GameType::Titanfall2, dirs(root.path()));
        fs::create_dir_all(root.path().join("game/R2Northstar")).unwrap();
        fs::write(root.path().join("game").join(GAME_ENABLED_MODS), "{\"Version\": 1}").unwrap();

        support.initialize_profile().unwrap();
        let seeded = fs::read_to_string(root.path().join("profile").join(ENABLED_MODS_FILE)).unwrap();
        assert_eq!(seeded, "{\"Version\": 1}");
        assert!(root.path().join("game/R2Northstar/mods").is_dir());
    }

    #[test]
    fn test_profile_seed_default_and_mapping() {
        let root = TempDir::new().unwrap();
        let support = GameSupport::new(GameType::Titanfall2, dirs(root.path()));
        support.initialize_profile().unwrap();

        let profile_list = root.path().join("profile").join(ENABLED_MODS_FILE);
        assert_eq!(fs::read_to_string(&profile_list).unwrap(), DEFAULT_ENABLED_MODS);

        // An existing list is left alone.
        fs::write(&profile_list, "{}").unwrap();
        support.initialize_profile().unwrap();
        assert_eq!(fs::read_to_string(&profile_list).unwrap(), "{}");

        let mappings = support.mappings();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].source, profile_list);
        assert_eq!(
            mappings[0].destination,
            root.path().join("game/R2Northstar/enabledmods.json")
        );
    }
}
