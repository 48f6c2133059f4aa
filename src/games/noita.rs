//! Noita (Lua mods under `mods/<name>/mod.xml`)

use super::{no_projectors, no_seed, DataPath, Executable, GameDef, GameType};
use crate::layout::{Fixer, LayoutRule, MarkerAtRoot, MarkerOneDown, Target, ValidMarker};
use crate::tree::EntryKind;

const MODS: &str = "mods";
const MOD_MARKER: &str = "mod.xml";

fn fixer() -> Fixer {
    Fixer::new()
        .then(MarkerAtRoot {
            marker: MOD_MARKER,
            kind: EntryKind::File,
            requires: None,
            target: Target::placeholder(MODS),
        })
        .then(MarkerOneDown {
            marker: MOD_MARKER,
            sibling: None,
            dest: MODS,
        })
}

pub static NOITA: GameDef = GameDef {
    game: GameType::Noita,
    name: "Noita",
    short_name: "noita",
    steam_app_id: Some(881100),
    steam_folder: "Noita",
    binary: "noita.exe",
    data_path: DataPath::Game(""),
    documents: None,
    saves: None,
    save_extension: None,
    ini_files: &[],
    executables: &[
        Executable::new("Noita", "noita.exe"),
        Executable::new("Noita Dev", "noita_dev.exe"),
    ],
    layout: LayoutRule::new(&[ValidMarker::Dir(MODS)]),
    fixer,
    content: None,
    projectors: no_projectors,
    data_dirs: &[""],
    seed_profile: no_seed,
    mappings: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CheckReturn, FixOutcome};
    use crate::tree::ModTree;

    #[test]
    fn test_mods_dir_is_valid() {
        let tree = ModTree::from_paths("", &["mods/worms/mod.xml"]);
        assert_eq!(NOITA.layout.check(&tree), CheckReturn::Valid);
    }

    #[test]
    fn test_wrapped_mod_moves_under_mods() {
        let mut tree = ModTree::from_paths("", &["worms/mod.xml", "worms/init.lua", "README.md"]);
        assert!(fixer().fix(&mut tree).is_fixed());
        assert_eq!(
            tree.file_paths(),
            vec!["README.md", "mods/worms/init.lua", "mods/worms/mod.xml"]
        );
    }

    #[test]
    fn test_two_marked_folders_are_ambiguous() {
        let mut tree = ModTree::from_paths("", &["a/mod.xml", "b/mod.xml"]);
        assert_eq!(fixer().fix(&mut tree), FixOutcome::Unrecognized);
    }
}
