//! UE4SS mod lists for Unreal games (Crime Boss)
//!
//! UE4SS reads `Mods/mods.json` and `Mods/mods.txt` to decide which Lua mods
//! load. Both live in the profile so each profile keeps its own selection.

use super::{read_json, to_json_pretty, write_atomic, ModState, Projector};
use crate::error::{Error, Result};
use crate::host::{GameDirs, ModHandle};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const UE4SS_MODS_DIR: &str = "Binaries/Win64/Mods";
pub const MODS_JSON: &str = "mods.json";
pub const MODS_TXT: &str = "mods.txt";

/// Mods bundled with UE4SS itself, enabled in a fresh profile
pub const DEFAULT_UE4SS_MODS: &[&str] = &[
    "CheatManagerEnablerMod",
    "ActorDumperMod",
    "ConsoleCommandsMod",
    "ConsoleEnablerMod",
    "SplitScreenMod",
    "LineTraceMod",
    "BPModLoaderMod",
    "BPML_GenericFunctions",
    "jsbLuaProfilerMod",
    KEYBINDS,
];

/// Built-in entry that stays last in the list
const KEYBINDS: &str = "Keybinds";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ue4ssModEntry {
    pub mod_name: String,
    pub mod_enabled: bool,
}

/// The ordered UE4SS mod list as stored in a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ue4ssMods {
    pub entries: Vec<Ue4ssModEntry>,
}

impl Default for Ue4ssMods {
    fn default() -> Self {
        Self {
            entries: DEFAULT_UE4SS_MODS
                .iter()
                .map(|name| Ue4ssModEntry {
                    mod_name: name.to_string(),
                    mod_enabled: true,
                })
                .collect(),
        }
    }
}

impl Ue4ssMods {
    /// Load `mods.json` from a profile, falling back to the defaults.
    pub fn load(profile_dir: &Path) -> Result<Self> {
        let path = profile_dir.join(MODS_JSON);
        if !path.exists() {
            return Ok(Self::default());
        }
        let entries = serde_json::from_value(read_json(&path)?).map_err(|source| Error::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Self { entries })
    }

    /// Set a mod's flag, adding it ahead of `Keybinds` when unknown.
    /// Returns whether anything changed.
    pub fn set(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.mod_name == name) {
            Some(entry) if entry.mod_enabled == enabled => false,
            Some(entry) => {
                entry.mod_enabled = enabled;
                true
            }
            None => {
                let at = self
                    .entries
                    .iter()
                    .position(|e| e.mod_name == KEYBINDS)
                    .unwrap_or(self.entries.len());
                self.entries.insert(
                    at,
                    Ue4ssModEntry {
                        mod_name: name.to_string(),
                        mod_enabled: enabled,
                    },
                );
                true
            }
        }
    }

    /// `name : 1` per line
    pub fn to_txt(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} : {}\n", e.mod_name, u8::from(e.mod_enabled)))
            .collect()
    }

    pub fn save(&self, profile_dir: &Path) -> Result<()> {
        let json_path = profile_dir.join(MODS_JSON);
        write_atomic(&json_path, &to_json_pretty(&self.entries, &json_path)?)?;
        write_atomic(&profile_dir.join(MODS_TXT), self.to_txt().as_bytes())
    }

    /// Write the default lists into a profile that has none yet.
    pub fn seed(profile_dir: &Path) -> Result<bool> {
        if profile_dir.join(MODS_JSON).exists() && profile_dir.join(MODS_TXT).exists() {
            return Ok(false);
        }
        Self::load(profile_dir)?.save(profile_dir)?;
        Ok(true)
    }
}

/// Keeps the profile's UE4SS lists in step with the mods that ship UE4SS mods
#[derive(Debug, Clone, Copy, Default)]
pub struct Ue4ssModList;

impl Projector for Ue4ssModList {
    fn name(&self) -> &'static str {
        "ue4ss-mod-list"
    }

    fn project(&self, dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()> {
        let Some(mods) = handle.tree.find_dir(UE4SS_MODS_DIR) else {
            return Ok(());
        };
        let names: Vec<&str> = mods
            .children()
            .iter()
            .filter(|e| e.is_dir())
            .map(|e| e.name())
            .collect();
        if names.is_empty() {
            return Ok(());
        }

        let mut list = Ue4ssMods::load(&dirs.profile_dir)?;
        let mut changed = false;
        for name in names {
            changed |= list.set(name, state.is_active());
        }
        if changed {
            list.save(&dirs.profile_dir)?;
            tracing::info!("UE4SS list updated for '{}'", handle.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ModTree;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn dirs(profile: &Path) -> GameDirs {
        GameDirs {
            game_dir: PathBuf::from("/game"),
            data_dir: PathBuf::from("/game/CrimeBoss"),
            profile_dir: profile.to_path_buf(),
            mods_dir: PathBuf::from("/mods"),
        }
    }

    #[test]
    fn test_seed_writes_defaults() {
        let profile = TempDir::new().unwrap();
        assert!(Ue4ssMods::seed(profile.path()).unwrap());
        assert!(!Ue4ssMods::seed(profile.path()).unwrap());

        let txt = fs::read_to_string(profile.path().join(MODS_TXT)).unwrap();
        assert!(txt.starts_with("CheatManagerEnablerMod : 1\n"));
        assert_eq!(txt.lines().count(), DEFAULT_UE4SS_MODS.len());

        let json = fs::read_to_string(profile.path().join(MODS_JSON)).unwrap();
        assert!(json.starts_with(
            "[\n    {\n        \"mod_name\": \"CheatManagerEnablerMod\",\n        \"mod_enabled\": true\n    },"
        ));
    }

    #[test]
    fn test_toggle_mod_dirs() {
        let profile = TempDir::new().unwrap();
        let handle = ModHandle {
            name: "Trainer".to_string(),
            path: PathBuf::from("/mods/Trainer"),
            tree: ModTree::from_paths(
                "",
                &[
                    "Binaries/Win64/Mods/TrainerMod/Scripts/main.lua",
                    "Binaries/Win64/Mods/readme.txt",
                ],
            ),
        };

        Ue4ssModList
            .project(&dirs(profile.path()), &handle, ModState::Active)
            .unwrap();
        let list = Ue4ssMods::load(profile.path()).unwrap();
        assert_eq!(
            list.entries.iter().rev().nth(1),
            Some(&Ue4ssModEntry {
                mod_name: "TrainerMod".to_string(),
                mod_enabled: true
            })
        );

        Ue4ssModList
            .project(&dirs(profile.path()), &handle, ModState::Inactive)
            .unwrap();
        let txt = fs::read_to_string(profile.path().join(MODS_TXT)).unwrap();
        assert!(txt.ends_with("TrainerMod : 0\nKeybinds : 1\n"));
    }

    #[test]
    fn test_set_reports_changes() {
        let mut list = Ue4ssMods::default();
        assert!(!list.set("Keybinds", true));
        assert!(list.set("Keybinds", false));
        assert!(list.set("New", true));
        assert_eq!(list.entries.len(), DEFAULT_UE4SS_MODS.len() + 1);
    }

    #[test]
    fn test_new_mods_go_before_keybinds() {
        let mut list = Ue4ssMods::default();
        list.set("First", true);
        list.set("Second", false);
        let names: Vec<_> = list.entries.iter().map(|e| e.mod_name.as_str()).collect();
        assert_eq!(&names[names.len() - 3..], ["First", "Second", "Keybinds"]);

        let mut bare = Ue4ssMods { entries: Vec::new() };
        bare.set("Only", true);
        assert_eq!(bare.entries[0].mod_name, "Only");
    }
}
