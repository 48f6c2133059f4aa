//! Host-facing plugin surface
//!
//! [`GameSupport`] is one game's plugin instance. The host calls it from its
//! import pipeline (validate, fix, installed) and from its mod list (state
//! changes). What the plugin needs back from the host is behind [`ModList`].

pub mod local;

pub use local::LocalModList;

use crate::content::{ContentCategory, ContentDef};
use crate::error::{IoContext, Result};
use crate::games::{Executable, GameDef, GameType};
use crate::layout::{CheckReturn, FixOutcome, Fixer};
use crate::projectors::{self, ModState, ProjectionReport, Projector, StateChangeBatch};
use crate::rename::{self, PendingRenames};
use crate::tree::ModTree;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// An installed mod as the host exposes it
#[derive(Debug, Clone)]
pub struct ModHandle {
    /// Display name assigned by the host
    pub name: String,
    /// Absolute folder the mod's files live in
    pub path: PathBuf,
    pub tree: ModTree,
}

/// Lookup of installed mods by display name
#[cfg_attr(test, mockall::automock)]
pub trait ModList {
    fn get_mod(&self, name: &str) -> Option<ModHandle>;
}

/// Identifies one install attempt from fix to "installed" callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstallId(pub u64);

/// Resolved directories for one game install and profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDirs {
    pub game_dir: PathBuf,
    /// Where mods are overlaid (the game dir for most games)
    pub data_dir: PathBuf,
    pub profile_dir: PathBuf,
    pub mods_dir: PathBuf,
}

/// A profile file exposed over a game file by the host's virtual filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// A library injected into an executable at launch
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ForcedLoad {
    pub process: String,
    pub library: String,
}

/// One game's plugin instance
#[derive(Debug)]
pub struct GameSupport {
    def: &'static GameDef,
    dirs: GameDirs,
    fixer: Fixer,
    projectors: Vec<Box<dyn Projector>>,
    pending: PendingRenames,
    next_install: u64,
}

impl GameSupport {
    pub fn new(game: GameType, dirs: GameDirs) -> Self {
        let def = game.def();
        Self {
            def,
            dirs,
            fixer: (def.fixer)(),
            projectors: (def.projectors)(),
            pending: PendingRenames::new(),
            next_install: 0,
        }
    }

    pub fn game(&self) -> GameType {
        self.def.game
    }

    pub fn def(&self) -> &'static GameDef {
        self.def
    }

    pub fn dirs(&self) -> &GameDirs {
        &self.dirs
    }

    pub fn pending_renames(&self) -> usize {
        self.pending.len()
    }

    /// Allocate an id for a new install attempt.
    pub fn begin_install(&mut self) -> InstallId {
        self.next_install += 1;
        InstallId(self.next_install)
    }

    pub fn data_looks_valid(&self, tree: &ModTree) -> CheckReturn {
        let verdict = self.def.layout.check(tree);
        tracing::info!("{}: archive layout {:?}", self.def.short_name, verdict);
        verdict
    }

    /// Repair a FIXABLE tree. A placeholder left by the winning strategy is
    /// queued under `id` until [`on_mod_installed`](Self::on_mod_installed).
    pub fn fix(&mut self, id: InstallId, tree: &mut ModTree) -> FixOutcome {
        let outcome = self.fixer.fix(tree);
        if let FixOutcome::Fixed {
            pending: Some(pending),
            ..
        } = &outcome
        {
            self.pending.queue(id, pending.clone());
        }
        outcome
    }

    /// "Mod installed" callback. Consumes the install's pending rename, if any.
    pub fn on_mod_installed(&mut self, id: InstallId, handle: &ModHandle) -> Result<Option<PathBuf>> {
        match self.pending.take(id) {
            Some(pending) => rename::complete(&pending, handle),
            None => Ok(None),
        }
    }

    /// Drop whatever a failed install left queued under `id`.
    pub fn abandon_install(&mut self, id: InstallId) {
        if let Some(pending) = self.pending.take(id) {
            tracing::debug!("Install {:?} abandoned; dropped rename of {}", id, pending.placeholder);
        }
    }

    pub fn contents_for(&self, tree: &ModTree) -> BTreeSet<ContentCategory> {
        self.def
            .content
            .map(|table| table.classify(tree))
            .unwrap_or_default()
    }

    pub fn all_contents(&self) -> &'static [ContentDef] {
        self.def.content.map(|table| table.categories).unwrap_or(&[])
    }

    pub fn on_mod_state_changed(&self, mods: &dyn ModList, batch: &StateChangeBatch) -> ProjectionReport {
        if self.projectors.is_empty() {
            return ProjectionReport::default();
        }
        tracing::debug!("Projecting {} state changes", batch.len());
        projectors::dispatch(&self.projectors, &self.dirs, mods, batch)
    }

    /// Same as [`on_mod_state_changed`](Self::on_mod_state_changed) for the
    /// host's raw `name -> flags` map.
    pub fn on_mod_flags_changed<'a>(
        &self,
        mods: &dyn ModList,
        changes: impl IntoIterator<Item = (&'a str, u32)>,
    ) -> ProjectionReport {
        let batch = changes
            .into_iter()
            .map(|(name, flags)| (name, ModState::from_flags(flags)))
            .collect();
        self.on_mod_state_changed(mods, &batch)
    }

    /// Prepare the data directories and seed the profile's config files.
    pub fn initialize_profile(&self) -> Result<()> {
        for dir in self.def.data_dirs {
            let path = self.dirs.data_dir.join(dir);
            if !path.exists() {
                fs::create_dir_all(&path).at(&path)?;
                tracing::info!("Created {}", path.display());
            }
        }
        fs::create_dir_all(&self.dirs.profile_dir).at(&self.dirs.profile_dir)?;
        (self.def.seed_profile)(&self.dirs)
    }

    pub fn mappings(&self) -> Vec<FileMapping> {
        self.def
            .mappings
            .iter()
            .map(|(profile_file, game_file)| FileMapping {
                source: self.dirs.profile_dir.join(profile_file),
                destination: self.dirs.game_dir.join(game_file),
            })
            .collect()
    }

    pub fn executables(&self) -> &'static [Executable] {
        self.def.executables
    }

    /// Root DLLs shipped with the game itself
    pub fn base_dlls(&self) -> Result<Vec<String>> {
        base_dlls(&self.dirs.game_dir)
    }

    /// Every root `*.dll` in the composed virtual tree that the game does not
    /// ship is injected into every executable.
    pub fn forced_loads(&self, virtual_tree: &ModTree, base_dlls: &[String]) -> Vec<ForcedLoad> {
        let libraries: BTreeSet<&str> = virtual_tree
            .children()
            .iter()
            .filter(|e| e.is_file() && e.has_suffix("dll"))
            .map(|e| e.name())
            .filter(|name| !base_dlls.iter().any(|b| b.eq_ignore_ascii_case(name)))
            .collect();

        let mut loads = Vec::new();
        for library in libraries {
            for exe in self.def.executables {
                loads.push(ForcedLoad {
                    process: exe.file_name().to_string(),
                    library: library.to_string(),
                });
            }
        }
        loads
    }
}

fn base_dlls(game_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(game_dir).at(game_dir)? {
        let entry = entry.at(game_dir)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dll = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dll"));
        if is_dll && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PLACEHOLDER;
    use crate::tree::{disk, EntryKind};
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
    fn test_install_flow_renames_placeholder() {
        let root = TempDir::new().unwrap();
        let mut support = GameSupport::new(GameType::Noita, dirs(root.path()));

        let mut tree = ModTree::from_paths("", &["mod.xml", "init.lua", "files/sprite.png"]);
        assert_eq!(support.data_looks_valid(&tree), CheckReturn::Fixable);

        let id = support.begin_install();
        assert!(support.fix(id, &mut tree).is_fixed());
        assert!(tree.exists("mods/FOLDERNAME/mod.xml", EntryKind::File));
        assert_eq!(support.pending_renames(), 1);

        let mod_dir = root.path().join("mods/Worms");
        disk::materialize(&tree, &mod_dir, disk::Transfer::Copy).unwrap();
        let handle = ModHandle {
            name: "Worms".to_string(),
            tree,
            path: mod_dir.clone(),
        };

        let renamed = support.on_mod_installed(id, &handle).unwrap();
        assert_eq!(renamed, Some(mod_dir.join("mods/Worms")));
        assert!(mod_dir.join("mods/Worms/files/sprite.png").exists());
        assert!(!mod_dir.join("mods").join(PLACEHOLDER).exists());

        // The request was consumed.
        assert_eq!(support.pending_renames(), 0);
        assert_eq!(support.on_mod_installed(id, &handle).unwrap(), None);
    }

    #[test]
    fn test_concurrent_installs_keep_their_own_rename() {
        let root = TempDir::new().unwrap();
        let mut support = GameSupport::new(GameType::Payday2, dirs(root.path()));
        let first = support.begin_install();
        let second = support.begin_install();
        assert_ne!(first, second);

        let mut a = ModTree::from_paths("", &["mod.txt"]);
        let mut b = ModTree::from_paths("", &["main.xml"]);
        support.fix(first, &mut a);
        support.fix(second, &mut b);
        assert_eq!(support.pending_renames(), 2);
    }

    #[test]
    fn test_forced_loads_skip_base_dlls() {
        let root = TempDir::new().unwrap();
        let support = GameSupport::new(GameType::Titanfall2, dirs(root.path()));
        let vfs = ModTree::from_paths(
            "",
            &["bink2w64.dll", "Northstar.dll", "wsock32.dll", "R2Northstar/mods/x.dll"],
        );
        let base = vec!["bink2w64.dll".to_string()];

        let loads = support.forced_loads(&vfs, &base);
        let libraries: BTreeSet<_> = loads.iter().map(|l| l.library.as_str()).collect();
        assert_eq!(libraries, BTreeSet::from(["Northstar.dll", "wsock32.dll"]));
        assert_eq!(loads.len(), 2 * support.executables().len());
    }

    #[test]
    fn test_base_dlls_reads_game_root() {
        let root = TempDir::new().unwrap();
        let game = root.path().join("game");
        fs::create_dir_all(game.join("bin")).unwrap();
        fs::write(game.join("steam_api.DLL"), "").unwrap();
        fs::write(game.join("game.exe"), "").unwrap();
        fs::write(game.join("bin/other.dll"), "").unwrap();

        let support = GameSupport::new(GameType::Zuma, dirs(root.path()));
        assert_eq!(support.base_dlls().unwrap(), vec!["steam_api.DLL"]);
    }

    #[test]
    fn test_flags_batch_reaches_projectors() {
        let root = TempDir::new().unwrap();
        let support = GameSupport::new(GameType::Payday2, dirs(root.path()));
        let mut mods = MockModList::new();
        mods.expect_get_mod().times(2).returning(|_: &str| None);

        let report = support.on_mod_flags_changed(&mods, [("a", 35), ("b", 33)]);
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn test_games_without_projectors_ignore_batches() {
        let root = TempDir::new().unwrap();
        let support = GameSupport::new(GameType::EmuVr, dirs(root.path()));
        let mods = MockModList::new();
        let batch: StateChangeBatch = [("a", ModState::Active)].into_iter().collect();
        assert!(support.on_mod_state_changed(&mods, &batch).is_clean());
    }

    #[test]
    fn test_classifier_absent_for_some_games() {
        let root = TempDir::new().unwrap();
        let support = GameSupport::new(GameType::Noita, dirs(root.path()));
        let tree = ModTree::from_paths("", &["mods/a/init.lua"]);
        assert!(support.contents_for(&tree).is_empty());
        assert!(support.all_contents().is_empty());
    }
}
