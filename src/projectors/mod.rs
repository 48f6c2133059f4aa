//! State-change projectors
//!
//! When mods are enabled or disabled, some games need that state mirrored
//! into files outside any mod's own folder: loader DLLs in the game root, a
//! JSON allow-list, a hand-rolled config grammar, or a merged level file.
//! Each [`Projector`] handles one such file. Failures are contained per mod:
//! the dispatcher logs them and moves on to the next mod in the batch.

pub mod dll_mirror;
pub mod northstar;
pub mod smf;
pub mod ue4ss;
pub mod zuma;

pub use dll_mirror::DllMirror;
pub use northstar::NorthstarAllowList;
pub use smf::SmfConfig;
pub use ue4ss::Ue4ssModList;
pub use zuma::{LevelFragments, LevelsOverride};

use crate::error::{read_required, Error, IoContext, Result};
use crate::host::{GameDirs, ModHandle, ModList};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Enable state delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModState {
    Active,
    Inactive,
}

impl ModState {
    pub const EXISTS: u32 = 0x1;
    pub const ACTIVE: u32 = 0x2;
    pub const VALID: u32 = 0x20;

    /// Decode the host's flag word (35 for an enabled mod, 33 for a disabled one).
    pub fn from_flags(flags: u32) -> Self {
        if flags & Self::ACTIVE != 0 {
            ModState::Active
        } else {
            ModState::Inactive
        }
    }

    pub fn flags(self) -> u32 {
        match self {
            ModState::Active => Self::EXISTS | Self::ACTIVE | Self::VALID,
            ModState::Inactive => Self::EXISTS | Self::VALID,
        }
    }

    pub fn is_active(self) -> bool {
        self == ModState::Active
    }
}

/// Mods whose state changed together, in the order the host reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateChangeBatch {
    changes: Vec<(String, ModState)>,
}

impl StateChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. A mod reported twice keeps its latest state and first position.
    pub fn push(&mut self, name: impl Into<String>, state: ModState) {
        let name = name.into();
        match self.changes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = state,
            None => self.changes.push((name, state)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ModState)> {
        self.changes.iter().map(|(n, s)| (n.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ModState)> for StateChangeBatch {
    fn from_iter<I: IntoIterator<Item = (S, ModState)>>(iter: I) -> Self {
        let mut batch = Self::new();
        for (name, state) in iter {
            batch.push(name, state);
        }
        batch
    }
}

/// Mirrors one mod's enable state into an external file
pub trait Projector: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Apply `state` for `handle`. Mods without relevant content are a no-op.
    fn project(&self, dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()>;
}

#[derive(Debug)]
pub struct ProjectionFailure {
    pub projector: &'static str,
    pub mod_name: String,
    pub error: String,
}

/// What happened during one batch
#[derive(Debug, Default)]
pub struct ProjectionReport {
    pub applied: usize,
    pub failures: Vec<ProjectionFailure>,
}

impl ProjectionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, projector: &'static str, mod_name: &str, error: String) {
        tracing::warn!("{} skipped for '{}': {}", projector, mod_name, error);
        self.failures.push(ProjectionFailure {
            projector,
            mod_name: mod_name.to_string(),
            error,
        });
    }
}

/// Run every projector over the batch.
///
/// Projectors run in their declared order, each seeing the whole batch, so a
/// projector can rely on the ones before it having finished.
pub fn dispatch(
    projectors: &[Box<dyn Projector>],
    dirs: &GameDirs,
    mods: &dyn ModList,
    batch: &StateChangeBatch,
) -> ProjectionReport {
    let mut report = ProjectionReport::default();
    for projector in projectors {
        for (name, state) in batch.iter() {
            let Some(handle) = mods.get_mod(name) else {
                report.fail(projector.name(), name, "mod not found".to_string());
                continue;
            };
            match projector.project(dirs, &handle, state) {
                Ok(()) => report.applied += 1,
                Err(e) => report.fail(projector.name(), name, e.to_string()),
            }
        }
    }
    report
}

/// Replace `path` with `contents` through a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).at(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).at(dir)?;
    tmp.write_all(contents).at(tmp.path())?;
    tmp.as_file().sync_all().at(tmp.path())?;
    tmp.persist(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = read_required(path)?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize with 4-space indentation, the layout the games' own tools write.
pub(crate) fn to_json_pretty<T: Serialize>(value: &T, path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockModList;
    use crate::tree::ModTree;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl Projector for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn project(&self, _dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()> {
            if self.fail_on == Some(handle.name.as_str()) {
                return Err(Error::MissingFile(PathBuf::from("config.json")));
            }
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}={:?}", handle.name, state));
            Ok(())
        }
    }

    fn dirs() -> GameDirs {
        GameDirs {
            game_dir: PathBuf::from("/game"),
            data_dir: PathBuf::from("/game"),
            profile_dir: PathBuf::from("/profile"),
            mods_dir: PathBuf::from("/mods"),
        }
    }

    fn handle(name: &str) -> ModHandle {
        ModHandle {
            name: name.to_string(),
            path: PathBuf::from("/mods").join(name),
            tree: ModTree::new(""),
        }
    }

    #[test]
    fn test_flags_round_trip() {
        assert_eq!(ModState::from_flags(35), ModState::Active);
        assert_eq!(ModState::from_flags(33), ModState::Inactive);
        assert_eq!(ModState::Active.flags(), 35);
        assert_eq!(ModState::Inactive.flags(), 33);
    }

    #[test]
    fn test_batch_keeps_insertion_order() {
        let batch: StateChangeBatch = [
            ("b", ModState::Active),
            ("a", ModState::Inactive),
            ("b", ModState::Inactive),
        ]
        .into_iter()
        .collect();
        let order: Vec<_> = batch.iter().collect();
        assert_eq!(order, vec![("b", ModState::Inactive), ("a", ModState::Inactive)]);
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let mut mods = MockModList::new();
        mods.expect_get_mod()
            .returning(|name: &str| match name {
                "missing" => None,
                other => Some(handle(other)),
            });

        let recorder = Recorder {
            fail_on: Some("broken"),
            ..Default::default()
        };
        let projectors: Vec<Box<dyn Projector>> = vec![Box::new(recorder)];
        let batch: StateChangeBatch = [
            ("broken", ModState::Active),
            ("missing", ModState::Active),
            ("fine", ModState::Inactive),
        ]
        .into_iter()
        .collect();

        let report = dispatch(&projectors, &dirs(), &mods, &batch);
        assert_eq!(report.applied, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].mod_name, "broken");
        assert_eq!(report.failures[1].error, "mod not found");
    }

    #[test]
    fn test_each_mod_projected_once() {
        let mut mods = MockModList::new();
        mods.expect_get_mod()
            .withf(|name: &str| name == "one")
            .times(1)
            .returning(|name: &str| Some(handle(name)));

        let projectors: Vec<Box<dyn Projector>> = vec![Box::new(Recorder::default())];
        let batch: StateChangeBatch = [("one", ModState::Active)].into_iter().collect();
        let report = dispatch(&projectors, &dirs(), &mods, &batch);
        assert!(report.is_clean());
        assert_eq!(report.applied, 1);
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(dir.path().join("nested")).unwrap().count(), 1);
    }
}
