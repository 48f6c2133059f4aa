//! Mod installation: stage, validate, fix, materialize, rename

pub mod archive;

pub use archive::{extract_archive, ArchiveFormat};

use crate::host::{GameSupport, InstallId, ModHandle};
use crate::layout::{CheckReturn, FixOutcome};
use crate::tree::disk::{self, Transfer};
use crate::tree::ModTree;
use anyhow::{bail, Context, Result};
use regex_lite::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of an installation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    Installed(InstalledMod),
    /// No strategy recognized the layout; nothing was written
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledMod {
    pub name: String,
    pub path: PathBuf,
    /// Strategy that repaired the layout, `None` when it was already valid
    pub strategy: Option<&'static str>,
    /// Final location of a renamed placeholder folder
    pub renamed: Option<PathBuf>,
    pub files: usize,
}

/// Install an archive or a directory as `<mods_dir>/<name>`.
///
/// When `name` is omitted it is derived from the source file name.
pub fn install(support: &mut GameSupport, source: &Path, name: Option<&str>) -> Result<InstallResult> {
    let name = match name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Cannot derive a mod name from the source path")?;
            parse_mod_name(stem).0
        }
    };

    let mods_dir = support.dirs().mods_dir.clone();
    let dest = mods_dir.join(&name);
    if dest.exists() {
        bail!("Mod '{}' is already installed", name);
    }
    fs::create_dir_all(&mods_dir)
        .with_context(|| format!("Failed to create {}", mods_dir.display()))?;

    // Stage next to the destination so files can be moved, not copied
    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(&mods_dir)
        .context("Failed to create staging directory")?;

    let (staged_root, transfer) = if source.is_dir() {
        (source.to_path_buf(), Transfer::Copy)
    } else {
        extract_archive(source, staging.path())?;
        (staging.path().to_path_buf(), Transfer::Move)
    };

    let mut tree = disk::load(&staged_root, "")?;
    let id = support.begin_install();

    let strategy = match support.data_looks_valid(&tree) {
        CheckReturn::Valid => None,
        CheckReturn::Fixable => match support.fix(id, &mut tree) {
            FixOutcome::Fixed { strategy, .. } => Some(strategy),
            FixOutcome::Unrecognized => {
                tracing::warn!("Rejected '{}': layout not recognized", name);
                return Ok(InstallResult::Rejected);
            }
        },
    };

    let files = match place(&tree, &mods_dir, &dest, transfer) {
        Ok(files) => files,
        Err(e) => {
            support.abandon_install(id);
            return Err(e);
        }
    };
    tracing::info!("Installed '{}' ({} files) to {}", name, files, dest.display());

    let renamed = match finish(support, id, &name, &dest) {
        Ok(renamed) => renamed,
        Err(e) => {
            support.abandon_install(id);
            if let Err(cleanup) = fs::remove_dir_all(&dest) {
                tracing::warn!("Could not remove {}: {}", dest.display(), cleanup);
            }
            return Err(e);
        }
    };

    Ok(InstallResult::Installed(InstalledMod {
        name,
        path: dest,
        strategy,
        renamed,
        files,
    }))
}

/// Write the tree into a hidden sibling of `dest`, then move it into place.
fn place(tree: &ModTree, mods_dir: &Path, dest: &Path, transfer: Transfer) -> Result<usize> {
    let building = tempfile::Builder::new()
        .prefix(".install-")
        .tempdir_in(mods_dir)
        .context("Failed to create install directory")?;
    let files = disk::materialize(tree, building.path(), transfer)?;
    fs::rename(building.path(), dest).with_context(|| {
        format!("Failed to move {} to {}", building.path().display(), dest.display())
    })?;
    Ok(files)
}

fn finish(support: &mut GameSupport, id: InstallId, name: &str, dest: &Path) -> Result<Option<PathBuf>> {
    let handle = ModHandle {
        name: name.to_string(),
        tree: disk::load(dest, "")?,
        path: dest.to_path_buf(),
    };
    support
        .on_mod_installed(id, &handle)
        .with_context(|| format!("Failed to finish installing '{}'", name))
}

/// Parse mod name and version from archive filename
pub fn parse_mod_name(filename: &str) -> (String, String) {
    // Common patterns:
    // "ModName-1.2.3"
    // "ModName v1.2.3"
    // "ModName_1.2.3"
    // "ModName 1.2.3"

    let version_patterns = [
        r"-(\d+(?:\.\d+)*)",
        r"[_\s]v?(\d+(?:\.\d+)*)",
        r"[_\s](\d+(?:\.\d+)+)",
    ];

    for pattern in version_patterns {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        let Some(caps) = re.captures(filename) else {
            continue;
        };
        let (Some(whole), Some(version)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let name = filename[..whole.start()]
            .replace(['-', '_'], " ")
            .trim()
            .to_string();
        if name.is_empty() {
            continue;
        }
        return (name, version.as_str().to_string());
    }

    // No version found
    (filename.replace(['-', '_'], " ").trim().to_string(), "1.0.0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameType;
    use crate::host::GameDirs;
    use std::io::Write;
    use tempfile::TempDir;

    fn support(root: &Path, game: GameType) -> GameSupport {
        GameSupport::new(
            game,
            GameDirs {
                game_dir: root.join("game"),
                data_dir: root.join("game"),
                profile_dir: root.join("profile"),
                mods_dir: root.join("mods"),
            },
        )
    }

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_parse_mod_name() {
        assert_eq!(
            parse_mod_name("BeardLib-1.2.3"),
            ("BeardLib".to_string(), "1.2.3".to_string())
        );
        assert_eq!(
            parse_mod_name("Cool_Mod v2.0"),
            ("Cool Mod".to_string(), "2.0".to_string())
        );
        assert_eq!(
            parse_mod_name("NoVersion"),
            ("NoVersion".to_string(), "1.0.0".to_string())
        );
    }

    #[test]
    fn test_install_renames_placeholder() {
        let root = TempDir::new().unwrap();
        let archive = root.path().join("Worms-1.0.zip");
        write_zip(&archive, &[("mod.xml", "<Mod/>"), ("init.lua", "")]);

        let mut support = support(root.path(), GameType::Noita);
        let result = install(&mut support, &archive, None).unwrap();
        let InstallResult::Installed(installed) = result else {
            panic!("expected an install");
        };

        assert_eq!(installed.name, "Worms");
        assert_eq!(installed.strategy, Some("marker-at-root"));
        assert_eq!(installed.files, 2);
        let renamed = root.path().join("mods/Worms/mods/Worms");
        assert_eq!(installed.renamed, Some(renamed.clone()));
        assert!(renamed.join("mod.xml").is_file());
        assert_eq!(support.pending_renames(), 0);
    }

    #[test]
    fn test_install_valid_directory_is_copied() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("source");
        fs::create_dir_all(source.join("mods/worms")).unwrap();
        fs::write(source.join("mods/worms/mod.xml"), "<Mod/>").unwrap();

        let mut support = support(root.path(), GameType::Noita);
        let result = install(&mut support, &source, Some("Worms")).unwrap();
        let InstallResult::Installed(installed) = result else {
            panic!("expected an install");
        };
        assert_eq!(installed.strategy, None);
        assert!(root.path().join("mods/Worms/mods/worms/mod.xml").is_file());
        assert!(source.join("mods/worms/mod.xml").is_file());
    }

    #[test]
    fn test_unrecognized_layout_is_rejected() {
        let root = TempDir::new().unwrap();
        let archive = root.path().join("Readme.zip");
        write_zip(&archive, &[("readme.md", "hi")]);

        let mut support = support(root.path(), GameType::Noita);
        let result = install(&mut support, &archive, None).unwrap();
        assert_eq!(result, InstallResult::Rejected);
        assert!(!root.path().join("mods/Readme").exists());
    }

    #[test]
    fn test_existing_mod_is_not_overwritten() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("mods/Worms")).unwrap();
        let archive = root.path().join("Worms.zip");
        write_zip(&archive, &[("mod.xml", "")]);

        let mut support = support(root.path(), GameType::Noita);
        assert!(install(&mut support, &archive, None).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_install_leaves_nothing_behind() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("mod.xml"), "<Mod/>").unwrap();
        std::os::unix::fs::symlink(root.path().join("missing"), source.join("zz_broken")).unwrap();

        let mut support = support(root.path(), GameType::Noita);
        assert!(install(&mut support, &source, Some("Worms")).is_err());
        assert!(!root.path().join("mods/Worms").exists());
        assert_eq!(support.pending_renames(), 0);
        let leftovers: Vec<_> = fs::read_dir(root.path().join("mods")).unwrap().collect();
        assert!(leftovers.is_empty());

        fs::remove_file(source.join("zz_broken")).unwrap();
        let result = install(&mut support, &source, Some("Worms")).unwrap();
        assert!(matches!(result, InstallResult::Installed(_)));
        assert!(root.path().join("mods/Worms/mods/Worms/mod.xml").is_file());
        assert_eq!(support.pending_renames(), 0);
    }
}
