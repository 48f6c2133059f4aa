//! Filesystem-backed mod list: one folder per mod under the mods directory

use super::{ModHandle, ModList};
use crate::tree::disk;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalModList {
    mods_dir: PathBuf,
}

impl LocalModList {
    pub fn new(mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            mods_dir: mods_dir.into(),
        }
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// Names of every installed mod, sorted case-insensitively
    pub fn names(&self) -> Result<Vec<String>> {
        if !self.mods_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        let entries = std::fs::read_dir(&self.mods_dir)
            .with_context(|| format!("Failed to read {}", self.mods_dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Staging folders of in-flight installs are hidden
            if entry.file_type()?.is_dir() && !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<ModHandle> {
        let path = self.mods_dir.join(name);
        if !path.is_dir() {
            anyhow::bail!("Mod '{}' not found in {}", name, self.mods_dir.display());
        }
        let tree = disk::load(&path, name)?;
        Ok(ModHandle {
            name: name.to_string(),
            path,
            tree,
        })
    }
}

impl ModList for LocalModList {
    fn get_mod(&self, name: &str) -> Option<ModHandle> {
        match self.load(name) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::EntryKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_and_loads_mod_folders() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("beta/mods/b")).unwrap();
        fs::create_dir_all(root.path().join("Alpha")).unwrap();
        fs::create_dir_all(root.path().join(".staging-x1")).unwrap();
        fs::write(root.path().join("beta/mods/b/mod.txt"), "{}").unwrap();
        fs::write(root.path().join("notes.txt"), "").unwrap();

        let list = LocalModList::new(root.path());
        assert_eq!(list.names().unwrap(), vec!["Alpha", "beta"]);

        let handle = list.get_mod("beta").unwrap();
        assert_eq!(handle.path, root.path().join("beta"));
        assert!(handle.tree.exists("mods/b/mod.txt", EntryKind::File));
        assert!(list.get_mod("gamma").is_none());
    }

    #[test]
    fn test_missing_mods_dir_is_empty() {
        let root = TempDir::new().unwrap();
        let list = LocalModList::new(root.path().join("nope"));
        assert!(list.names().unwrap().is_empty());
    }
}
