//! Deferred placeholder renames
//!
//! Some fixer strategies park a mod's payload under [`PLACEHOLDER`](crate::layout::PLACEHOLDER)
//! because the mod's final name is only known once the host finishes the
//! install. The fixer hands back a [`PendingRename`], the host queues it under
//! the install's [`InstallId`], and the "mod installed" callback consumes it
//! with [`complete`].

use crate::error::{read_required, Error, IoContext, Result};
use crate::host::{InstallId, ModHandle};
use crate::tree::EntryKind;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the real folder name comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// The display name the host assigned to the mod
    ModName,
    /// A string field of a JSON manifest inside the placeholder folder.
    /// `keys` are tried in order.
    Manifest {
        file: &'static str,
        keys: &'static [&'static str],
    },
}

/// A placeholder directory awaiting its real name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRename {
    /// Tree path of the placeholder directory, e.g. `mods/FOLDERNAME`
    pub placeholder: String,
    pub naming: NameSource,
}

impl PendingRename {
    pub fn new(placeholder: impl Into<String>, naming: NameSource) -> Self {
        Self {
            placeholder: placeholder.into(),
            naming,
        }
    }

    /// Resolve the folder name for a mod installed at `mod_path`.
    pub fn resolve_name(&self, mod_path: &Path, mod_name: &str) -> Result<String> {
        match self.naming {
            NameSource::ModName => Ok(mod_name.to_string()),
            NameSource::Manifest { file, keys } => {
                let manifest = mod_path.join(&self.placeholder).join(file);
                manifest_field(&manifest, keys)
            }
        }
    }
}

/// Read the first non-empty string among `keys` from a JSON manifest.
pub fn manifest_field(path: &Path, keys: &[&str]) -> Result<String> {
    let content = read_required(path)?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    keys.iter()
        .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::MissingManifestField {
            file: path.to_path_buf(),
            field: keys.join("|"),
        })
}

/// Pending renames keyed by install, so batched installs cannot clobber each other
#[derive(Debug, Default)]
pub struct PendingRenames {
    slots: HashMap<InstallId, PendingRename>,
}

impl PendingRenames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, id: InstallId, pending: PendingRename) {
        if let Some(previous) = self.slots.insert(id, pending) {
            tracing::warn!(
                "Install {:?} re-fixed before its rename ran; dropping {}",
                id,
                previous.placeholder
            );
        }
    }

    /// Remove and return the request for `id`. A request is consumed exactly once.
    pub fn take(&mut self, id: InstallId) -> Option<PendingRename> {
        self.slots.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Rename the placeholder inside an installed mod.
///
/// Returns the new directory, or `None` when the mod's tree has no such
/// placeholder (a speculative request silently expires). A manifest that
/// cannot supply a name falls back to the mod's display name.
pub fn complete(pending: &PendingRename, handle: &ModHandle) -> Result<Option<PathBuf>> {
    if !handle.tree.exists(&pending.placeholder, EntryKind::Directory) {
        tracing::debug!(
            "No {} in '{}', nothing to rename",
            pending.placeholder,
            handle.name
        );
        return Ok(None);
    }

    let name = match pending.resolve_name(&handle.path, &handle.name) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("{}; using mod name '{}' instead", e, handle.name);
            handle.name.clone()
        }
    };
    let name = sanitize_folder_name(&name);

    let source = handle.path.join(&pending.placeholder);
    let parent = source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| handle.path.clone());
    let destination = parent.join(&name);

    if source == destination {
        return Ok(Some(destination));
    }

    move_overwrite_merge(&source, &destination)?;
    tracing::info!(
        "Renamed {} to {}",
        source.display(),
        destination.display()
    );
    Ok(Some(destination))
}

/// Move `source` onto `destination`.
///
/// A missing destination is a plain rename. Otherwise files replace their
/// counterparts, directories merge recursively, and the emptied source is removed.
pub fn move_overwrite_merge(source: &Path, destination: &Path) -> Result<()> {
    if !destination.exists() {
        return fs::rename(source, destination).at(source);
    }
    if source.is_file() {
        if destination.is_dir() {
            fs::remove_dir_all(destination).at(destination)?;
        }
        return fs::rename(source, destination).at(source);
    }
    if destination.is_file() {
        fs::remove_file(destination).at(destination)?;
        return fs::rename(source, destination).at(source);
    }

    for item in fs::read_dir(source).at(source)? {
        let item = item.at(source)?;
        move_overwrite_merge(&item.path(), &destination.join(item.file_name()))?;
    }
    fs::remove_dir(source).at(source)
}

/// Mod names may carry characters that cannot appear in a single path component.
fn sanitize_folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').to_string();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}
