//! Northstar's `enabledmods.json` allow-list
//!
//! The file maps each mod name to `{ "<version>": true }`. It lives in the
//! profile and is mapped over `R2Northstar/enabledmods.json` at launch.

use super::{read_json, to_json_pretty, write_atomic, ModState, Projector};
use crate::error::{Error, Result};
use crate::host::{GameDirs, ModHandle};
use crate::tree::EntryKind;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const ENABLED_MODS_FILE: &str = "enabledmods.json";
pub const NORTHSTAR_MODS_DIR: &str = "R2Northstar/mods";
pub const MOD_MANIFEST: &str = "mod.json";
const DEFAULT_VERSION: &str = "0.0.0";

/// Seed written to a new profile when the game has no allow-list of its own
pub const DEFAULT_ENABLED_MODS: &str = r#"{"Version": 1,"Northstar.Client": {"1.31.6": true},"Northstar.CustomServers": {"1.31.6": true},"Northstar.Custom": {"1.31.6": true}}"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct NorthstarAllowList;

/// Name and version declared by a Northstar `mod.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NorthstarMod {
    pub name: String,
    pub version: String,
}

impl NorthstarMod {
    pub fn read(manifest: &Path) -> Result<Self> {
        let value = read_json(manifest)?;
        let name = ["Name", "name"]
            .iter()
            .filter_map(|k| value.get(k).and_then(Value::as_str))
            .find(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::MissingManifestField {
                file: manifest.to_path_buf(),
                field: "Name".to_string(),
            })?;
        let version = match value.get("Version") {
            Some(Value::String(v)) => v.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => DEFAULT_VERSION.to_string(),
        };
        Ok(Self {
            name: name.to_string(),
            version,
        })
    }
}

/// Every `R2Northstar/mods/<dir>/mod.json` shipped by a mod
fn manifests(handle: &ModHandle) -> Vec<PathBuf> {
    let Some(mods) = handle.tree.find_dir(NORTHSTAR_MODS_DIR) else {
        return Vec::new();
    };
    mods.children()
        .iter()
        .filter_map(|e| e.as_dir())
        .filter(|d| d.exists(MOD_MANIFEST, EntryKind::File))
        .map(|d| {
            handle
                .path
                .join(NORTHSTAR_MODS_DIR)
                .join(d.name())
                .join(MOD_MANIFEST)
        })
        .collect()
}

/// Apply one toggle to the allow-list object. Returns whether it changed.
pub fn toggle(list: &mut Map<String, Value>, entry: &NorthstarMod, state: ModState) -> bool {
    match state {
        ModState::Active if !list.contains_key(&entry.name) => {
            let mut versions = Map::new();
            versions.insert(entry.version.clone(), Value::Bool(true));
            list.insert(entry.name.clone(), Value::Object(versions));
            true
        }
        ModState::Active => false,
        ModState::Inactive => list.shift_remove(&entry.name).is_some(),
    }
}

impl Projector for NorthstarAllowList {
    fn name(&self) -> &'static str {
        "northstar-allow-list"
    }

    fn project(&self, dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()> {
        let manifests = manifests(handle);
        if manifests.is_empty() {
            return Ok(());
        }

        let path = dirs.profile_dir.join(ENABLED_MODS_FILE);
        let mut document = read_json(&path)?;
        let list = document
            .as_object_mut()
            .ok_or_else(|| Error::MalformedConfig {
                path: path.clone(),
                reason: "top level is not an object".to_string(),
            })?;

        let mut changed = false;
        for manifest in &manifests {
            let entry = NorthstarMod::read(manifest)?;
            if toggle(list, &entry, state) {
                tracing::info!("{} {:?} in {}", entry.name, state, ENABLED_MODS_FILE);
                changed = true;
            }
        }

        if changed {
            write_atomic(&path, &to_json_pretty(&document, &path)?)?;
        }
        Ok(())
    }
}
