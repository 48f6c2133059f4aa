//! Loader DLLs copied next to the game executable
//!
//! BLT-style mod loaders ship a proxy DLL that must sit in the game root,
//! where the virtual filesystem does not reach.

use super::{ModState, Projector};
use crate::error::{IoContext, Result};
use crate::host::{GameDirs, ModHandle};
use std::fs;

/// Proxy DLL names the Diesel games load
pub const LOADER_DLLS: &[&str] = &["IPHLPAPI.dll", "WSOCK32.dll"];

#[derive(Debug, Clone, Copy)]
pub struct DllMirror {
    pub libraries: &'static [&'static str],
}

impl DllMirror {
    pub const fn new(libraries: &'static [&'static str]) -> Self {
        Self { libraries }
    }

    fn is_loader(&self, name: &str) -> bool {
        self.libraries.iter().any(|l| l.eq_ignore_ascii_case(name))
    }
}

impl Projector for DllMirror {
    fn name(&self) -> &'static str {
        "dll-mirror"
    }

    fn project(&self, dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()> {
        let loaders = handle
            .tree
            .children()
            .iter()
            .filter(|e| e.is_file() && self.is_loader(e.name()));

        for entry in loaders {
            let source = handle.path.join(entry.name());
            let target = dirs.game_dir.join(entry.name());
            match state {
                ModState::Active => {
                    fs::copy(&source, &target).at(&source)?;
                    tracing::info!("Copied {} into {}", entry.name(), dirs.game_dir.display());
                }
                ModState::Inactive => {
                    if target.exists() {
                        fs::remove_file(&target).at(&target)?;
                        tracing::info!("Removed {} from {}", entry.name(), dirs.game_dir.display());
                    }
                }
            }
        }
        Ok(())
    }
}
