//! XDG-compliant path management

use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

/// Manages all application paths under the XDG base directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    /// Resolve the XDG directories, falling back to `~/.modshape` when the
    /// platform has none.
    pub fn new() -> Self {
        match ProjectDirs::from("", "", "modshape") {
            Some(dirs) => Self {
                config_dir: dirs.config_dir().to_path_buf(),
                data_dir: dirs.data_dir().to_path_buf(),
            },
            None => Self::under(&fallback_root()),
        }
    }

    /// Keep everything below one directory
    pub fn under(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    // ========== Config Paths ==========

    /// Main config file: ~/.config/modshape/config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    // ========== Data Paths ==========

    /// Mods directory for a specific game: ~/.local/share/modshape/mods/<game>/
    pub fn game_mods_dir(&self, game_id: &str) -> PathBuf {
        self.data_dir.join("mods").join(game_id)
    }

    /// Default profile for a specific game: ~/.local/share/modshape/profiles/<game>/
    pub fn game_profile_dir(&self, game_id: &str) -> PathBuf {
        self.data_dir.join("profiles").join(game_id)
    }
}

/// Log directory shared with `main.rs`: ~/.modshape/
pub fn log_dir() -> PathBuf {
    fallback_root()
}

fn fallback_root() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".modshape")
}
