//! Configuration management for modshape
//!
//! Uses XDG-compliant paths:
//! - Config: ~/.config/modshape/config.toml
//! - Data: ~/.local/share/modshape/

mod paths;

pub use paths::{log_dir, Paths};

use crate::games::{GameDetector, GameType};
use crate::host::GameDirs;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Override for the installed mods root directory
    pub mods_dir_override: Option<String>,

    /// Known game installations, by game id
    pub games: Vec<GameInstallConfig>,

    /// Paths configuration
    #[serde(skip)]
    pub paths: Paths,
}

/// User-specified game install entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameInstallConfig {
    /// Game ID (e.g., "titanfall-2", "payday-2")
    pub game_id: String,
    /// Install path containing the game binary
    pub game_dir: String,
    /// Profile directory, defaults to one per game under the data directory
    pub profile_dir: Option<String>,
}

impl Config {
    /// Load configuration from disk or create default
    pub fn load() -> Result<Self> {
        Self::load_from(Paths::new())
    }

    /// Load configuration rooted at `paths`
    pub fn load_from(paths: Paths) -> Result<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config {
                paths: paths.clone(),
                ..Config::default()
            }
        };

        config.paths = paths;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = self.paths.config_file();

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolve configured mods root (override or default XDG path) for a game
    pub fn mods_dir(&self, game: GameType) -> PathBuf {
        self.mods_dir_override
            .as_deref()
            .map(|root| PathBuf::from(root).join(game.id()))
            .unwrap_or_else(|| self.paths.game_mods_dir(game.id()))
    }

    /// The configured entry for `game`, if any
    pub fn game(&self, game: GameType) -> Option<&GameInstallConfig> {
        self.games
            .iter()
            .find(|entry| GameType::from_id(&entry.game_id) == Some(game))
    }

    /// Record where `game` is installed, replacing any earlier entry.
    pub fn set_game(&mut self, game: GameType, game_dir: &str, profile_dir: Option<&str>) -> Result<()> {
        let game_dir = game_dir.trim();
        if game_dir.is_empty() {
            bail!("Game directory cannot be empty");
        }

        self.games
            .retain(|entry| GameType::from_id(&entry.game_id) != Some(game));
        self.games.push(GameInstallConfig {
            game_id: game.id().to_string(),
            game_dir: game_dir.to_string(),
            profile_dir: profile_dir.map(str::to_string),
        });
        Ok(())
    }

    /// Resolve every directory a game plugin needs. Unconfigured games are
    /// looked up in the Steam libraries.
    pub fn game_dirs(&self, game: GameType) -> Result<GameDirs> {
        let entry = self.game(game);

        let game_dir = match entry {
            Some(entry) => PathBuf::from(&entry.game_dir),
            None => match GameDetector::detect(game) {
                Some(dir) => {
                    tracing::debug!("Detected {} at {}", game, dir.display());
                    dir
                }
                None => bail!(
                    "{} is not configured and was not found in any Steam library",
                    game
                ),
            },
        };

        let profile_dir = entry
            .and_then(|entry| entry.profile_dir.as_deref())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.paths.game_profile_dir(game.id()));

        Ok(GameDirs {
            data_dir: game.def().data_path.resolve(&game_dir),
            game_dir,
            profile_dir,
            mods_dir: self.mods_dir(game),
        })
    }
}
