//! Application orchestration for the `modshape` CLI

mod actions;

use crate::config::Config;
use crate::games::GameType;
use crate::host::{GameSupport, LocalModList};

use anyhow::{Context, Result};

/// Main application struct that orchestrates all components
pub struct App {
    /// Application configuration
    pub config: Config,
}

impl App {
    /// Create a new App instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolve a game id given on the command line
    fn game(&self, id: &str) -> Result<GameType> {
        GameType::parse(id).with_context(|| {
            let known: Vec<_> = GameType::all().iter().map(|g| g.id()).collect();
            format!("Supported games: {}", known.join(", "))
        })
    }

    /// A plugin instance wired to the configured directories
    fn support(&self, game: GameType) -> Result<GameSupport> {
        let dirs = self
            .config
            .game_dirs(game)
            .with_context(|| format!("Run 'modshape set-path {} <game-dir>' first", game.id()))?;
        tracing::debug!("{} directories: {:?}", game, dirs);
        Ok(GameSupport::new(game, dirs))
    }

    fn mod_list(support: &GameSupport) -> LocalModList {
        LocalModList::new(&support.dirs().mods_dir)
    }
}
