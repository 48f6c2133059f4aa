//! CLI command action handlers

use super::App;
use crate::games::GameType;
use crate::host::{GameSupport, ModList};
use crate::layout::{CheckReturn, FixOutcome};
use crate::mods::{self, InstallResult};
use crate::projectors::{ModState, StateChangeBatch};
use crate::tree::{disk, ModTree};
use anyhow::{bail, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

impl App {
    // ========== Game Commands ==========

    pub fn cmd_games(&self) -> Result<()> {
        println!("Supported Games:");
        println!("{:-<60}", "");
        for game in GameType::all() {
            let def = game.def();
            let path = self
                .config
                .game(*game)
                .map(|entry| entry.game_dir.clone())
                .unwrap_or_else(|| "not configured".to_string());
            println!("  {} ({})\n    Path: {}", def.name, def.short_name, path);
            for (label, value) in def.details() {
                println!("    {}: {}", label, value);
            }
        }
        Ok(())
    }

    pub fn cmd_set_path(&mut self, game: &str, game_dir: &str, profile_dir: Option<&str>) -> Result<()> {
        let game = self.game(game)?;
        if !Path::new(game_dir).join(game.def().binary).is_file() {
            tracing::warn!("{} not found under {}", game.def().binary, game_dir);
        }
        self.config.set_game(game, game_dir, profile_dir)?;
        self.config.save()?;
        println!("{} path set to {}", game, game_dir);
        Ok(())
    }

    // ========== Mod Commands ==========

    /// Report the layout verdict, the strategy that would repair it and the
    /// content categories of a staged directory. Nothing is written.
    pub fn cmd_check(&self, game: &str, dir: &str) -> Result<()> {
        let game = self.game(game)?;
        let def = game.def();
        let tree = disk::load(Path::new(dir), "")?;

        match def.layout.check(&tree) {
            CheckReturn::Valid => println!("Layout: valid"),
            CheckReturn::Fixable => {
                let mut fixed = tree.clone();
                match (def.fixer)().fix(&mut fixed) {
                    FixOutcome::Fixed { strategy, pending } => {
                        println!("Layout: fixable by {}", strategy);
                        for path in fixed.file_paths() {
                            println!("    {}", path);
                        }
                        if let Some(pending) = pending {
                            println!("  {} is renamed after install", pending.placeholder);
                        }
                    }
                    FixOutcome::Unrecognized => println!("Layout: not recognized"),
                }
            }
        }

        print_contents(game, &tree_categories(game, &tree));
        Ok(())
    }

    pub fn cmd_install(&self, game: &str, source: &str, name: Option<&str>) -> Result<()> {
        let game = self.game(game)?;
        let mut support = self.support(game)?;

        println!("Installing mod from: {}", source);
        match mods::install(&mut support, Path::new(source), name)? {
            InstallResult::Installed(installed) => {
                println!("Installed: {} ({} files)", installed.name, installed.files);
                if let Some(strategy) = installed.strategy {
                    println!("  Layout fixed by {}", strategy);
                }
                if let Some(renamed) = installed.renamed {
                    println!("  Folder renamed to {}", renamed.display());
                }
                Ok(())
            }
            InstallResult::Rejected => bail!("{} does not recognize this archive's layout", game),
        }
    }

    pub fn cmd_list(&self, game: &str) -> Result<()> {
        let game = self.game(game)?;
        let support = self.support(game)?;
        let mods = Self::mod_list(&support);

        let names = mods.names()?;
        if names.is_empty() {
            println!("No mods installed in {}", mods.mods_dir().display());
            return Ok(());
        }
        for name in names {
            let Some(handle) = mods.get_mod(&name) else {
                continue;
            };
            let contents: Vec<_> = support
                .contents_for(&handle.tree)
                .into_iter()
                .filter_map(|c| support.all_contents().iter().find(|d| d.category == c))
                .map(|d| d.name)
                .collect();
            if contents.is_empty() {
                println!("  {}", name);
            } else {
                println!("  {} [{}]", name, contents.join(", "));
            }
        }
        Ok(())
    }

    /// Fire one state-change batch for the named mods.
    pub fn cmd_toggle(&self, game: &str, names: &[String], enable: bool) -> Result<()> {
        let game = self.game(game)?;
        let support = self.support(game)?;
        let mods = Self::mod_list(&support);

        let missing: Vec<_> = names
            .iter()
            .filter(|name| !mods.mods_dir().join(name.as_str()).is_dir())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            bail!("Not installed: {}", missing.join(", "));
        }

        let state = if enable {
            ModState::Active
        } else {
            ModState::Inactive
        };
        let batch: StateChangeBatch = names.iter().map(|name| (name.as_str(), state)).collect();
        let report = support.on_mod_state_changed(&mods, &batch);

        let verb = if enable { "Enabled" } else { "Disabled" };
        for name in names {
            println!("{}: {}", verb, name);
        }
        for failure in &report.failures {
            println!(
                "  warning: {} skipped '{}': {}",
                failure.projector, failure.mod_name, failure.error
            );
        }
        Ok(())
    }

    pub fn cmd_init_profile(&self, game: &str, profile_dir: Option<&str>) -> Result<()> {
        let game = self.game(game)?;
        let mut dirs = self.support(game)?.dirs().clone();
        if let Some(profile_dir) = profile_dir {
            dirs.profile_dir = PathBuf::from(profile_dir);
        }
        let support = GameSupport::new(game, dirs);
        support.initialize_profile()?;

        println!("Profile ready: {}", support.dirs().profile_dir.display());
        for mapping in support.mappings() {
            println!(
                "  {} -> {}",
                mapping.source.display(),
                mapping.destination.display()
            );
        }
        Ok(())
    }
}

fn tree_categories(game: GameType, tree: &ModTree) -> BTreeSet<&'static str> {
    let Some(table) = game.def().content else {
        return BTreeSet::new();
    };
    table
        .classify(tree)
        .into_iter()
        .filter_map(|c| table.def(c).map(|d| d.name))
        .collect()
}

fn print_contents(game: GameType, names: &BTreeSet<&'static str>) {
    if game.def().content.is_none() {
        return;
    }
    if names.is_empty() {
        println!("Contents: none recognized");
    } else {
        let names: Vec<_> = names.iter().copied().collect();
        println!("Contents: {}", names.join(", "));
    }
}
