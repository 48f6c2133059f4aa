//! Zuma Deluxe `levels.xml` projection
//!
//! The game reads a single `levels/levels.xml`, mapped from the profile.
//! Mods contribute to it two ways: a full replacement `levels/levels.xml`,
//! or a `levels/map.txt` holding `<Graphics>` and `<Level>` fragments that
//! get spliced into the profile copy. The file is hand-written markup, not
//! well-formed XML, so both directions are literal text edits.

use super::{write_atomic, ModState, Projector};
use crate::error::{read_required, Error, Result};
use crate::host::{GameDirs, ModHandle};
use crate::tree::EntryKind;
use regex_lite::Regex;
use std::path::Path;

pub const PROFILE_LEVELS: &str = "levels.xml";
pub const GAME_LEVELS: &str = "levels/levels.xml";
pub const MAP_FRAGMENTS: &str = "levels/map.txt";

const GRAPHICS_ANCHOR: &str = "\n\n<Graphics";
const LEVEL_ANCHOR: &str = "\n<Level grap";
const STAGE_LIST: &str = "stage1 = \"";
const DIFFICULTY_LIST: &str = "diffi1 = \"";
const DIFFICULTY_ITEM: &str = "lvl42,";

/// A mod's own `levels/levels.xml` replaces the profile copy while enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelsOverride;

impl Projector for LevelsOverride {
    fn name(&self) -> &'static str {
        "zuma-levels-override"
    }

    fn project(&self, dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()> {
        if !handle.tree.exists(GAME_LEVELS, EntryKind::File) {
            return Ok(());
        }
        let source = match state {
            ModState::Active => handle.path.join(GAME_LEVELS),
            ModState::Inactive => dirs.data_dir.join(GAME_LEVELS),
        };
        let content = read_required(&source)?;
        write_atomic(&dirs.profile_dir.join(PROFILE_LEVELS), content.as_bytes())?;
        tracing::info!("Profile levels.xml now from {}", source.display());
        Ok(())
    }
}

/// Fragments parsed out of a `map.txt`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapFragments {
    pub graphics: Vec<String>,
    pub levels: Vec<String>,
    pub ids: Vec<String>,
}

fn matches(pattern: &str, text: &str, group: usize) -> Vec<String> {
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::error!("Bad fragment pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };
    re.captures_iter(text)
        .filter_map(|c| c.get(group))
        .map(|m| m.as_str().to_string())
        .collect()
}

impl MapFragments {
    pub fn parse(map: &str) -> Self {
        Self {
            graphics: matches(r"(?s)<Graphics.*?Graphics>", map, 0),
            levels: matches(r"(?s)<Level.*?/>", map, 0),
            ids: matches(r#"(?s)id="(.*?)""#, map, 1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty() && self.levels.is_empty() && self.ids.is_empty()
    }

    /// Whether every graphics and level fragment is already in `levels_xml`
    pub fn is_spliced(&self, levels_xml: &str) -> bool {
        self.graphics
            .iter()
            .chain(&self.levels)
            .all(|fragment| levels_xml.contains(fragment.as_str()))
    }

    /// Splice the fragments in. Every anchor used must exist.
    /// Text that already holds every fragment comes back unchanged.
    pub fn insert(&self, levels_xml: &str, path: &Path) -> Result<String> {
        if self.is_spliced(levels_xml) {
            return Ok(levels_xml.to_string());
        }
        let required = [
            (!self.graphics.is_empty(), GRAPHICS_ANCHOR),
            (!self.levels.is_empty(), LEVEL_ANCHOR),
            (!self.ids.is_empty(), STAGE_LIST),
            (!self.ids.is_empty(), DIFFICULTY_LIST),
        ];
        if let Some((_, anchor)) = required
            .iter()
            .find(|(needed, anchor)| *needed && !levels_xml.contains(anchor))
        {
            return Err(Error::MalformedConfig {
                path: path.to_path_buf(),
                reason: format!("missing anchor {:?}", anchor.trim_start()),
            });
        }

        let mut out = levels_xml.to_string();
        if !self.graphics.is_empty() {
            let mut block: String = self.graphics.iter().map(|g| format!("\n\n{g}")).collect();
            block.push_str(GRAPHICS_ANCHOR);
            out = out.replacen(GRAPHICS_ANCHOR, &block, 1);
        }
        if !self.levels.is_empty() {
            let mut block: String = self.levels.iter().map(|l| format!("\n{l}")).collect();
            block.push_str(LEVEL_ANCHOR);
            out = out.replacen(LEVEL_ANCHOR, &block, 1);
        }
        for id in &self.ids {
            out = out.replacen(STAGE_LIST, &format!("{STAGE_LIST}{id},"), 1);
            out = out.replacen(DIFFICULTY_LIST, &format!("{DIFFICULTY_LIST}{DIFFICULTY_ITEM}"), 1);
        }
        Ok(out)
    }

    /// Exact inverse of [`insert`](Self::insert) on the text it produced.
    pub fn remove(&self, levels_xml: &str) -> String {
        let mut out = levels_xml.to_string();
        for graphic in &self.graphics {
            out = out.replace(&format!("\n\n{graphic}"), "");
        }
        for level in &self.levels {
            out = out.replace(&format!("\n{level}"), "");
        }
        for id in &self.ids {
            out = remove_list_item(&out, STAGE_LIST, &format!("{id},"));
            out = remove_list_item(&out, DIFFICULTY_LIST, DIFFICULTY_ITEM);
        }
        out
    }
}

/// Remove the first whole `item` token from the quoted list following `opener`.
fn remove_list_item(text: &str, opener: &str, item: &str) -> String {
    let Some(start) = text.find(opener).map(|i| i + opener.len()) else {
        return text.to_string();
    };
    let end = text[start..].find('"').map_or(text.len(), |i| start + i);
    let list = &text[start..end];

    let position = list
        .match_indices(item)
        .map(|(i, _)| i)
        .find(|&i| i == 0 || list.as_bytes()[i - 1] == b',');
    match position {
        Some(i) => {
            let at = start + i;
            format!("{}{}", &text[..at], &text[at + item.len()..])
        }
        None => text.to_string(),
    }
}

/// A mod's `levels/map.txt` spliced into the profile `levels.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelFragments;

impl Projector for LevelFragments {
    fn name(&self) -> &'static str {
        "zuma-level-fragments"
    }

    fn project(&self, dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()> {
        if !handle.tree.exists(MAP_FRAGMENTS, EntryKind::File) {
            return Ok(());
        }
        let fragments = MapFragments::parse(&read_required(&handle.path.join(MAP_FRAGMENTS))?);
        if fragments.is_empty() {
            tracing::debug!("{} of '{}' has no fragments", MAP_FRAGMENTS, handle.name);
            return Ok(());
        }

        let path = dirs.profile_dir.join(PROFILE_LEVELS);
        let current = read_required(&path)?;
        let updated = match state {
            ModState::Active => fragments.insert(&current, &path)?,
            ModState::Inactive if fragments.is_spliced(&current) => fragments.remove(&current),
            ModState::Inactive => current.clone(),
        };
        if updated != current {
            write_atomic(&path, updated.as_bytes())?;
            tracing::info!(
                "{} {} graphics, {} levels from '{}'",
                if state.is_active() { "Spliced" } else { "Removed" },
                fragments.graphics.len(),
                fragments.levels.len(),
                handle.name
            );
        }
        Ok(())
    }
}
