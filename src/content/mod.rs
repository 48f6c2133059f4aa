//! Content classification for display
//!
//! Maps file extensions to coarse categories so a mod list can show what a
//! mod contains. Advisory only: nothing in layout validation or fixing looks
//! at the result.

use crate::tree::{Entry, ModTree};
use std::collections::BTreeSet;

/// Coarse content tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentCategory {
    Texture,
    Mesh,
    Model,
    Material,
    Script,
    Sound,
    Audio,
    String,
    Config,
    Video,
    Ucas,
    Utoc,
    Pak,
    Ue4ss,
    Dll,
    Starpak,
}

/// How a category is presented by one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentDef {
    pub category: ContentCategory,
    pub name: &'static str,
    pub icon: &'static str,
}

/// Per-game classification table
#[derive(Debug, Clone, Copy)]
pub struct ContentTable {
    pub categories: &'static [ContentDef],
    /// `(extension, category)`; extensions compare case-insensitively
    pub extensions: &'static [(&'static str, ContentCategory)],
}

impl ContentTable {
    pub fn category_for(&self, ext: &str) -> Option<ContentCategory> {
        self.extensions
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, c)| *c)
    }

    pub fn def(&self, category: ContentCategory) -> Option<&ContentDef> {
        self.categories.iter().find(|d| d.category == category)
    }

    /// Every file is visited once; the set is built fresh per call.
    pub fn classify(&self, tree: &ModTree) -> BTreeSet<ContentCategory> {
        let mut found = BTreeSet::new();
        tree.walk(|_, entry| {
            if let Entry::File(file) = entry {
                if let Some(category) = self.category_for(file.suffix()) {
                    found.insert(category);
                }
            }
        });
        found
    }
}

const TEXTURE_ICON: &str = ":/MO/gui/content/texture";
const MESH_ICON: &str = ":/MO/gui/content/mesh";
const SCRIPT_ICON: &str = ":/MO/gui/content/script";
const SOUND_ICON: &str = ":/MO/gui/content/sound";
const INI_ICON: &str = ":/MO/gui/content/inifile";

/// Diesel engine games: Payday 2, Payday: The Heist, RAID, and Zuma's table too
pub const DIESEL_CONTENT: ContentTable = ContentTable {
    categories: &[
        ContentDef { category: ContentCategory::Texture, name: "Textures", icon: TEXTURE_ICON },
        ContentDef { category: ContentCategory::Mesh, name: "Meshes", icon: MESH_ICON },
        ContentDef { category: ContentCategory::Script, name: "Scripts", icon: SCRIPT_ICON },
        ContentDef { category: ContentCategory::Sound, name: "Sounds", icon: SOUND_ICON },
        ContentDef { category: ContentCategory::String, name: "Strings", icon: ":/MO/gui/content/string" },
        ContentDef { category: ContentCategory::Config, name: "Configs", icon: INI_ICON },
    ],
    extensions: &[
        ("texture", ContentCategory::Texture),
        ("model", ContentCategory::Mesh),
        ("lua", ContentCategory::Script),
        ("stream", ContentCategory::Sound),
        ("txt", ContentCategory::String),
        ("json", ContentCategory::Config),
    ],
};

pub const CRIMEBOSS_CONTENT: ContentTable = ContentTable {
    categories: &[
        ContentDef { category: ContentCategory::Ucas, name: "UCAS", icon: ":/MO/gui/content/geometries" },
        ContentDef { category: ContentCategory::Utoc, name: "UTOC", icon: INI_ICON },
        ContentDef { category: ContentCategory::Pak, name: "PAK", icon: ":/MO/gui/content/geometries" },
        ContentDef { category: ContentCategory::Ue4ss, name: "UE4SS", icon: SCRIPT_ICON },
        ContentDef { category: ContentCategory::Dll, name: "DLL", icon: ":/MO/gui/content/skse" },
        ContentDef { category: ContentCategory::Video, name: "Video", icon: ":/MO/gui/content/skse" },
    ],
    extensions: &[
        ("ucas", ContentCategory::Ucas),
        ("utoc", ContentCategory::Utoc),
        ("pak", ContentCategory::Pak),
        ("lua", ContentCategory::Ue4ss),
        ("dll", ContentCategory::Dll),
        ("bk2", ContentCategory::Video),
    ],
};

pub const TITANFALL_CONTENT: ContentTable = ContentTable {
    categories: &[
        ContentDef { category: ContentCategory::Material, name: "Materials", icon: ":/MO/gui/content/interface" },
        ContentDef { category: ContentCategory::Texture, name: "Textures", icon: TEXTURE_ICON },
        ContentDef { category: ContentCategory::Model, name: "Models", icon: MESH_ICON },
        ContentDef { category: ContentCategory::Script, name: "Scripts", icon: SCRIPT_ICON },
        ContentDef { category: ContentCategory::Config, name: "Configs", icon: INI_ICON },
        ContentDef { category: ContentCategory::Video, name: "Video", icon: ":/MO/gui/content/modgroup" },
        ContentDef { category: ContentCategory::Audio, name: "Audio", icon: SOUND_ICON },
        ContentDef { category: ContentCategory::Starpak, name: "Starpak", icon: ":/MO/gui/content/bsa" },
    ],
    extensions: &[
        ("vmt", ContentCategory::Material),
        ("vtf", ContentCategory::Texture),
        ("mdl", ContentCategory::Model),
        ("nut", ContentCategory::Script),
        ("txt", ContentCategory::Config),
        ("bik", ContentCategory::Video),
        ("wav", ContentCategory::Audio),
        ("rpak", ContentCategory::Starpak),
        ("starmap", ContentCategory::Starpak),
        ("starpak", ContentCategory::Starpak),
    ],
};
