//! Layout validation: does a staged tree already match the game's convention?

use crate::tree::{EntryKind, ModTree};

/// Validator verdict. Total over every tree; there is no error case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckReturn {
    Valid,
    Fixable,
}

/// One way a tree can prove it is already laid out correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidMarker {
    /// A directory at this path
    Dir(&'static str),
    /// A directory at `dir`, unless a root file named `unless` is also present
    DirWithout {
        dir: &'static str,
        unless: &'static str,
    },
    /// A file with this exact name at the root
    RootFile(&'static str),
    /// Any root file with this extension
    RootExtension(&'static str),
    /// Exactly one top-level entry (archive-format games)
    SingleEntry,
}

impl ValidMarker {
    pub fn matches(&self, tree: &ModTree) -> bool {
        match *self {
            ValidMarker::Dir(path) => tree.exists(path, EntryKind::Directory),
            ValidMarker::DirWithout { dir, unless } => {
                tree.exists(dir, EntryKind::Directory) && !tree.exists(unless, EntryKind::File)
            }
            ValidMarker::RootFile(name) => tree.exists(name, EntryKind::File),
            ValidMarker::RootExtension(ext) => tree.children().iter().any(|e| e.has_suffix(ext)),
            ValidMarker::SingleEntry => tree.len() == 1,
        }
    }
}

/// The set of markers a game's mod loader recognizes
#[derive(Debug, Clone, Copy)]
pub struct LayoutRule {
    pub markers: &'static [ValidMarker],
}

impl LayoutRule {
    pub const fn new(markers: &'static [ValidMarker]) -> Self {
        Self { markers }
    }

    /// VALID when any marker matches. An empty tree is always FIXABLE.
    pub fn check(&self, tree: &ModTree) -> CheckReturn {
        if tree.is_empty() {
            return CheckReturn::Fixable;
        }
        match self.markers.iter().find(|m| m.matches(tree)) {
            Some(marker) => {
                tracing::debug!("Layout valid via {:?}", marker);
                CheckReturn::Valid
            }
            None => CheckReturn::Fixable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: LayoutRule = LayoutRule::new(&[
        ValidMarker::Dir("Content/Paks/~Mods"),
        ValidMarker::DirWithout {
            dir: "Mods",
            unless: "UE4SS.dll",
        },
        ValidMarker::RootExtension("pck"),
    ]);

    #[test]
    fn test_empty_tree_is_fixable() {
        assert_eq!(RULE.check(&ModTree::new("")), CheckReturn::Fixable);
        let single = LayoutRule::new(&[ValidMarker::SingleEntry]);
        assert_eq!(single.check(&ModTree::new("")), CheckReturn::Fixable);
    }

    #[test]
    fn test_nested_dir_marker() {
        let tree = ModTree::from_paths("", &["content/paks/~mods/a.pak"]);
        assert_eq!(RULE.check(&tree), CheckReturn::Valid);
    }

    #[test]
    fn test_dir_without_file() {
        let plain = ModTree::from_paths("", &["Mods/thing/main.lua"]);
        assert_eq!(RULE.check(&plain), CheckReturn::Valid);

        let loader = ModTree::from_paths("", &["Mods/thing/main.lua", "UE4SS.dll"]);
        assert_eq!(RULE.check(&loader), CheckReturn::Fixable);
    }

    #[test]
    fn test_extension_only_counts_at_root() {
        let root = ModTree::from_paths("", &["Mod.PCK"]);
        assert_eq!(RULE.check(&root), CheckReturn::Valid);

        let nested = ModTree::from_paths("", &["wrapper/mod.pck"]);
        assert_eq!(RULE.check(&nested), CheckReturn::Fixable);
    }
}
