//! Strategy catalogue shared by every game's fixer cascade
//!
//! Each strategy is a small configurable struct. Games compose them in
//! priority order (see `games`). All "one-down" checks look only at the
//! direct children of top-level directories.

use super::{Attempt, Strategy, Target};
use crate::tree::{self, DirEntry, Entry, EntryKind, ModTree, MovePolicy};

fn dir_has(dir: &DirEntry, marker: &str, sibling: Option<&str>) -> bool {
    dir.get(marker).is_some() && sibling.map_or(true, |s| dir.get(s).is_some())
}

/// Names of the top-level directories carrying `marker` (and `sibling`)
fn marked_dirs(tree: &ModTree, marker: &str, sibling: Option<&str>) -> Vec<String> {
    tree.children()
        .iter()
        .filter_map(|e| e.as_dir())
        .filter(|d| dir_has(d, marker, sibling))
        .map(|d| d.name().to_string())
        .collect()
}

fn relocated(moved: usize, target: Option<&Target>) -> Attempt {
    if moved == 0 {
        Attempt::NoOp
    } else {
        Attempt::Relocated(target.and_then(Target::pending))
    }
}

/// A marker entry at the root: everything at the root moves to `target`.
#[derive(Debug, Clone, Copy)]
pub struct MarkerAtRoot {
    pub marker: &'static str,
    pub kind: EntryKind,
    /// Root directory that must accompany the marker
    pub requires: Option<&'static str>,
    pub target: Target,
}

impl Strategy for MarkerAtRoot {
    fn name(&self) -> &'static str {
        "marker-at-root"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        if !tree.exists(self.marker, self.kind) {
            return Attempt::NoOp;
        }
        if let Some(dir) = self.requires {
            if !tree.exists(dir, EntryKind::Directory) {
                return Attempt::NoOp;
            }
        }
        let moved = tree.relocate_all(&self.target.path(), MovePolicy::Merge);
        relocated(moved, Some(&self.target))
    }
}

/// The marker sits inside exactly one top-level directory: that directory
/// moves under `dest`, keeping its name.
#[derive(Debug, Clone, Copy)]
pub struct MarkerOneDown {
    pub marker: &'static str,
    pub sibling: Option<&'static str>,
    pub dest: &'static str,
}

impl Strategy for MarkerOneDown {
    fn name(&self) -> &'static str {
        "marker-one-down"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        let marked = marked_dirs(tree, self.marker, self.sibling);
        let [dir] = marked.as_slice() else {
            if marked.len() > 1 {
                tracing::debug!("{} found in {} folders, ambiguous", self.marker, marked.len());
            }
            return Attempt::NoOp;
        };
        relocated(tree.move_entry(dir, self.dest, MovePolicy::Merge) as usize, None)
    }
}

/// A double-wrapped archive (`Outer/Inner/<marker>`): the inner folder
/// replaces its wrapper, then moves under `dest` as in [`MarkerOneDown`].
#[derive(Debug, Clone, Copy)]
pub struct MarkerTwoDown {
    pub marker: &'static str,
    pub sibling: Option<&'static str>,
    pub dest: &'static str,
}

impl Strategy for MarkerTwoDown {
    fn name(&self) -> &'static str {
        "marker-two-down"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        if tree.len() != 1 {
            return Attempt::NoOp;
        }
        let Some(outer) = tree.child(0).and_then(|e| e.as_dir()) else {
            return Attempt::NoOp;
        };
        if outer.len() != 1 {
            return Attempt::NoOp;
        }
        let Some(inner) = outer.child(0).and_then(|e| e.as_dir()) else {
            return Attempt::NoOp;
        };
        if !dir_has(inner, self.marker, self.sibling) {
            return Attempt::NoOp;
        }

        let outer_name = outer.name().to_string();
        let inner_path = tree::join(&outer_name, inner.name());
        let Some(mut inner) = tree.take(&inner_path) else {
            return Attempt::NoOp;
        };
        tree.remove(&outer_name);
        inner.set_name(outer_name);
        if let Err(inner) = tree.insert(self.dest, inner, MovePolicy::Merge) {
            tree.adopt(inner, MovePolicy::Merge);
        }
        Attempt::Relocated(None)
    }
}

/// Root files routed into per-extension directories
#[derive(Debug, Clone, Copy)]
pub struct TypeScatter {
    /// `(extension, destination directory)`
    pub routes: &'static [(&'static str, &'static str)],
}

impl Strategy for TypeScatter {
    fn name(&self) -> &'static str {
        "type-scatter"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        let moves: Vec<(String, &'static str)> = tree
            .children()
            .iter()
            .filter(|e| e.is_file())
            .filter_map(|e| {
                self.routes
                    .iter()
                    .find(|(ext, _)| e.has_suffix(ext))
                    .map(|(_, dest)| (e.name().to_string(), *dest))
            })
            .collect();

        let moved = moves
            .iter()
            .filter(|(name, dest)| tree.move_entry(name, dest, MovePolicy::Merge))
            .count();
        relocated(moved, None)
    }
}

/// A lone top-level directory is the whole payload and moves under `dest`.
#[derive(Debug, Clone, Copy)]
pub struct SingleEntry {
    pub dest: &'static str,
}

impl Strategy for SingleEntry {
    fn name(&self) -> &'static str {
        "single-entry"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        if tree.len() != 1 {
            return Attempt::NoOp;
        }
        let Some(dir) = tree.child(0).and_then(|e| e.as_dir()) else {
            return Attempt::NoOp;
        };
        let name = dir.name().to_string();
        relocated(tree.move_entry(&name, self.dest, MovePolicy::Merge) as usize, None)
    }
}

/// Unconditional: every root entry moves to `target`.
#[derive(Debug, Clone, Copy)]
pub struct AllInto {
    pub target: Target,
}

impl Strategy for AllInto {
    fn name(&self) -> &'static str {
        "all-into"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        let moved = tree.relocate_all(&self.target.path(), MovePolicy::Merge);
        relocated(moved, Some(&self.target))
    }
}

/// A lone wrapper directory is dissolved and its contents move to `target`.
#[derive(Debug, Clone, Copy)]
pub struct UnwrapSingle {
    pub target: Target,
}

impl Strategy for UnwrapSingle {
    fn name(&self) -> &'static str {
        "unwrap-single"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        if tree.len() != 1 {
            return Attempt::NoOp;
        }
        let name = match tree.child(0) {
            Some(Entry::Dir(wrapper)) if !wrapper.is_empty() => wrapper.name().to_string(),
            _ => return Attempt::NoOp,
        };
        let Some(Entry::Dir(mut wrapper)) = tree.take(&name) else {
            return Attempt::NoOp;
        };
        for child in wrapper.take_children() {
            tree.adopt(child, MovePolicy::Merge);
        }
        let moved = tree.relocate_all(&self.target.path(), MovePolicy::Merge);
        relocated(moved, Some(&self.target))
    }
}

/// Files with one extension, at the root or (optionally) one level down,
/// gathered into `dest`.
#[derive(Debug, Clone, Copy)]
pub struct CollectByExtension {
    pub ext: &'static str,
    pub dest: &'static str,
    pub one_down: bool,
}

impl Strategy for CollectByExtension {
    fn name(&self) -> &'static str {
        "collect-by-extension"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        let dest_is_root = tree::components(self.dest).is_empty();
        let mut paths = Vec::new();
        for entry in tree.children() {
            match entry {
                Entry::File(f) if f.has_suffix(self.ext) && !dest_is_root => {
                    paths.push(f.name().to_string());
                }
                Entry::Dir(d) if self.one_down => {
                    paths.extend(
                        d.children()
                            .iter()
                            .filter(|e| e.has_suffix(self.ext))
                            .map(|e| tree::join(d.name(), e.name())),
                    );
                }
                _ => {}
            }
        }

        let moved = paths
            .iter()
            .filter(|path| tree.move_entry(path, self.dest, MovePolicy::Merge))
            .count();
        relocated(moved, None)
    }
}

/// Wrapper folders around recognized content folders: when any top-level
/// directory holds one of `known`, the children of every top-level directory
/// are lifted to the root.
#[derive(Debug, Clone, Copy)]
pub struct HoistChildren {
    pub known: &'static [&'static str],
}

impl Strategy for HoistChildren {
    fn name(&self) -> &'static str {
        "hoist-children"
    }

    fn attempt(&self, tree: &mut ModTree) -> Attempt {
        let wrappers: Vec<String> = tree
            .children()
            .iter()
            .filter_map(|e| e.as_dir())
            .map(|d| d.name().to_string())
            .collect();
        let applies = wrappers.iter().any(|name| {
            tree.find_dir(name)
                .is_some_and(|d| self.known.iter().any(|k| d.get(k).is_some()))
        });
        if !applies {
            return Attempt::NoOp;
        }

        let mut moved = 0;
        for name in &wrappers {
            let Some(dir) = tree.find_dir_mut(name) else {
                continue;
            };
            let children = dir.take_children();
            moved += children.len();
            for child in children {
                tree.adopt(child, MovePolicy::Merge);
            }
        }
        relocated(moved, None)
    }
}
