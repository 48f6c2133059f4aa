//! In-memory view of a staged mod archive
//!
//! A [`ModTree`] is the mutable directory tree the installer hands to the
//! layout validator and fixer. Names keep their original casing, but every
//! lookup and suffix comparison is ASCII case-insensitive, matching how the
//! games themselves resolve paths on Windows.
//!
//! Paths are relative to the tree root and use `/` (a `\` is accepted too).
//! The empty path designates the root directory.

pub mod disk;

use std::path::{Path, PathBuf};

/// What kind of entry a lookup should accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Any,
}

/// How a moved entry combines with a same-named entry at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePolicy {
    /// Directories merge recursively, colliding files are replaced
    Merge,
    /// The existing entry is replaced wholesale
    Replace,
}

/// A file leaf. `source` is the on-disk file it was staged from, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    source: Option<PathBuf>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    pub fn with_source(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Extension without the dot, as written (empty if there is none)
    pub fn suffix(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        }
    }

    pub fn has_suffix(&self, ext: &str) -> bool {
        self.suffix().eq_ignore_ascii_case(ext)
    }
}

/// A directory node with ordered, uniquely named children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirEntry {
    name: String,
    children: Vec<Entry>,
}

/// The root of a staged archive. Its name is empty when the archive had no
/// single enclosing folder.
pub type ModTree = DirEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileEntry),
    Dir(DirEntry),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::File(f) => &f.name,
            Entry::Dir(d) => &d.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Entry::File(f) => f.name = name,
            Entry::Dir(d) => d.name = name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Entry::Dir(_))
    }

    pub fn as_dir(&self) -> Option<&DirEntry> {
        match self {
            Entry::Dir(d) => Some(d),
            Entry::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut DirEntry> {
        match self {
            Entry::Dir(d) => Some(d),
            Entry::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Entry::File(f) => Some(f),
            Entry::Dir(_) => None,
        }
    }

    /// Directories never have a suffix
    pub fn has_suffix(&self, ext: &str) -> bool {
        self.as_file().is_some_and(|f| f.has_suffix(ext))
    }

    fn matches(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Any => true,
            EntryKind::File => self.is_file(),
            EntryKind::Directory => self.is_dir(),
        }
    }
}

impl From<FileEntry> for Entry {
    fn from(f: FileEntry) -> Self {
        Entry::File(f)
    }
}

impl From<DirEntry> for Entry {
    fn from(d: DirEntry) -> Self {
        Entry::Dir(d)
    }
}

/// Split a tree path into its non-empty components.
pub fn components(path: &str) -> Vec<&str> {
    path.split(|c| c == '/' || c == '\\')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Join two tree paths with a single `/`.
pub fn join(base: &str, name: &str) -> String {
    let mut parts = components(base);
    parts.extend(components(name));
    parts.join("/")
}

impl DirEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Build a tree from relative paths. A trailing `/` denotes an empty directory.
    ///
    /// Mostly useful for tests and for trees that never touched the disk.
    pub fn from_paths(name: impl Into<String>, paths: &[&str]) -> Self {
        let mut tree = Self::new(name);
        for path in paths {
            if path.ends_with('/') || path.ends_with('\\') {
                tree.ensure_dir(path);
            } else {
                tree.add_file(path, None);
            }
        }
        tree
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[Entry] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Entry> {
        self.children.get(index)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Direct child by name
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.position(name).map(|i| &self.children[i])
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        let i = self.position(name)?;
        Some(&mut self.children[i])
    }

    /// Entry at a non-empty relative path
    pub fn find(&self, path: &str) -> Option<&Entry> {
        let parts = components(path);
        let (last, parents) = parts.split_last()?;
        let mut dir = self;
        for part in parents {
            dir = dir.get(part)?.as_dir()?;
        }
        dir.get(last)
    }

    /// Directory at a relative path; the empty path is `self`
    pub fn find_dir(&self, path: &str) -> Option<&DirEntry> {
        let mut dir = self;
        for part in components(path) {
            dir = dir.get(part)?.as_dir()?;
        }
        Some(dir)
    }

    pub fn find_dir_mut(&mut self, path: &str) -> Option<&mut DirEntry> {
        let mut dir = self;
        for part in components(path) {
            dir = dir.get_mut(part)?.as_dir_mut()?;
        }
        Some(dir)
    }

    pub fn exists(&self, path: &str, kind: EntryKind) -> bool {
        if components(path).is_empty() {
            return kind != EntryKind::File;
        }
        self.find(path).is_some_and(|e| e.matches(kind))
    }

    /// Walk down `path`, creating missing directories. Returns `None` when a
    /// file sits where a directory is needed.
    pub fn ensure_dir(&mut self, path: &str) -> Option<&mut DirEntry> {
        let mut dir = self;
        for part in components(path) {
            let index = match dir.position(part) {
                Some(i) => i,
                None => {
                    dir.children.push(Entry::Dir(DirEntry::new(part)));
                    dir.children.len() - 1
                }
            };
            dir = dir.children[index].as_dir_mut()?;
        }
        Some(dir)
    }

    /// Add a file at `path`, creating parent directories. Returns false if
    /// the parent chain is blocked by a file.
    pub fn add_file(&mut self, path: &str, source: Option<PathBuf>) -> bool {
        let parts = components(path);
        let Some((name, parents)) = parts.split_last() else {
            return false;
        };
        let Some(dir) = self.ensure_dir(&parents.join("/")) else {
            return false;
        };
        let file = FileEntry {
            name: (*name).to_string(),
            source,
        };
        dir.adopt(Entry::File(file), MovePolicy::Replace);
        true
    }

    /// Place `entry` inside this directory, resolving name collisions per `policy`.
    pub fn adopt(&mut self, entry: Entry, policy: MovePolicy) {
        let Some(index) = self.position(entry.name()) else {
            self.children.push(entry);
            return;
        };
        match (policy, &mut self.children[index], entry) {
            (MovePolicy::Merge, Entry::Dir(existing), Entry::Dir(incoming)) => {
                for child in incoming.children {
                    existing.adopt(child, MovePolicy::Merge);
                }
            }
            (_, slot, incoming) => *slot = incoming,
        }
    }

    /// Insert `entry` inside the directory at `dir_path` (created as needed).
    /// On failure the entry is handed back.
    pub fn insert(&mut self, dir_path: &str, entry: Entry, policy: MovePolicy) -> Result<(), Entry> {
        match self.ensure_dir(dir_path) {
            Some(dir) => {
                dir.adopt(entry, policy);
                Ok(())
            }
            None => Err(entry),
        }
    }

    /// Detach the entry at `path`
    pub fn take(&mut self, path: &str) -> Option<Entry> {
        let parts = components(path);
        let (last, parents) = parts.split_last()?;
        let dir = self.find_dir_mut(&parents.join("/"))?;
        let index = dir.position(last)?;
        Some(dir.children.remove(index))
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.take(path).is_some()
    }

    /// Detach every child of this directory, in order
    pub fn take_children(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.children)
    }

    /// Move the entry at `from` into the directory `to_dir`, keeping its name.
    ///
    /// Returns false and leaves the tree untouched if `from` does not exist or
    /// the destination is blocked by a file.
    pub fn move_entry(&mut self, from: &str, to_dir: &str, policy: MovePolicy) -> bool {
        let parts = components(from);
        let Some((_, parents)) = parts.split_last() else {
            return false;
        };
        let parent = parents.join("/");
        let Some(entry) = self.take(from) else {
            return false;
        };
        match self.insert(to_dir, entry, policy) {
            Ok(()) => true,
            Err(entry) => {
                // Parent still exists: the failed insert created nothing above a file.
                if let Some(dir) = self.find_dir_mut(&parent) {
                    dir.adopt(entry, MovePolicy::Merge);
                }
                false
            }
        }
    }

    /// Rename the entry at `path`. Fails if a sibling already uses `new_name`.
    pub fn rename(&mut self, path: &str, new_name: &str) -> bool {
        let parts = components(path);
        let Some((last, parents)) = parts.split_last() else {
            return false;
        };
        let Some(dir) = self.find_dir_mut(&parents.join("/")) else {
            return false;
        };
        let Some(index) = dir.position(last) else {
            return false;
        };
        if let Some(other) = dir.position(new_name) {
            if other != index {
                return false;
            }
        }
        dir.children[index].set_name(new_name.to_string());
        true
    }

    /// Move every child into `to_dir`. Returns how many entries moved.
    ///
    /// A child directory that is the destination's own top component (a root
    /// `mods` folder when relocating into `mods/FOLDERNAME`) stays put, so
    /// whatever it already holds is kept alongside the relocated payload.
    pub fn relocate_all(&mut self, to_dir: &str, policy: MovePolicy) -> usize {
        let container = components(to_dir).first().map(|c| c.to_string());
        let (stay, moving): (Vec<Entry>, Vec<Entry>) =
            self.take_children().into_iter().partition(|e| {
                e.is_dir()
                    && container
                        .as_deref()
                        .is_some_and(|c| e.name().eq_ignore_ascii_case(c))
            });
        self.children = stay;

        let count = moving.len();
        for entry in moving {
            if let Err(entry) = self.insert(to_dir, entry, policy) {
                self.adopt(entry, MovePolicy::Merge);
            }
        }
        count
    }

    /// Pre-order traversal; the callback receives each entry's path.
    pub fn walk<F: FnMut(&str, &Entry)>(&self, mut f: F) {
        fn visit<F: FnMut(&str, &Entry)>(dir: &DirEntry, prefix: &str, f: &mut F) {
            for child in &dir.children {
                let path = join(prefix, child.name());
                f(&path, child);
                if let Entry::Dir(d) = child {
                    visit(d, &path, f);
                }
            }
        }
        visit(self, "", &mut f);
    }

    /// Every file with its path
    pub fn files(&self) -> Vec<(String, &FileEntry)> {
        fn collect<'a>(dir: &'a DirEntry, prefix: &str, out: &mut Vec<(String, &'a FileEntry)>) {
            for child in &dir.children {
                let path = join(prefix, child.name());
                match child {
                    Entry::File(f) => out.push((path, f)),
                    Entry::Dir(d) => collect(d, &path, out),
                }
            }
        }
        let mut out = Vec::new();
        collect(self, "", &mut out);
        out
    }

    /// Paths of every file, sorted. Handy for assertions and logging.
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files().into_iter().map(|(p, _)| p).collect();
        paths.sort();
        paths
    }

    /// Remove directories that are (or become) childless. The root itself is kept.
    pub fn prune_empty_dirs(&mut self) -> usize {
        let mut removed = 0;
        for child in &mut self.children {
            if let Entry::Dir(d) = child {
                removed += d.prune_empty_dirs();
            }
        }
        let before = self.children.len();
        self.children
            .retain(|c| !matches!(c, Entry::Dir(d) if d.children.is_empty()));
        removed + (before - self.children.len())
    }
}
