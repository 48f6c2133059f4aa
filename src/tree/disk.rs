//! Bridging a [`ModTree`] and a directory on disk

use super::{Entry, ModTree};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// How staged files reach their final location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Move,
    Copy,
}

/// Build a tree mirroring `root`. Each file node records its absolute source path.
pub fn load(root: &Path, name: &str) -> Result<ModTree> {
    let mut tree = ModTree::new(name);

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .context("Walked outside of the staging root")?;
        let relative = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            tree.ensure_dir(&relative);
        } else if !tree.add_file(&relative, Some(entry.path().to_path_buf())) {
            tracing::warn!("Skipping {}: parent is a file", relative);
        }
    }

    tracing::debug!("Loaded {} files from {}", tree.files().len(), root.display());
    Ok(tree)
}

/// Write `tree` under `dest`, pulling each file from its recorded source.
///
/// Files with no source (synthesized nodes) are created empty. Returns the
/// number of files written.
pub fn materialize(tree: &ModTree, dest: &Path, transfer: Transfer) -> Result<usize> {
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut written = 0;
    let mut failure = None;
    tree.walk(|relative, entry| {
        if failure.is_some() {
            return;
        }
        let target = dest.join(relative);
        let result = match entry {
            Entry::Dir(_) => fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display())),
            Entry::File(file) => {
                written += 1;
                match file.source() {
                    Some(source) => transfer_file(source, &target, transfer),
                    None => fs::write(&target, b"")
                        .with_context(|| format!("Failed to create {}", target.display())),
                }
            }
        };
        if let Err(e) = result {
            failure = Some(e);
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(written),
    }
}

fn transfer_file(source: &Path, target: &Path, transfer: Transfer) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    if transfer == Transfer::Move && fs::rename(source, target).is_ok() {
        return Ok(());
    }
    // Rename fails across filesystems; fall back to a copy.
    fs::copy(source, target).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), target.display())
    })?;
    if transfer == Transfer::Move {
        fs::remove_file(source)
            .with_context(|| format!("Failed to remove staged file {}", source.display()))?;
    }
    Ok(())
}
