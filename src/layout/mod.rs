//! Archive layout validation and repair
//!
//! [`LayoutRule`] decides whether a staged tree already matches what a
//! game's mod loader expects. When it does not, a [`Fixer`] runs an ordered
//! cascade of [`Strategy`] objects against the tree and stops at the first one
//! that relocates anything. Strategies that park content under [`PLACEHOLDER`]
//! return a [`PendingRename`] for the install callback to resolve.

pub mod strategies;
mod validate;

pub use strategies::*;
pub use validate::{CheckReturn, LayoutRule, ValidMarker};

use crate::rename::{NameSource, PendingRename};
use crate::tree::{self, ModTree};
use std::fmt;

/// Stand-in folder name used until the real mod name is known
pub const PLACEHOLDER: &str = "FOLDERNAME";

/// Where a strategy puts what it relocates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Straight into this directory
    Into(&'static str),
    /// Into `<root>/FOLDERNAME`, renamed after install
    Placeholder {
        root: &'static str,
        naming: NameSource,
    },
}

impl Target {
    pub const fn placeholder(root: &'static str) -> Self {
        Target::Placeholder {
            root,
            naming: NameSource::ModName,
        }
    }

    /// Tree path of the destination directory
    pub fn path(&self) -> String {
        match self {
            Target::Into(dir) => tree::join(dir, ""),
            Target::Placeholder { root, .. } => tree::join(root, PLACEHOLDER),
        }
    }

    pub fn pending(&self) -> Option<PendingRename> {
        match *self {
            Target::Into(_) => None,
            Target::Placeholder { naming, .. } => Some(PendingRename::new(self.path(), naming)),
        }
    }
}

/// Result of one strategy attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Preconditions not met; the tree was not touched
    NoOp,
    /// At least one entry moved
    Relocated(Option<PendingRename>),
}

/// One candidate repair in a game's cascade.
///
/// Implementations must leave the tree untouched when returning [`Attempt::NoOp`].
pub trait Strategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self, tree: &mut ModTree) -> Attempt;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Fixed {
        strategy: &'static str,
        pending: Option<PendingRename>,
    },
    /// No strategy applied; the host should reject the archive
    Unrecognized,
}

impl FixOutcome {
    pub fn is_fixed(&self) -> bool {
        matches!(self, FixOutcome::Fixed { .. })
    }
}

/// Ordered strategy cascade for one game
#[derive(Debug, Default)]
pub struct Fixer {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Fixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the cascade. Directories emptied by the winning strategy are pruned.
    pub fn fix(&self, tree: &mut ModTree) -> FixOutcome {
        for strategy in &self.strategies {
            match strategy.attempt(tree) {
                Attempt::NoOp => tracing::trace!("Strategy {} did not apply", strategy.name()),
                Attempt::Relocated(pending) => {
                    let pruned = tree.prune_empty_dirs();
                    tracing::info!(
                        "Layout fixed by {} ({} empty dirs pruned)",
                        strategy.name(),
                        pruned
                    );
                    if let Some(p) = &pending {
                        tracing::debug!("Placeholder {} awaits rename", p.placeholder);
                    }
                    return FixOutcome::Fixed {
                        strategy: strategy.name(),
                        pending,
                    };
                }
            }
        }
        tracing::info!("No strategy recognized the archive layout");
        FixOutcome::Unrecognized
    }
}
