//! modshape - per-game mod layout fixing and load-state projection
//!
//! This crate provides the game-support side of a mod manager:
//! - Layout validation and a per-game cascade of layout fixers
//! - Deferred renaming of placeholder folders once a mod is installed
//! - Content classification by file extension
//! - Projection of enable/disable events into loader files outside the mods
//! - A small CLI that stages archives and drives all of the above

pub mod app;
pub mod config;
pub mod content;
pub mod error;
pub mod games;
pub mod host;
pub mod layout;
pub mod mods;
pub mod projectors;
pub mod rename;
pub mod tree;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
