//! Library error type
//!
//! An unrecognized archive layout is not an error (see [`crate::layout::FixOutcome`]).
//! These variants cover the faults that can happen while touching files on disk:
//! projecting mod state into external configs and renaming placeholder folders.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} has no usable '{field}' field", .file.display())]
    MissingManifestField { file: PathBuf, field: String },

    #[error("required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("malformed config {}: {reason}", .path.display())]
    MalformedConfig { path: PathBuf, reason: String },

    #[error("unknown game id '{0}'")]
    UnknownGame(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach the offending path to an `io::Error`.
pub(crate) trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Read a file, mapping "not found" to [`Error::MissingFile`].
pub(crate) fn read_required(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::MissingFile(path.to_path_buf()))
        }
        Err(source) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
