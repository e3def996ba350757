//! Centralized error types for emltext.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the emltext library.
#[derive(Error, Debug)]
pub enum EmlError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified input file does not exist.
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file could not be parsed as an RFC 5322 / MIME message.
    #[error("Not a parseable mail message: {0}")]
    Malformed(PathBuf),

    /// The output directory could not be created.
    #[error("Invalid output directory '{path}': {source}")]
    InvalidOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, EmlError>`.
pub type Result<T> = std::result::Result<T, EmlError>;

impl EmlError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
