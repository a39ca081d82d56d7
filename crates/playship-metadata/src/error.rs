//! Error types for metadata resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving a metadata tree.
///
/// Missing optional files never produce an error; only structural problems
/// and unreadable required files do.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata root does not exist.
    #[error("Metadata root not found: {0}")]
    RootNotFound(PathBuf),

    /// A path expected to be a directory is something else.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Listing a directory failed.
    #[error("Failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a file that must be readable failed.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
