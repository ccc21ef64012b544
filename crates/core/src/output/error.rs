//! Error types for the output module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a label.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to create the output directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the temporary file.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move the temporary file into place.
    #[error("Failed to move {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to check whether a label already exists.
    #[error("Failed to inspect {path}")]
    InspectFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
