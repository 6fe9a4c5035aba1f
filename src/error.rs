//! Error types for Orexin

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the persistence layer
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Cannot determine the home directory for this user")]
    NoHomeDirectory,

    #[error("Cannot create data directory '{}': {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write to data directory '{}': {source}", path.display())]
    WritePermission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading existing data from '{}': {source}", path.display())]
    ExistingDataCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize session record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session record must serialize to a JSON object")]
    NotAnObject,

    #[error("Error saving data to '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DataError {
    /// True for the failures that must block entry to the test menu.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            DataError::NoHomeDirectory
                | DataError::DirectoryCreation { .. }
                | DataError::WritePermission { .. }
        )
    }
}

/// Errors that abort a running frame loop
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Frontend failure: {0}")]
    Frontend(#[from] std::io::Error),
}
