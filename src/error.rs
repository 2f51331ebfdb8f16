//! Error types for artifact access.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for artifact operations.
pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Why an artifact could not be read or written.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact does not exist
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    /// The artifact exists but could not be read
    #[error("Artifact unreadable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact was read but its contents do not parse
    #[error("Artifact malformed: {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact could not be written
    #[error("Artifact unwritable: {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ArtifactError::NotFound(path) => path,
            ArtifactError::Unreadable { path, .. }
            | ArtifactError::Malformed { path, .. }
            | ArtifactError::Unwritable { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtifactError::NotFound(_))
    }

    pub(crate) fn from_read(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound(path)
        } else {
            ArtifactError::Unreadable { path, source }
        }
    }
}
