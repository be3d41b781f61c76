use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for relabel operations.
#[derive(Debug, Error)]
pub enum RelabelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{message}: {}", path.display())]
    NotFound { path: PathBuf, message: String },

    #[error("Permission denied to access directory '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read class list {}: {source}", path.display())]
    ClassListRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse class list YAML from {}: {source}", path.display())]
    ClassListYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Output directory {} is the label directory itself", path.display())]
    OutputOverlapsInput { path: PathBuf },

    #[error("Output directory {} is the backup directory", path.display())]
    OutputOverlapsBackup { path: PathBuf },

    #[error("Invalid rename parameters: {message}")]
    InvalidRenameParams { message: String },

    #[error("Missing {field}")]
    SessionIncomplete { field: &'static str },

    #[error("A remap run is already in progress")]
    RemapInProgress,

    #[error("Remap worker panicked")]
    WorkerPanicked,
}

impl RelabelError {
    /// Classify an I/O failure on a top-level directory.
    pub(crate) fn from_dir_access(path: &Path, what: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => RelabelError::NotFound {
                path: path.to_path_buf(),
                message: format!("{what} not found"),
            },
            io::ErrorKind::PermissionDenied => RelabelError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => RelabelError::Io(err),
        }
    }

    /// Returns true for the errors that abort a run at the top-level directory.
    pub fn is_directory_access(&self) -> bool {
        matches!(
            self,
            RelabelError::NotFound { .. } | RelabelError::PermissionDenied { .. }
        )
    }
}
