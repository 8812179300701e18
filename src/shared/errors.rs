use std::path::PathBuf;
use thiserror::Error;

/// Filesystem errors shared by the gallery, screenshots and thumbnails.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create directory {path:?}: {reason}")]
    DirectoryError { path: PathBuf, reason: String },

    #[error("Failed to encode image: {0}")]
    ImageError(String),
}

impl StorageError {
    pub fn directory(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StorageError::DirectoryError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn image(msg: impl Into<String>) -> Self {
        StorageError::ImageError(msg.into())
    }
}
