use std::fmt::Display;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VocabError>;

#[derive(Debug, Error)]
pub enum VocabError {
    /// The store or cache medium is unreadable or corrupt. Never recovered
    /// from by resetting to an empty store.
    #[error("Storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Cannot read source file {}: {source}", path.display())]
    UnreadableSourceFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(anyhow::Error),
}

impl VocabError {
    pub(crate) fn storage(path: &Path, reason: impl Display) -> Self {
        Self::StorageUnavailable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
