//! Append-only log of session summaries, fed back as context.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MemoryLog {
    path: PathBuf,
}

impl MemoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole log; empty when it does not exist yet.
    pub fn read_all(&self) -> std::io::Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Append one dated summary, terminated by a blank line.
    pub fn append(&self, summary: &str) -> std::io::Result<()> {
        let summary = summary.trim();
        if summary.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(file, "[{}]\n{summary}\n\n", Utc::now().format("%Y-%m-%d"))?;
        debug!("Appended session summary to {}", self.path.display());
        Ok(())
    }
}
