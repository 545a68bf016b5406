//! Per-source-file memo of extraction output.
//!
//! One JSON record per note file, named after the hash of the note's path
//! relative to the notes root, so the same corpus reached through another
//! spelling of the root (or moved elsewhere) still hits. Records are written
//! once and never invalidated: an edited note keeps its old extraction until
//! the cache is bypassed.

use std::path::{Component, Path, PathBuf};

use amie_core::content_hash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VocabError};

/// Whether ingestion may reuse cached extractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// A cached path is never sent to the oracle again.
    #[default]
    Reuse,
    /// Re-extract every file and overwrite its record.
    Bypass,
}

impl CachePolicy {
    #[must_use]
    pub const fn from_bypass(bypass: bool) -> Self {
        if bypass { Self::Bypass } else { Self::Reuse }
    }
}

/// The cache key of `path`: its location under `root`, without `.` parts.
///
/// Falls back to the whole path when `path` is not under `root`.
#[must_use]
pub fn source_key(root: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedExtraction {
    /// Note path relative to the notes root
    pub source: PathBuf,
    /// Hash of the note text the extraction was computed from
    pub source_hash: String,
    pub extracted_at: DateTime<Utc>,
    /// Raw oracle output
    pub content: String,
}

impl CachedExtraction {
    #[must_use]
    pub fn new(source: &Path, source_text: &str, content: String) -> Self {
        Self {
            source: source.to_path_buf(),
            source_hash: content_hash(source_text),
            extracted_at: Utc::now(),
            content,
        }
    }

    /// True when the note changed since this record was written.
    #[must_use]
    pub fn is_stale(&self, source_text: &str) -> bool {
        self.source_hash != content_hash(source_text)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionCache {
    dir: PathBuf,
}

impl ExtractionCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, source: &Path) -> PathBuf {
        let normalised: Vec<_> = source
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        let key = content_hash(&normalised.join("/"));
        self.dir.join(format!("{key}.json"))
    }

    /// The record for `source`, if one was written. A record that exists but
    /// cannot be read back is `StorageUnavailable`.
    pub fn get(&self, source: &Path) -> Result<Option<CachedExtraction>> {
        let path = self.record_path(source);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| VocabError::storage(&path, e))?;
        let record: CachedExtraction =
            serde_json::from_str(&raw).map_err(|e| VocabError::storage(&path, e))?;
        Ok(Some(record))
    }

    /// Persist `record`, replacing any previous one for the same source.
    pub fn put(&self, record: &CachedExtraction) -> Result<()> {
        let path = self.record_path(&record.source);
        std::fs::create_dir_all(&self.dir).map_err(|e| VocabError::storage(&self.dir, e))?;

        let json =
            serde_json::to_string_pretty(record).map_err(|e| VocabError::storage(&path, e))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| VocabError::storage(&path, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| VocabError::storage(&path, e))?;

        debug!(
            "Cached extraction for {} at {}",
            record.source.display(),
            path.display()
        );
        Ok(())
    }
}
