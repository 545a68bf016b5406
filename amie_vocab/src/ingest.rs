//! Note ingestion: raw lesson notes in, vocabulary entries out.

use std::path::{Path, PathBuf};

use amie_core::{ChatMessage, LLMProvider};
use tracing::{debug, info, warn};

use crate::cache::{CachePolicy, CachedExtraction, ExtractionCache, source_key};
use crate::error::{Result, VocabError};
use crate::store::VocabStore;

pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a helpful French language assistant.";

pub const EXTRACTION_INSTRUCTIONS: &str = "\
Here are my messy French notes from lessons. There might not actually be any French in here: \
some files aren't relevant. If it looks like there's no vocabulary, return an empty response.

If there is, extract each distinct French word, phrase or concept. \
Return JUST the word/phrase/concept, one per line, but if there's a specific or unusual usage \
(for example an ambiguity), add it in brackets after the word/phrase.

NO EXTRA TEXT. I'll process it later.

Here are my notes:
";

/// Split raw extraction output into candidate entries: one per non-blank line, trimmed.
#[must_use]
pub fn split_extraction(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Note files discovered
    pub files: usize,
    /// Files served from the extraction cache
    pub cache_hits: usize,
    /// Files sent to the oracle
    pub extracted: usize,
    /// Cached extractions whose note changed since
    pub stale: usize,
    /// Files left out of this run, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Candidate lines across all files
    pub candidates: usize,
    /// Entries new to the store
    pub added: usize,
    /// Store size after merging
    pub total: usize,
}

/// Where one file's extraction came from.
enum Extraction {
    Cached { content: String, stale: bool },
    Fresh(String),
}

pub struct NoteIngestor<P>
where
    P: LLMProvider,
{
    provider: P,
    model: String,
    cache: ExtractionCache,
    extensions: Vec<String>,
    policy: CachePolicy,
}

impl<P> NoteIngestor<P>
where
    P: LLMProvider,
{
    #[must_use]
    pub fn new(provider: P, model: String, cache: ExtractionCache) -> Self {
        Self {
            provider,
            model,
            cache,
            extensions: vec!["txt".to_string(), "md".to_string(), "csv".to_string()],
            policy: CachePolicy::Reuse,
        }
    }

    /// File extensions (without the dot) considered notes.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub const fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Every note file under `root`, recursively, in sorted order.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            warn!("Notes directory {} does not exist", root.display());
            return Ok(Vec::new());
        }
        let pattern = format!("{}/**/*", glob::Pattern::escape(&root.to_string_lossy()));
        let paths = glob::glob(&pattern).map_err(|e| VocabError::storage(root, e))?;

        let mut files = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() && self.is_note(&path) => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path during discovery: {e}"),
            }
        }
        files.sort();
        Ok(files)
    }

    fn is_note(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    /// Extract vocabulary from every note under `root` and merge it into `store`.
    ///
    /// A file that cannot be read, or whose oracle call fails, is skipped and
    /// reported; it has no cache record so the next run retries it. Cache
    /// storage failures abort the run.
    pub async fn ingest(&self, root: &Path, store: &mut VocabStore) -> Result<IngestReport> {
        let files = self.discover(root)?;
        let mut report = IngestReport {
            files: files.len(),
            ..IngestReport::default()
        };
        let mut candidates = Vec::new();

        for path in &files {
            let content = match self.extract_file(root, path).await {
                Ok(Extraction::Cached { content, stale }) => {
                    report.cache_hits += 1;
                    if stale {
                        report.stale += 1;
                    }
                    content
                }
                Ok(Extraction::Fresh(content)) => {
                    report.extracted += 1;
                    content
                }
                Err(
                    e @ (VocabError::UnreadableSourceFile { .. }
                    | VocabError::OracleUnavailable(_)),
                ) => {
                    warn!("Skipping {}: {e}", path.display());
                    report.skipped.push((path.clone(), e.to_string()));
                    continue;
                }
                Err(e) => return Err(e),
            };
            let lines = split_extraction(&content);
            debug!("{} yielded {} candidates", path.display(), lines.len());
            candidates.extend(lines);
        }

        report.candidates = candidates.len();
        report.added = store.merge(&candidates);
        report.total = store.len();
        Ok(report)
    }

    /// Load the store at `store_path`, ingest `root` into it and save it back.
    pub async fn ingest_into(&self, root: &Path, store_path: &Path) -> Result<IngestReport> {
        let mut store = VocabStore::load(store_path)?;
        let report = self.ingest(root, &mut store).await?;
        store.save(store_path)?;
        info!(
            "Ingestion finished: {} files, {} from cache, {} extracted, {} skipped, {} added",
            report.files,
            report.cache_hits,
            report.extracted,
            report.skipped.len(),
            report.added
        );
        Ok(report)
    }

    async fn extract_file(&self, root: &Path, path: &Path) -> Result<Extraction> {
        let key = source_key(root, path);
        let text = read_note(path);

        if self.policy == CachePolicy::Reuse {
            if let Some(record) = self.cache.get(&key)? {
                info!("Loading cached extraction for {}", path.display());
                let stale = text.as_deref().is_ok_and(|t| record.is_stale(t));
                if stale {
                    warn!(
                        "{} changed since it was extracted on {}; using the cached result \
                         (run with --refresh-cache to re-extract)",
                        path.display(),
                        record.extracted_at.format("%Y-%m-%d")
                    );
                }
                return Ok(Extraction::Cached {
                    content: record.content,
                    stale,
                });
            }
        }

        let text = text.map_err(|source| VocabError::UnreadableSourceFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Reading {}", path.display());

        let messages = [
            ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(format!("{EXTRACTION_INSTRUCTIONS}{text}")),
        ];
        let response = self
            .provider
            .chat(&messages, &self.model)
            .await
            .map_err(VocabError::OracleUnavailable)?;

        // Cache before use so a crash past this point never re-charges the oracle.
        let record = CachedExtraction::new(&key, &text, response.content);
        self.cache.put(&record)?;
        Ok(Extraction::Fresh(record.content))
    }
}

/// Read a note as text. Bytes that are not UTF-8 (Latin-1 notes) are
/// replaced rather than rejected; only I/O errors fail.
fn read_note(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
