//! Batch extraction of vocabulary from the notes directory.

use std::path::PathBuf;

use amie_config::Config;
use amie_vocab::{CachePolicy, ExtractionCache, NoteIngestor};
use tracing::info;

use super::{build_provider, resolve_model};

/// Input parameters for the Ingest command strategy.
#[derive(Debug, Clone)]
pub struct IngestInput {
    /// Notes directory override
    pub raw_dir: Option<PathBuf>,
    /// Ignore cached extractions for this run
    pub refresh_cache: bool,
}

/// Strategy for executing the Ingest command.
#[derive(Debug, Clone, Copy)]
pub struct IngestStrategy;

impl super::CommandStrategy for IngestStrategy {
    type Input = IngestInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let provider = build_provider(&config)?;

        let raw_dir = input.raw_dir.unwrap_or_else(|| config.raw_dir());
        let store_path = config.vocab_csv();
        let policy =
            CachePolicy::from_bypass(config.ingestion.bypass_cache || input.refresh_cache);
        info!(
            "Ingesting notes from {} into {} ({policy:?})",
            raw_dir.display(),
            store_path.display()
        );

        let model = resolve_model(None, &config, &provider);
        let ingestor = NoteIngestor::new(
            provider,
            model,
            ExtractionCache::new(config.cache_dir()),
        )
        .with_extensions(config.ingestion.extensions.clone())
        .with_cache_policy(policy);

        let report = ingestor.ingest_into(&raw_dir, &store_path).await?;

        println!("=== Ingestion ===\n");
        println!("Notes found:      {}", report.files);
        println!("From cache:       {}", report.cache_hits);
        println!("Extracted:        {}", report.extracted);
        if report.stale > 0 {
            println!(
                "Stale cache used: {} (run with --refresh-cache to re-extract)",
                report.stale
            );
        }
        println!("Candidates:       {}", report.candidates);
        println!("New entries:      {}", report.added);
        println!("Vocabulary size:  {}", report.total);

        if !report.skipped.is_empty() {
            println!("\nSkipped ({}):", report.skipped.len());
            for (path, reason) in &report.skipped {
                println!("  {}: {reason}", path.display());
            }
        }
        Ok(())
    }
}
