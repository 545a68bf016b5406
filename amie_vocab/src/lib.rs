#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Vocabulary store and everything that feeds or reads it.
//!
//! - [`VocabStore`]: the CSV-backed entry table with dedup-merge
//! - [`NoteIngestor`]: turns raw lesson notes into entries through the oracle,
//!   memoised per file by [`ExtractionCache`]
//! - [`select_for_drill`]: picks the words for a practice round
//! - [`apply_ratings`]: writes oracle ratings back as mastery scores
//!
//! All parsing of free oracle text lives here so callers only see typed data.

mod cache;
mod error;
mod flags;
mod ingest;
mod mastery;
mod selector;
mod store;

pub use cache::{CachePolicy, CachedExtraction, ExtractionCache, source_key};
pub use error::{Result, VocabError};
pub use flags::extract_bracket_flags;
pub use ingest::{
    EXTRACTION_INSTRUCTIONS, EXTRACTION_SYSTEM_PROMPT, IngestReport, NoteIngestor,
    split_extraction,
};
pub use mastery::{RatingOutcome, apply_ratings};
pub use selector::{DEFAULT_MASTERY_THRESHOLD, DEFAULT_MAX_WORDS, select_for_drill};
pub use store::{StoreStats, VocabEntry, VocabStore};
