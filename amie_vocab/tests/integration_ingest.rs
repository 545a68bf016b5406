//! End-to-end ingestion over a temporary notes corpus with a scripted oracle.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use amie_core::testing::ScriptedProvider;
use amie_vocab::{CachePolicy, ExtractionCache, NoteIngestor, VocabEntry, VocabStore};
use tempfile::TempDir;

struct Corpus {
    dir: TempDir,
}

impl Corpus {
    fn new(files: &[(&str, &str)]) -> Self {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("temp dir");
        };
        for (name, text) in files {
            let path = dir.path().join("raw").join(name);
            if let Some(parent) = path.parent() {
                assert!(fs::create_dir_all(parent).is_ok());
            }
            assert!(fs::write(path, text).is_ok());
        }
        Self { dir }
    }

    fn raw(&self) -> std::path::PathBuf {
        self.dir.path().join("raw")
    }

    fn store_path(&self) -> std::path::PathBuf {
        self.dir.path().join("data").join("vocab.csv")
    }

    fn ingestor(&self, provider: Arc<ScriptedProvider>) -> NoteIngestor<Arc<ScriptedProvider>> {
        NoteIngestor::new(
            provider,
            "test-model".to_string(),
            ExtractionCache::new(self.dir.path().join("data").join("cache")),
        )
    }
}

fn load(path: &Path) -> VocabStore {
    let Ok(store) = VocabStore::load(path) else {
        panic!("store should load");
    };
    store
}

#[tokio::test]
async fn second_run_uses_cache_and_changes_nothing() {
    let corpus = Corpus::new(&[
        ("lesson1.md", "la pomme, la chaise"),
        ("week2/lesson2.txt", "ricaner = to snigger"),
        ("ignored.json", "{}"),
    ]);
    let provider = Arc::new(ScriptedProvider::new([
        "pomme\nchaise\n\n",
        "ricaner (to snigger)\npomme",
    ]));

    let first = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    let Ok(first) = first else {
        panic!("first ingestion failed");
    };
    assert_eq!(first.files, 2);
    assert_eq!(first.extracted, 2);
    assert_eq!(first.candidates, 4);
    assert_eq!(first.added, 3);
    assert_eq!(provider.calls(), 2);
    let after_first = load(&corpus.store_path());

    let second = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    let Ok(second) = second else {
        panic!("second ingestion failed");
    };
    assert_eq!(provider.calls(), 2, "cached files must not reach the oracle");
    assert_eq!(second.cache_hits, 2);
    assert_eq!(second.added, 0);
    assert_eq!(load(&corpus.store_path()), after_first);
}

#[tokio::test]
async fn extraction_request_carries_the_note_text() {
    let corpus = Corpus::new(&[("lesson.md", "grenouille: frog")]);
    let provider = Arc::new(ScriptedProvider::new(["grenouille"]));

    let result = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    assert!(result.is_ok());

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0][1].content.ends_with("grenouille: frog"));
    assert!(requests[0][1].content.contains("one per line"));
}

#[tokio::test]
async fn existing_entries_keep_their_scores() {
    let corpus = Corpus::new(&[("lesson.md", "notes")]);
    let mut seeded = VocabStore::new();
    seeded.insert(VocabEntry {
        notes: "fruit".to_string(),
        mastery: 6,
        ..VocabEntry::new("pomme")
    });
    assert!(seeded.save(&corpus.store_path()).is_ok());

    let provider = Arc::new(ScriptedProvider::new(["pomme\npoire"]));
    let result = corpus
        .ingestor(provider)
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    assert_eq!(result.ok().map(|r| r.added), Some(1));

    let store = load(&corpus.store_path());
    assert_eq!(store.get("pomme").map(|e| e.mastery), Some(6));
    assert_eq!(store.get("pomme").map(|e| e.notes.as_str()), Some("fruit"));
    assert_eq!(store.get("poire"), Some(&VocabEntry::new("poire")));
}

#[tokio::test]
async fn failed_file_is_skipped_and_retried_next_run() {
    let corpus = Corpus::new(&[("a.md", "pomme"), ("b.md", "chaise")]);
    let provider = Arc::new(ScriptedProvider::default());
    provider.push_failure("service down");
    provider.push_reply("chaise");

    let first = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    let Ok(first) = first else {
        panic!("ingestion should survive one failed file");
    };
    assert_eq!(first.skipped.len(), 1);
    assert!(first.skipped[0].0.ends_with("a.md"));
    assert_eq!(first.added, 1);

    provider.push_reply("pomme");
    let second = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    let Ok(second) = second else {
        panic!("second ingestion failed");
    };
    assert_eq!(second.extracted, 1);
    assert_eq!(second.cache_hits, 1);
    assert_eq!(second.added, 1);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn latin1_note_is_extracted_not_skipped() {
    let corpus = Corpus::new(&[("good.md", "pomme")]);
    assert!(fs::write(corpus.raw().join("latin1.txt"), b"caf\xe9 cr\xe8me").is_ok());
    let provider = Arc::new(ScriptedProvider::new(["pomme", "caf\u{e9}"]));

    let report = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    let Ok(report) = report else {
        panic!("ingestion should read the latin-1 note");
    };
    assert_eq!(report.files, 2);
    assert!(report.skipped.is_empty());
    assert_eq!(report.extracted, 2);
    assert_eq!(report.added, 2);
    assert!(provider.requests()[1][1].content.contains("caf\u{FFFD}"));
}

#[tokio::test]
async fn cache_survives_another_spelling_of_the_root() {
    let corpus = Corpus::new(&[("week1/lesson.md", "la pomme")]);
    let provider = Arc::new(ScriptedProvider::new(["pomme"]));
    assert!(
        corpus
            .ingestor(provider.clone())
            .ingest_into(&corpus.raw(), &corpus.store_path())
            .await
            .is_ok()
    );
    assert_eq!(provider.calls(), 1);

    let dotted = corpus.dir.path().join(".").join("raw");
    let Ok(second) = corpus
        .ingestor(provider.clone())
        .ingest_into(&dotted, &corpus.store_path())
        .await
    else {
        panic!("dotted root run failed");
    };
    assert_eq!(second.cache_hits, 1);
    assert_eq!(provider.calls(), 1);

    let moved = corpus.dir.path().join("notes");
    assert!(fs::rename(corpus.raw(), &moved).is_ok());
    let Ok(third) = corpus
        .ingestor(provider.clone())
        .ingest_into(&moved, &corpus.store_path())
        .await
    else {
        panic!("moved root run failed");
    };
    assert_eq!(third.cache_hits, 1);
    assert_eq!(third.extracted, 0);
    assert_eq!(provider.calls(), 1, "a cached note must not reach the oracle again");
}

#[tokio::test]
async fn stale_cache_is_reused_unless_bypassed() {
    let corpus = Corpus::new(&[("lesson.md", "pomme")]);
    let provider = Arc::new(ScriptedProvider::new(["pomme"]));
    assert!(
        corpus
            .ingestor(provider.clone())
            .ingest_into(&corpus.raw(), &corpus.store_path())
            .await
            .is_ok()
    );

    assert!(fs::write(corpus.raw().join("lesson.md"), "pomme, poire").is_ok());
    let reused = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    let Ok(reused) = reused else {
        panic!("reuse run failed");
    };
    assert_eq!(reused.stale, 1);
    assert_eq!(reused.added, 0);
    assert_eq!(provider.calls(), 1);

    provider.push_reply("pomme\npoire");
    let refreshed = corpus
        .ingestor(provider.clone())
        .with_cache_policy(CachePolicy::Bypass)
        .ingest_into(&corpus.raw(), &corpus.store_path())
        .await;
    let Ok(refreshed) = refreshed else {
        panic!("bypass run failed");
    };
    assert_eq!(refreshed.extracted, 1);
    assert_eq!(refreshed.added, 1);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn corrupt_store_is_never_overwritten() {
    let corpus = Corpus::new(&[("lesson.md", "pomme")]);
    let store_path = corpus.store_path();
    if let Some(parent) = store_path.parent() {
        assert!(fs::create_dir_all(parent).is_ok());
    }
    assert!(fs::write(&store_path, "Entry,Mastery Score\npomme,lots\n").is_ok());

    let provider = Arc::new(ScriptedProvider::new(["pomme"]));
    let result = corpus
        .ingestor(provider.clone())
        .ingest_into(&corpus.raw(), &store_path)
        .await;
    assert!(result.is_err());
    assert_eq!(provider.calls(), 0);
    assert_eq!(
        fs::read_to_string(&store_path).ok().as_deref(),
        Some("Entry,Mastery Score\npomme,lots\n")
    );
}
