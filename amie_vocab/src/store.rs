//! CSV-backed vocabulary table.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, VocabError};
use crate::flags::extract_bracket_flags;

pub const ENTRY_COLUMN: &str = "Entry";
pub const NOTES_COLUMN: &str = "Notes";
pub const MASTERY_COLUMN: &str = "Mastery Score";

/// One tracked word, phrase or concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    /// Identity key, unique within a store
    pub entry: String,
    pub notes: String,
    /// Proficiency estimate, documented as 0-10
    pub mastery: u32,
}

impl VocabEntry {
    /// A fresh entry with empty notes and mastery 0.
    #[must_use]
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            notes: String::new(),
            mastery: 0,
        }
    }
}

/// Counts shown by `amie info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub total: usize,
    /// Entries at or below the drill threshold
    pub practisable: usize,
    pub mastered: usize,
}

/// Insertion-ordered map of `entry -> VocabEntry`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabStore {
    entries: Vec<VocabEntry>,
    index: HashMap<String, usize>,
}

/// Column positions found in the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    entry: Option<usize>,
    notes: Option<usize>,
    mastery: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = Self::default();
        for (i, header) in headers.iter().enumerate() {
            let header = header.trim();
            if header.eq_ignore_ascii_case(ENTRY_COLUMN) {
                map.entry = Some(i);
            } else if header.eq_ignore_ascii_case(NOTES_COLUMN) {
                map.notes = Some(i);
            } else if header.eq_ignore_ascii_case(MASTERY_COLUMN) {
                map.mastery = Some(i);
            }
        }
        map
    }
}

/// Accepts `7`, `7.0` (spreadsheet tools write integral floats once a column
/// held blanks) and blank, which means 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_mastery(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    if let Ok(value) = raw.parse::<u32>() {
        return Some(value);
    }
    let value: f64 = raw.parse().ok()?;
    let integral = value.fract().abs() < f64::EPSILON;
    (integral && (0.0..=f64::from(u32::MAX)).contains(&value)).then_some(value as u32)
}

impl VocabStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`. A missing file is an empty store; an
    /// unreadable or malformed one is `StorageUnavailable`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No vocabulary file at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let file = std::fs::File::open(path).map_err(|e| VocabError::storage(path, e))?;
        let store = Self::from_reader(file, path)?;
        info!("Loaded {} entries from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse CSV content. `origin` only labels errors.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| VocabError::storage(origin, e))?
            .clone();
        let columns = ColumnMap::from_headers(&headers);
        let Some(entry_col) = columns.entry else {
            return Err(VocabError::storage(
                origin,
                format!("missing '{ENTRY_COLUMN}' column"),
            ));
        };

        let mut store = Self::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| VocabError::storage(origin, e))?;
            let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

            let key = field(Some(entry_col));
            if key.is_empty() {
                debug!("Skipping row {} with an empty entry", row + 2);
                continue;
            }
            let raw_mastery = field(columns.mastery);
            let mastery = parse_mastery(raw_mastery).ok_or_else(|| {
                VocabError::storage(
                    origin,
                    format!("row {}: invalid mastery score '{raw_mastery}'", row + 2),
                )
            })?;

            store.insert(VocabEntry {
                entry: key.to_string(),
                notes: field(columns.notes).to_string(),
                mastery,
            });
        }
        Ok(store)
    }

    /// Rewrite the whole file. The snapshot goes to a sibling temp file first
    /// and is renamed into place, so readers never see a partial write.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| VocabError::storage(path, e))?;
        }
        let tmp = temp_path(path);
        self.write_csv(&tmp)
            .map_err(|e| VocabError::storage(path, e))?;
        std::fs::rename(&tmp, path).map_err(|e| VocabError::storage(path, e))?;
        debug!("Saved {} entries to {}", self.len(), path.display());
        Ok(())
    }

    fn write_csv(&self, path: &Path) -> csv::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([ENTRY_COLUMN, NOTES_COLUMN, MASTERY_COLUMN])?;
        for entry in &self.entries {
            writer.write_record([
                entry.entry.as_str(),
                entry.notes.as_str(),
                entry.mastery.to_string().as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append `entry` unless its key is already present. Returns whether it was added.
    pub fn insert(&mut self, entry: VocabEntry) -> bool {
        if self.index.contains_key(&entry.entry) {
            return false;
        }
        self.index.insert(entry.entry.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Add every candidate not already present, with default notes and mastery.
    ///
    /// Candidates are trimmed, blanks dropped, and duplicates within the batch
    /// collapse to one entry. Returns the number of entries actually added.
    pub fn merge<I, S>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.len();
        for candidate in candidates {
            let key = candidate.as_ref().trim();
            if !key.is_empty() {
                self.insert(VocabEntry::new(key));
            }
        }
        let added = self.len() - before;
        info!("Added {added} new words. Total vocab size: {}.", self.len());
        added
    }

    /// Record every `[word]` in `input` that is not yet an entry. Returns the
    /// words actually added, in order of first appearance.
    pub fn flag_unknown(&mut self, input: &str) -> Vec<String> {
        extract_bracket_flags(input)
            .into_iter()
            .filter(|word| self.insert(VocabEntry::new(word.as_str())))
            .collect()
    }

    /// Overwrite the mastery of `key`. Returns false when the key is unknown.
    pub fn set_mastery(&mut self, key: &str, mastery: u32) -> bool {
        match self.index.get(key) {
            Some(&i) => {
                self.entries[i].mastery = mastery;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&VocabEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self, threshold: u32) -> StoreStats {
        let practisable = self.iter().filter(|e| e.mastery <= threshold).count();
        StoreStats {
            total: self.len(),
            practisable,
            mastered: self.len() - practisable,
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
