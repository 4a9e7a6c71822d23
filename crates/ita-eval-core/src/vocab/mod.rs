//! Vocabulary index over the ITA synonym table.
//!
//! Built once from a list of [`VocabularyEntry`] and then shared read-only
//! by every matching call. Lookups:
//! - exact, on the collapsed Sanskrit key or the lowercase English label
//! - fuzzy, a normalized-Levenshtein scan of one key space with a
//!   caller-supplied threshold

mod similarity;

pub use similarity::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::VocabularyEntry;

/// Vocabulary errors.
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Vocabulary source is empty")]
    Empty,

    #[error("Row {row} has {fields} fields, expected at least 3")]
    MalformedRow { row: usize, fields: usize },
}

pub type VocabResult<T> = Result<T, VocabError>;

/// Which key space a fuzzy lookup scans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VocabKind {
    English,
    Sanskrit,
}

/// Result of a vocabulary lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VocabMatch {
    /// Resolved ITA id
    pub id: String,
    /// Index key that matched
    pub matched_key: String,
    /// Similarity in [0, 1]; 1.0 for exact hits
    pub similarity: f64,
}

/// One key of a fuzzy-scannable key space.
#[derive(Debug, Clone)]
struct IndexKey {
    key: String,
    key_len: usize,
    id: String,
}

/// Exact map plus an ordered key list for deterministic scans.
#[derive(Debug, Clone, Default)]
struct KeySpace {
    positions: HashMap<String, usize>,
    keys: Vec<IndexKey>,
}

impl KeySpace {
    /// Insert or overwrite a key. An overwritten key keeps its scan position.
    fn insert(&mut self, key: String, id: &str) {
        if key.is_empty() {
            return;
        }
        match self.positions.get(&key) {
            Some(&pos) => self.keys[pos].id = id.to_string(),
            None => {
                self.positions.insert(key.clone(), self.keys.len());
                self.keys.push(IndexKey {
                    key_len: key.chars().count(),
                    key,
                    id: id.to_string(),
                });
            }
        }
    }

    fn exact(&self, key: &str) -> Option<&IndexKey> {
        self.positions.get(key).map(|&pos| &self.keys[pos])
    }

    /// Best-scoring key at or above `threshold`; first key wins ties.
    fn best(&self, query: &str, threshold: f64) -> Option<VocabMatch> {
        if query.is_empty() {
            return None;
        }
        if let Some(hit) = self.exact(query) {
            return Some(VocabMatch {
                id: hit.id.clone(),
                matched_key: hit.key.clone(),
                similarity: 1.0,
            });
        }

        let query_len = query.chars().count();
        let mut best: Option<(&IndexKey, f64)> = None;
        for candidate in &self.keys {
            if !within_length_bound(query_len, candidate.key_len, threshold) {
                continue;
            }
            let sim = normalized_similarity(query, &candidate.key);
            if best.map_or(true, |(_, best_sim)| sim > best_sim) {
                best = Some((candidate, sim));
            }
        }

        best.filter(|(_, sim)| *sim >= threshold)
            .map(|(hit, sim)| VocabMatch {
                id: hit.id.clone(),
                matched_key: hit.key.clone(),
                similarity: sim,
            })
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Read-only index over the controlled vocabulary.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    entries: HashMap<String, VocabularyEntry>,
    sanskrit: KeySpace,
    english: KeySpace,
}

impl VocabularyIndex {
    /// Build the index from parsed entries.
    ///
    /// Later entries with a repeated id replace earlier ones; repeated keys
    /// point at the id of the last entry that declared them.
    pub fn build(entries: Vec<VocabularyEntry>) -> VocabResult<Self> {
        if entries.is_empty() {
            return Err(VocabError::Empty);
        }

        let mut index = Self {
            entries: HashMap::with_capacity(entries.len()),
            sanskrit: KeySpace::default(),
            english: KeySpace::default(),
        };

        for entry in entries {
            for alias in &entry.sanskrit_aliases {
                index.sanskrit.insert(sanskrit_key(alias), &entry.id);
            }
            index.english.insert(english_key(&entry.english), &entry.id);

            if let Some(previous) = index.entries.insert(entry.id.clone(), entry) {
                warn!(id = %previous.id, "duplicate vocabulary id; keeping the later row");
            }
        }

        info!(
            entries = index.entries.len(),
            sanskrit_keys = index.sanskrit.len(),
            english_keys = index.english.len(),
            "built vocabulary index"
        );

        Ok(index)
    }

    /// Build the index from raw `(id, english, sanskrit_raw)` rows.
    ///
    /// Every row must carry at least three fields; extra fields are ignored.
    pub fn from_rows<R, S>(rows: &[R]) -> VocabResult<Self>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        if rows.is_empty() {
            return Err(VocabError::Empty);
        }

        let entries = rows
            .iter()
            .enumerate()
            .map(|(row, fields)| match fields.as_ref() {
                [id, english, sanskrit, ..] => Ok(VocabularyEntry::from_row(
                    id.as_ref(),
                    english.as_ref(),
                    sanskrit.as_ref(),
                )),
                short => Err(VocabError::MalformedRow {
                    row,
                    fields: short.len(),
                }),
            })
            .collect::<VocabResult<Vec<_>>>()?;

        Self::build(entries)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an id.
    pub fn entry(&self, id: &str) -> Option<&VocabularyEntry> {
        self.entries.get(id)
    }

    /// Exact lookup: collapsed Sanskrit key first, then English label.
    pub fn lookup_exact(&self, term: &str) -> Option<&str> {
        self.sanskrit
            .exact(&sanskrit_key(term))
            .or_else(|| self.english.exact(&english_key(term)))
            .map(|hit| hit.id.as_str())
    }

    /// Fuzzy lookup in one key space.
    ///
    /// Returns the best key whose similarity is at least `threshold`; an
    /// exact key hit short-circuits with similarity 1.0.
    pub fn lookup_fuzzy(&self, term: &str, kind: VocabKind, threshold: f64) -> Option<VocabMatch> {
        match kind {
            VocabKind::Sanskrit => self.sanskrit.best(&sanskrit_key(term), threshold),
            VocabKind::English => self.english.best(&english_key(term), threshold),
        }
    }

    /// Resolve a term to an id, trying the Sanskrit space before the English one.
    pub fn resolve(&self, term: &str, threshold: f64) -> Option<VocabMatch> {
        self.lookup_fuzzy(term, VocabKind::Sanskrit, threshold)
            .or_else(|| self.lookup_fuzzy(term, VocabKind::English, threshold))
    }
}
