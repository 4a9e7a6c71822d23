//! Controlled vocabulary models.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separators between Sanskrit aliases in a raw vocabulary cell.
static ALIAS_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,]").expect("valid alias separator regex"));

/// Leading list numbering such as "1." or "2. ".
static ALIAS_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid alias numbering regex"));

/// A single ITA term: identifier, English label and Sanskrit synonyms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularyEntry {
    /// ITA identifier (e.g., "ITA-5.12.3")
    pub id: String,
    /// English preferred label
    pub english: String,
    /// Sanskrit aliases in source order
    pub sanskrit_aliases: Vec<String>,
}

impl VocabularyEntry {
    /// Create an entry with already-parsed aliases.
    pub fn new(id: impl Into<String>, english: impl Into<String>, sanskrit_aliases: Vec<String>) -> Self {
        Self {
            id: id.into(),
            english: english.into(),
            sanskrit_aliases,
        }
    }

    /// Create an entry from a raw `(id, english, sanskrit_raw)` source row.
    ///
    /// Fields are trimmed and the Sanskrit cell is split into aliases with
    /// [`parse_sanskrit_aliases`].
    pub fn from_row(id: &str, english: &str, sanskrit_raw: &str) -> Self {
        Self {
            id: id.trim().to_string(),
            english: english.trim().to_string(),
            sanskrit_aliases: parse_sanskrit_aliases(sanskrit_raw),
        }
    }
}

/// Split a raw Sanskrit cell into aliases.
///
/// Aliases are separated by `;` or `,`, may carry a "1." style prefix and
/// may end in a stray `/`. Empty aliases are dropped.
pub fn parse_sanskrit_aliases(raw: &str) -> Vec<String> {
    ALIAS_SEPARATOR
        .split(raw.trim())
        .filter_map(|part| {
            let unnumbered = ALIAS_NUMBERING.replace(part.trim(), "");
            let alias = unnumbered.trim_end_matches('/').trim();
            (!alias.is_empty()).then(|| alias.to_string())
        })
        .collect()
}
