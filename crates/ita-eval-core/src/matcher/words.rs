//! Significant-word extraction for the word-overlap tier.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::vocab::fold_diacritics;

/// Words too generic to establish a match on their own: dosha names,
/// disease/treatment suffixes and English function words.
pub const AYUR_STOPWORDS: [&str; 28] = [
    "vata", "pitta", "kapha",
    "dosha", "dushti", "vikara", "roga", "vyadhi",
    "samana", "shamana", "hara",
    "chikitsa", "therapy", "treatment",
    "the", "a", "an", "of", "in", "on", "for", "to", "is", "and", "or",
    "with", "due", "type",
];

/// Shortest word length that counts as significant.
const MIN_WORD_LEN: usize = 3;

static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-/]+").expect("valid word separator regex"));

/// Significant clinical words of a term.
///
/// Words are diacritic-folded, lowercased and reduced to ASCII letters;
/// stop-words and words shorter than three letters are dropped.
pub fn significant_words(term: &str) -> HashSet<String> {
    let folded = fold_diacritics(term).to_lowercase();
    WORD_SEPARATOR
        .split(&folded)
        .map(|word| word.chars().filter(|c| c.is_ascii_lowercase()).collect::<String>())
        .filter(|word| word.len() >= MIN_WORD_LEN && !AYUR_STOPWORDS.contains(&word.as_str()))
        .collect()
}
