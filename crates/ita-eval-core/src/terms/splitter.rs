//! Term splitter for free-text annotation and prediction cells.
//!
//! Handles:
//! - Unicode dash folding and newline/paragraph collapsing
//! - Parenthetical asides (long ones dropped, short ones reduced to their
//!   surrounding text)
//! - Hedge preambles ("likely", "possible", "probable", leading "?")
//! - Splitting on `;` `,` `/`, the word "or" and "and/or"

use std::sync::LazyLock;

use regex::Regex;

/// Dash variants folded to an ASCII hyphen.
const DASH_VARIANTS: [char; 7] = [
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
];

/// Longest parenthetical content that is still treated as a short note.
const MAX_SHORT_PARENTHETICAL: usize = 30;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static LONG_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\([^)]{{{},}}\)", MAX_SHORT_PARENTHETICAL + 1))
        .expect("valid long parenthetical regex")
});

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthetical regex"));

static TERM_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,/]|\band/or\b|\bor\b").expect("valid separator regex"));

static EDGE_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s?!.,:\d)]+|[\s?!.,:]+$").expect("valid edge punctuation regex")
});

/// Hedge preambles, applied in order, each once.
static PREAMBLES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^\?\s*", r"^\?\?\s*", r"(?i)^likely\s+", r"(?i)^probable\s+", r"(?i)^possible\s+"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid preamble regex"))
        .collect()
});

/// Fold dashes, turn blank-line paragraph breaks into "; ", other newlines
/// into spaces, and collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let dashes: String = text
        .chars()
        .map(|c| if DASH_VARIANTS.contains(&c) { '-' } else { c })
        .collect();
    let paragraphs = PARAGRAPH_BREAK.replace_all(&dashes, "; ");
    let lines = paragraphs.replace('\n', " ");
    collapse_whitespace(&lines)
}

/// Remove leading hedge words such as "likely" or "?".
pub fn strip_preamble(term: &str) -> String {
    let mut current = term.trim().to_string();
    for pattern in PREAMBLES.iter() {
        let stripped = pattern.replace(&current, "").trim().to_string();
        current = stripped;
    }
    current
}

/// Drop parenthetical asides: long ones first, then any remaining short notes.
pub fn strip_parentheticals(text: &str) -> String {
    let without_long = LONG_PARENTHETICAL.replace_all(text, "");
    let without_short = PARENTHETICAL.replace_all(&without_long, "");
    collapse_whitespace(&without_short)
}

/// Split a raw cell into an ordered list of clean terms.
///
/// Output keeps split order and is not deduplicated. Fragments of one
/// character or less after cleaning are discarded.
pub fn split_terms(raw: &str) -> Vec<String> {
    let text = normalize_text(raw);
    if text.is_empty() {
        return Vec::new();
    }
    let text = strip_parentheticals(&text);
    let text = strip_preamble(&text);

    TERM_SEPARATOR
        .split(&text)
        .filter_map(clean_fragment)
        .collect()
}

fn clean_fragment(fragment: &str) -> Option<String> {
    let term = strip_preamble(fragment);
    let term = EDGE_PUNCTUATION.replace_all(&term, "");
    let term = PARENTHETICAL.replace_all(&term, "");
    let term = strip_preamble(&term);
    (term.chars().count() > 1).then_some(term)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}
