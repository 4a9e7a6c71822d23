//! String keys and similarity for vocabulary lookups.

use strsim::normalized_levenshtein;

/// Fold IAST diacritics to their ASCII base letter.
///
/// Characters outside the table pass through unchanged.
pub fn fold_diacritics(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'ā' | 'á' | 'à' | 'â' => 'a',
        'Ā' | 'Á' | 'À' | 'Â' => 'A',
        'ī' | 'í' | 'ì' | 'î' => 'i',
        'Ī' | 'Í' | 'Ì' | 'Î' => 'I',
        'ū' | 'ú' | 'ù' | 'û' => 'u',
        'Ū' | 'Ú' | 'Ù' | 'Û' => 'U',
        'ṛ' | 'ṝ' | 'ṟ' => 'r',
        'Ṛ' | 'Ṝ' | 'Ṟ' => 'R',
        'ḷ' | 'ḹ' => 'l',
        'Ḷ' | 'Ḹ' => 'L',
        'ṅ' | 'ñ' | 'ṇ' | 'ṁ' => 'n',
        'Ṅ' | 'Ñ' | 'Ṇ' | 'Ṁ' => 'N',
        'ṃ' => 'm',
        'Ṃ' => 'M',
        'ṭ' => 't',
        'Ṭ' => 'T',
        'ḍ' => 'd',
        'Ḍ' => 'D',
        'ś' | 'ṣ' => 's',
        'Ś' | 'Ṣ' => 'S',
        'ḥ' => 'h',
        'Ḥ' => 'H',
        'ē' | 'é' => 'e',
        'Ē' | 'É' => 'E',
        'ō' | 'ó' => 'o',
        'Ō' | 'Ó' => 'O',
        other => other,
    }
}

/// Sanskrit lookup key: diacritic-folded, lowercase, hyphens and spaces removed.
pub fn sanskrit_key(term: &str) -> String {
    fold_diacritics(term)
        .to_lowercase()
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// English lookup key: lowercase and trimmed.
pub fn english_key(term: &str) -> String {
    term.trim().to_lowercase()
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, counted in characters.
///
/// Two empty strings are identical (1.0); one empty string scores 0.0.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

/// Whether a key of length `key_len` can reach `threshold` against a query
/// of length `query_len`.
///
/// Edit distance is at least the length difference, so similarity is at
/// most `1 - diff / max_len`; candidates above that bound are skipped
/// without computing the distance. The comparison carries a small slack so
/// rounding in `1 - threshold` never prunes a key scoring exactly at the
/// threshold.
pub fn within_length_bound(query_len: usize, key_len: usize, threshold: f64) -> bool {
    let max_len = query_len.max(key_len);
    if max_len == 0 {
        return true;
    }
    let diff = query_len.abs_diff(key_len) as f64;
    diff <= (1.0 - threshold) * max_len as f64 + BOUND_SLACK
}

const BOUND_SLACK: f64 = 1e-9;
