//! Whole-string comparators: LCS overlap ("ROUGE-L") and bag-of-tokens F1.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{TextMetrics, TextScores};

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-]").expect("valid non-word regex"));

/// Lowercase, replace punctuation with spaces and split on whitespace.
/// Single-character and purely numeric tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|token| token.chars().count() > 1 && !token.chars().all(|c| c.is_numeric()))
        .map(str::to_string)
        .collect()
}

/// Length of the longest common subsequence, single-row DP.
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diagonal = 0;
        for (j, y) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

fn empty_convention(predicted_len: usize, gold_len: usize) -> Option<TextScores> {
    match (predicted_len, gold_len) {
        (0, 0) => Some(TextScores::PERFECT),
        (0, _) | (_, 0) => Some(TextScores::ZERO),
        _ => None,
    }
}

/// LCS precision/recall/F1 of `predicted` against `gold`.
pub fn rouge_l(predicted: &str, gold: &str) -> TextScores {
    let predicted = tokenize(predicted);
    let gold = tokenize(gold);
    empty_convention(predicted.len(), gold.len()).unwrap_or_else(|| {
        TextScores::from_overlap(lcs_length(&predicted, &gold), predicted.len(), gold.len())
    })
}

/// Set-based token precision/recall/F1; symmetric in its F1.
pub fn token_f1(predicted: &str, gold: &str) -> TextScores {
    let predicted: HashSet<String> = tokenize(predicted).into_iter().collect();
    let gold: HashSet<String> = tokenize(gold).into_iter().collect();
    empty_convention(predicted.len(), gold.len()).unwrap_or_else(|| {
        let overlap = predicted.intersection(&gold).count();
        TextScores::from_overlap(overlap, predicted.len(), gold.len())
    })
}

pub fn compute_text_metrics(predicted: &str, gold: &str) -> TextMetrics {
    TextMetrics {
        rouge_l: rouge_l(predicted, gold),
        token_f1: token_f1(predicted, gold),
    }
}
