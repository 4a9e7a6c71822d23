//! Case-level models: gold standard and per-field evaluations.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::matching::FieldMatchResult;
use crate::terms::split_terms;

/// Annotated field of a clinical case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Diagnosis,
    Treatment,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Diagnosis, Field::Treatment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Diagnosis => "diagnosis",
            Field::Treatment => "treatment",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Union of independent annotators' terms for one field.
///
/// Keeps first-seen order so that greedy matching is reproducible.
/// Serialized as a plain list; duplicates collapse on the way in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct GoldTermSet {
    terms: Vec<String>,
}

impl GoldTermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split every rater's raw cell and union the resulting terms.
    pub fn from_raters<S: AsRef<str>>(raw_cells: &[S]) -> Self {
        raw_cells
            .iter()
            .flat_map(|cell| split_terms(cell.as_ref()))
            .collect()
    }

    /// Insert a term; returns `false` if it was already present.
    pub fn insert(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if self.terms.contains(&term) {
            return false;
        }
        self.terms.push(term);
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.terms
    }

    /// Gold string used by the whole-text metrics: terms joined with "; ".
    pub fn joined(&self) -> String {
        self.terms.join("; ")
    }
}

impl<S: Into<String>> FromIterator<S> for GoldTermSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for term in iter {
            let term = term.into();
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
        Self { terms }
    }
}

impl From<Vec<String>> for GoldTermSet {
    fn from(terms: Vec<String>) -> Self {
        terms.into_iter().collect()
    }
}

impl From<GoldTermSet> for Vec<String> {
    fn from(gold: GoldTermSet) -> Self {
        gold.terms
    }
}

/// One rater's raw annotation of a case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RaterAnnotation {
    /// Raw diagnosis cell
    pub diagnosis: String,
    /// Raw treatment cell
    pub treatment: String,
}

impl RaterAnnotation {
    pub fn new(diagnosis: impl Into<String>, treatment: impl Into<String>) -> Self {
        Self {
            diagnosis: diagnosis.into(),
            treatment: treatment.into(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Diagnosis => &self.diagnosis,
            Field::Treatment => &self.treatment,
        }
    }
}

/// A system's raw output for one case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CasePrediction {
    pub diagnosis: String,
    pub treatment: String,
}

impl CasePrediction {
    pub fn new(diagnosis: impl Into<String>, treatment: impl Into<String>) -> Self {
        Self {
            diagnosis: diagnosis.into(),
            treatment: treatment.into(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Diagnosis => &self.diagnosis,
            Field::Treatment => &self.treatment,
        }
    }
}

/// Gold standard for one case: one term set per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseGold {
    pub diagnosis: GoldTermSet,
    pub treatment: GoldTermSet,
}

impl CaseGold {
    pub fn new(diagnosis: GoldTermSet, treatment: GoldTermSet) -> Self {
        Self { diagnosis, treatment }
    }

    /// Build the gold standard as the union of all raters' annotations.
    pub fn from_raters(raters: &[RaterAnnotation]) -> Self {
        let cells = |field: Field| raters.iter().map(|r| r.field(field)).collect::<Vec<_>>();
        Self {
            diagnosis: GoldTermSet::from_raters(cells(Field::Diagnosis).as_slice()),
            treatment: GoldTermSet::from_raters(cells(Field::Treatment).as_slice()),
        }
    }

    pub fn field(&self, field: Field) -> &GoldTermSet {
        match field {
            Field::Diagnosis => &self.diagnosis,
            Field::Treatment => &self.treatment,
        }
    }
}

/// Precision/recall/F1 triple for a whole-string comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TextScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl TextScores {
    /// Both sides empty.
    pub const PERFECT: TextScores = TextScores {
        precision: 1.0,
        recall: 1.0,
        f1: 1.0,
    };

    /// Exactly one side empty.
    pub const ZERO: TextScores = TextScores {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
    };

    /// Build from an overlap count and the two sequence lengths.
    /// A zero length on either side gives `ZERO`.
    pub fn from_overlap(overlap: usize, predicted_len: usize, gold_len: usize) -> Self {
        if predicted_len == 0 || gold_len == 0 {
            return Self::ZERO;
        }
        let precision = overlap as f64 / predicted_len as f64;
        let recall = overlap as f64 / gold_len as f64;
        Self {
            precision,
            recall,
            f1: harmonic_mean(precision, recall),
        }
    }
}

/// F1 of a precision/recall pair; zero when both are zero.
pub fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Whole-string metrics for one field of one case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TextMetrics {
    pub rouge_l: TextScores,
    pub token_f1: TextScores,
}

/// Term matching plus text metrics for one field of one case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldEvaluation {
    pub matches: FieldMatchResult,
    pub text: TextMetrics,
}

/// Evaluation of both fields of one case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseEvaluation {
    pub diagnosis: FieldEvaluation,
    pub treatment: FieldEvaluation,
}

impl CaseEvaluation {
    pub fn field(&self, field: Field) -> &FieldEvaluation {
        match field {
            Field::Diagnosis => &self.diagnosis,
            Field::Treatment => &self.treatment,
        }
    }

    /// Binary correctness of a field (at least one true positive).
    pub fn is_correct(&self, field: Field) -> bool {
        self.field(field).matches.is_correct()
    }
}
