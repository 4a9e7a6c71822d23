//! Corpus-level metric and significance models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::matching::TierBreakdown;
use crate::config::ConfigError;

/// Micro-averaged term-level counts and ratios.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TermLevelMetrics {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub tier_breakdown: TierBreakdown,
}

/// Aggregate metrics for one field across a corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorpusMetrics {
    /// Cases with any predicted or gold terms
    pub n_scored: usize,
    /// `n_correct / n_scored` (0.0 when nothing was scored)
    pub accuracy: f64,
    /// Scored cases with at least one true positive
    pub n_correct: usize,
    /// Macro-averaged LCS F1
    pub rouge_l: f64,
    /// Macro-averaged bag-of-tokens F1
    pub token_f1: f64,
    pub term_level: TermLevelMetrics,
}

impl CorpusMetrics {
    /// Look up a named scalar.
    pub fn value(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::Accuracy => self.accuracy,
            MetricName::RougeL => self.rouge_l,
            MetricName::TokenF1 => self.token_f1,
            MetricName::TermPrecision => self.term_level.precision,
            MetricName::TermRecall => self.term_level.recall,
            MetricName::TermF1 => self.term_level.f1,
        }
    }
}

/// Scalars of [`CorpusMetrics`] that can be bootstrapped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    Accuracy,
    RougeL,
    TokenF1,
    TermPrecision,
    TermRecall,
    TermF1,
}

impl MetricName {
    /// Metrics reported with confidence intervals by default.
    pub const HEADLINE: [MetricName; 3] = [MetricName::Accuracy, MetricName::RougeL, MetricName::TokenF1];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Accuracy => "accuracy",
            MetricName::RougeL => "rouge_l",
            MetricName::TokenF1 => "token_f1",
            MetricName::TermPrecision => "term_precision",
            MetricName::TermRecall => "term_recall",
            MetricName::TermF1 => "term_f1",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accuracy" => Ok(MetricName::Accuracy),
            "rouge_l" | "rouge-l" => Ok(MetricName::RougeL),
            "token_f1" | "token-f1" => Ok(MetricName::TokenF1),
            "term_precision" | "precision" => Ok(MetricName::TermPrecision),
            "term_recall" | "recall" => Ok(MetricName::TermRecall),
            "term_f1" | "f1" => Ok(MetricName::TermF1),
            other => Err(ConfigError::UnknownMetric(other.to_string())),
        }
    }
}

/// Discordant pair counts of a paired test.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscordantCounts {
    /// Cases where A is correct and B is not
    #[serde(rename = "b")]
    pub a_better: usize,
    /// Cases where B is correct and A is not
    #[serde(rename = "c")]
    pub b_better: usize,
}

/// McNemar test outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SignificanceResult {
    pub discordant_counts: DiscordantCounts,
    pub chi_square: f64,
    pub p_value: f64,
}

impl SignificanceResult {
    pub fn discordant_a_better(&self) -> usize {
        self.discordant_counts.a_better
    }

    pub fn discordant_b_better(&self) -> usize {
        self.discordant_counts.b_better
    }

    /// Whether the difference is significant at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Percentile bootstrap interval around a point estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceInterval {
    pub point_estimate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.ci_upper - self.ci_lower
    }

    pub fn contains(&self, value: f64) -> bool {
        self.ci_lower <= value && value <= self.ci_upper
    }
}
