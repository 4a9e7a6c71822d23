//! ITA Eval Core Library
//!
//! Scores free-text clinical predictions (Ayurvedic diagnoses and
//! treatments) against a multi-rater gold standard, using the ITA
//! controlled vocabulary to recognise synonyms across English and Sanskrit.
//!
//! # Architecture
//!
//! ```text
//! Vocabulary rows ──► VocabularyIndex (built once, read-only)
//!                              │
//! Prediction text ──► split_terms ──┐
//!                                   ▼
//! Rater cells ──► GoldTermSet ──► TermMatcher ──► FieldMatchResult
//!                                   │               + TextMetrics
//!                                   ▼
//!                            CaseEvaluation (per case)
//!                                   │
//!                 ┌─────────────────┼─────────────────┐
//!                 ▼                 ▼                 ▼
//!            aggregate         bootstrap_ci        mcnemar
//!          CorpusMetrics    ConfidenceInterval  SignificanceResult
//!                 └─────────────────┼─────────────────┘
//!                                   ▼
//!                              StatsReport
//! ```
//!
//! # Core Principle
//!
//! **Deterministic scoring.** Fixed inputs, thresholds and seed reproduce
//! every number bit for bit, bootstrap intervals included.
//!
//! # Modules
//!
//! - [`vocab`]: ITA vocabulary index with exact and fuzzy lookup
//! - [`terms`]: Splitting of free-text cells into clean terms
//! - [`matcher`]: Tiered term matcher and per-case evaluation
//! - [`metrics`]: Text similarity metrics and corpus aggregation
//! - [`stats`]: McNemar, bootstrap, inter-rater agreement, reports
//! - [`models`]: Domain types shared by all of the above
//! - [`config`]: Thresholds and resampling settings

pub mod config;
pub mod matcher;
pub mod metrics;
pub mod models;
pub mod stats;
pub mod terms;
pub mod vocab;

// Re-export commonly used types
pub use config::{EvalConfig, MatcherConfig};
pub use matcher::TermMatcher;
pub use metrics::{aggregate, aggregate_all, aggregate_field, compute_text_metrics, FieldReport};
pub use models::{
    CaseEvaluation, CaseGold, CasePrediction, ConfidenceInterval, CorpusMetrics, Field,
    FieldMatchResult, GoldTermSet, MatchTier, MetricName, RaterAnnotation, SignificanceResult,
    VocabularyEntry,
};
pub use stats::{bootstrap_ci, cohen_kappa, compare_sources, mcnemar, StatsReport};
pub use terms::split_terms;
pub use vocab::VocabularyIndex;

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Paired inputs differ in length: {left} vs {right}")]
    Shape { left: usize, right: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

impl From<vocab::VocabError> for EvalError {
    fn from(e: vocab::VocabError) -> Self {
        EvalError::Config(e.to_string())
    }
}

impl From<config::ConfigError> for EvalError {
    fn from(e: config::ConfigError) -> Self {
        EvalError::Config(e.to_string())
    }
}

impl From<stats::StatsError> for EvalError {
    fn from(e: stats::StatsError) -> Self {
        match e {
            stats::StatsError::Shape { left, right } => EvalError::Shape { left, right },
            stats::StatsError::InsufficientData(msg) => EvalError::InsufficientData(msg),
        }
    }
}
