//! Multi-source comparison report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ConfigError, EvalConfig};
use crate::metrics::aggregate_field;
use crate::models::{CaseEvaluation, ConfidenceInterval, CorpusMetrics, Field, MetricName, SignificanceResult};
use crate::EvalResult;

use super::{bootstrap_ci, mcnemar_cases};

/// Corpus metrics and headline intervals for one field of one source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSummary {
    pub metrics: CorpusMetrics,
    pub intervals: BTreeMap<MetricName, ConfidenceInterval>,
}

/// Everything reported for one prediction source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSummary {
    pub n_cases: usize,
    pub diagnosis: FieldSummary,
    pub treatment: FieldSummary,
}

impl SourceSummary {
    pub fn field(&self, field: Field) -> &FieldSummary {
        match field {
            Field::Diagnosis => &self.diagnosis,
            Field::Treatment => &self.treatment,
        }
    }
}

/// Paired significance of source A against source B.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairComparison {
    pub source_a: String,
    pub source_b: String,
    pub diagnosis: SignificanceResult,
    pub treatment: SignificanceResult,
}

impl PairComparison {
    pub fn field(&self, field: Field) -> &SignificanceResult {
        match field {
            Field::Diagnosis => &self.diagnosis,
            Field::Treatment => &self.treatment,
        }
    }
}

/// Full statistics report across prediction sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsReport {
    pub config: EvalConfig,
    pub sources: BTreeMap<String, SourceSummary>,
    pub comparison: Option<PairComparison>,
}

impl StatsReport {
    pub fn source(&self, name: &str) -> Option<&SourceSummary> {
        self.sources.get(name)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn summarize_field(cases: &[CaseEvaluation], field: Field, config: &EvalConfig) -> EvalResult<FieldSummary> {
    let metrics = aggregate_field(cases, field);
    let mut intervals = BTreeMap::new();
    if !cases.is_empty() {
        for metric in MetricName::HEADLINE {
            let ci = bootstrap_ci(cases, field, metric, config.n_bootstrap, config.seed)?;
            intervals.insert(metric, ci);
        }
    }
    Ok(FieldSummary { metrics, intervals })
}

fn lookup<'s>(
    sources: &'s BTreeMap<String, Vec<CaseEvaluation>>,
    name: &str,
) -> EvalResult<&'s [CaseEvaluation]> {
    sources
        .get(name)
        .map(Vec::as_slice)
        .ok_or_else(|| ConfigError::UnknownSource(name.to_string()).into())
}

/// Aggregate, bootstrap and optionally McNemar-compare prediction sources.
///
/// Sources with no cases get metrics but no intervals.
pub fn compare_sources(
    sources: &BTreeMap<String, Vec<CaseEvaluation>>,
    pair: Option<(&str, &str)>,
    config: &EvalConfig,
) -> EvalResult<StatsReport> {
    config.validate()?;

    let comparison = match pair {
        Some((name_a, name_b)) => {
            let a = lookup(sources, name_a)?;
            let b = lookup(sources, name_b)?;
            Some(PairComparison {
                source_a: name_a.to_string(),
                source_b: name_b.to_string(),
                diagnosis: mcnemar_cases(a, b, Field::Diagnosis)?,
                treatment: mcnemar_cases(a, b, Field::Treatment)?,
            })
        }
        None => None,
    };

    let mut summaries = BTreeMap::new();
    for (name, cases) in sources {
        let summary = SourceSummary {
            n_cases: cases.len(),
            diagnosis: summarize_field(cases, Field::Diagnosis, config)?,
            treatment: summarize_field(cases, Field::Treatment, config)?,
        };
        summaries.insert(name.clone(), summary);
    }

    info!(
        sources = summaries.len(),
        paired = comparison.is_some(),
        n_bootstrap = config.n_bootstrap,
        "assembled stats report"
    );

    Ok(StatsReport {
        config: config.clone(),
        sources: summaries,
        comparison,
    })
}
