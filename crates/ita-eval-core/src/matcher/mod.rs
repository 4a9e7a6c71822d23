//! Tiered term matcher.
//!
//! Tiers, tried in priority order for every predicted/gold pair:
//! - ITA match: both terms resolve to the same vocabulary id
//! - Word overlap: the terms share a significant clinical word
//! - Fuzzy match: normalized Levenshtein similarity >= fuzzy threshold
//!
//! Assignment is greedy in prediction order. Each predicted term takes the
//! unconsumed gold term with the strongest tier (first gold term wins ties)
//! and consumes it. This is not an optimal bipartite assignment; scores
//! depend on that order.

mod words;

pub use words::*;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::MatcherConfig;
use crate::metrics::compute_text_metrics;
use crate::models::{
    CaseEvaluation, CaseGold, CasePrediction, FieldEvaluation, FieldMatchResult, GoldTermSet,
    MatchTier, TermMatch, TierBreakdown,
};
use crate::terms::split_terms;
use crate::vocab::{normalized_similarity, VocabularyIndex};
use crate::{EvalError, EvalResult};

/// Shortest cleaned term eligible for the fuzzy tier.
const MIN_FUZZY_LEN: usize = 3;

/// Everything the tiers need about one term, computed once per call.
#[derive(Debug, Clone)]
struct TermFeatures {
    ita_id: Option<String>,
    words: HashSet<String>,
    clean: String,
    clean_len: usize,
}

/// Matcher bound to a shared vocabulary index.
#[derive(Debug, Clone)]
pub struct TermMatcher<'a> {
    vocab: &'a VocabularyIndex,
    config: MatcherConfig,
}

impl<'a> TermMatcher<'a> {
    /// Create a matcher with explicit thresholds.
    pub fn new(vocab: &'a VocabularyIndex, config: MatcherConfig) -> Self {
        Self { vocab, config }
    }

    /// Create a matcher with the default thresholds.
    pub fn with_defaults(vocab: &'a VocabularyIndex) -> Self {
        Self::new(vocab, MatcherConfig::default())
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn vocab(&self) -> &VocabularyIndex {
        self.vocab
    }

    /// Resolve a term to a vocabulary id (Sanskrit space, then English).
    pub fn resolve_id(&self, term: &str) -> Option<String> {
        self.vocab
            .resolve(term, self.config.vocab_threshold)
            .map(|hit| hit.id)
            .filter(|id| !id.is_empty())
    }

    /// Whether two terms pass the fuzzy tier.
    pub fn fuzzy_similar(&self, a: &str, b: &str) -> bool {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        a.chars().count() >= MIN_FUZZY_LEN
            && b.chars().count() >= MIN_FUZZY_LEN
            && normalized_similarity(&a, &b) >= self.config.fuzzy_threshold
    }

    /// Classify a single pair, resolving vocabulary ids on the spot.
    pub fn classify(&self, predicted: &str, gold: &str) -> MatchTier {
        let p = self.features(predicted);
        let g = self.features(gold);
        self.classify_features(&p, &g)
    }

    /// Greedy term-level matching of one field.
    pub fn match_field<S: AsRef<str>>(&self, predicted: &[S], gold: &GoldTermSet) -> FieldMatchResult {
        if predicted.is_empty() && gold.is_empty() {
            return FieldMatchResult::default();
        }

        let cache = self.feature_cache(predicted.iter().map(|term| term.as_ref()).chain(gold.iter()));

        let mut remaining: Vec<&str> = gold.iter().collect();
        let mut term_matches = Vec::with_capacity(predicted.len());
        let mut tier_breakdown = TierBreakdown::new();

        for pred in predicted {
            let pred = pred.as_ref();
            let p = &cache[pred];
            let mut best: Option<(usize, MatchTier)> = None;

            for (pos, gold_term) in remaining.iter().enumerate() {
                let tier = self.classify_features(p, &cache[gold_term]);
                if tier.is_match() && best.map_or(true, |(_, best_tier)| tier < best_tier) {
                    best = Some((pos, tier));
                    if tier == MatchTier::ItaMatch {
                        break;
                    }
                }
            }

            let term_match = match best {
                Some((pos, tier)) => TermMatch {
                    predicted: pred.to_string(),
                    gold: Some(remaining.remove(pos).to_string()),
                    tier,
                },
                None => TermMatch {
                    predicted: pred.to_string(),
                    gold: None,
                    tier: MatchTier::NoMatch,
                },
            };
            tier_breakdown.record(term_match.tier);
            term_matches.push(term_match);
        }

        let true_positive = term_matches.iter().filter(|m| m.matched()).count();
        let result = FieldMatchResult {
            true_positive,
            false_positive: term_matches.len() - true_positive,
            false_negative: remaining.len(),
            tier_breakdown,
            term_matches,
            unmatched_gold: remaining.into_iter().map(str::to_string).collect(),
        };

        debug!(
            tp = result.true_positive,
            fp = result.false_positive,
            fn_ = result.false_negative,
            "matched field"
        );

        result
    }

    /// Split a raw prediction, match it and compute the text metrics.
    pub fn evaluate_field(&self, predicted_raw: &str, gold: &GoldTermSet) -> FieldEvaluation {
        let predicted = split_terms(predicted_raw);
        FieldEvaluation {
            matches: self.match_field(&predicted, gold),
            text: compute_text_metrics(predicted_raw, &gold.joined()),
        }
    }

    /// Evaluate both fields of a case. Absent predictions are empty strings.
    pub fn evaluate_case(
        &self,
        predicted_diagnosis: &str,
        predicted_treatment: &str,
        gold: &CaseGold,
    ) -> CaseEvaluation {
        CaseEvaluation {
            diagnosis: self.evaluate_field(predicted_diagnosis, &gold.diagnosis),
            treatment: self.evaluate_field(predicted_treatment, &gold.treatment),
        }
    }

    /// Evaluate a corpus of aligned predictions and gold standards.
    pub fn evaluate_cases(
        &self,
        predictions: &[CasePrediction],
        golds: &[CaseGold],
    ) -> EvalResult<Vec<CaseEvaluation>> {
        if predictions.len() != golds.len() {
            return Err(EvalError::Shape {
                left: predictions.len(),
                right: golds.len(),
            });
        }
        Ok(predictions
            .iter()
            .zip(golds)
            .map(|(prediction, gold)| {
                self.evaluate_case(&prediction.diagnosis, &prediction.treatment, gold)
            })
            .collect())
    }

    fn features(&self, term: &str) -> TermFeatures {
        let clean = term.trim().to_lowercase();
        TermFeatures {
            ita_id: self.resolve_id(term),
            words: significant_words(term),
            clean_len: clean.chars().count(),
            clean,
        }
    }

    /// Features for every distinct term, resolved once.
    fn feature_cache<'t>(&self, terms: impl Iterator<Item = &'t str>) -> HashMap<&'t str, TermFeatures> {
        let mut cache = HashMap::new();
        for term in terms {
            cache.entry(term).or_insert_with(|| self.features(term));
        }
        cache
    }

    fn classify_features(&self, p: &TermFeatures, g: &TermFeatures) -> MatchTier {
        if let (Some(p_id), Some(g_id)) = (&p.ita_id, &g.ita_id) {
            if p_id == g_id {
                return MatchTier::ItaMatch;
            }
        }

        if !p.words.is_disjoint(&g.words) {
            return MatchTier::WordOverlap;
        }

        if p.clean_len >= MIN_FUZZY_LEN
            && g.clean_len >= MIN_FUZZY_LEN
            && normalized_similarity(&p.clean, &g.clean) >= self.config.fuzzy_threshold
        {
            return MatchTier::FuzzyMatch;
        }

        MatchTier::NoMatch
    }
}
