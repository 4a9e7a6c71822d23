//! Term matching models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Evidence class used to accept a term match.
///
/// Variants are declared in priority order, so `Ord` ranks a stronger tier
/// below a weaker one (`ItaMatch < WordOverlap < FuzzyMatch < NoMatch`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Both terms resolve to the same vocabulary id
    ItaMatch,
    /// The terms share a significant clinical word
    WordOverlap,
    /// Normalized edit similarity at or above the fuzzy threshold
    FuzzyMatch,
    /// No evidence
    NoMatch,
}

impl MatchTier {
    /// Stable snake_case label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::ItaMatch => "ita_match",
            MatchTier::WordOverlap => "word_overlap",
            MatchTier::FuzzyMatch => "fuzzy_match",
            MatchTier::NoMatch => "no_match",
        }
    }

    /// Whether this tier accepts the pair.
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchTier::NoMatch)
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one predicted term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermMatch {
    /// The predicted term
    pub predicted: String,
    /// Gold term it consumed, if any
    pub gold: Option<String>,
    /// Tier that accepted the pair (`NoMatch` when `gold` is `None`)
    pub tier: MatchTier,
}

impl TermMatch {
    pub fn matched(&self) -> bool {
        self.gold.is_some()
    }
}

/// Count of term matches per tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TierBreakdown(BTreeMap<MatchTier, usize>);

impl TierBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for a tier.
    pub fn record(&mut self, tier: MatchTier) {
        *self.0.entry(tier).or_insert(0) += 1;
    }

    /// Add every count from another breakdown.
    pub fn merge(&mut self, other: &TierBreakdown) {
        for (tier, count) in &other.0 {
            *self.0.entry(*tier).or_insert(0) += count;
        }
    }

    /// Count for a tier (zero when absent).
    pub fn get(&self, tier: MatchTier) -> usize {
        self.0.get(&tier).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MatchTier, usize)> + '_ {
        self.0.iter().map(|(tier, count)| (*tier, *count))
    }
}

impl FromIterator<(MatchTier, usize)> for TierBreakdown {
    fn from_iter<I: IntoIterator<Item = (MatchTier, usize)>>(iter: I) -> Self {
        let mut breakdown = TierBreakdown::new();
        for (tier, count) in iter {
            *breakdown.0.entry(tier).or_insert(0) += count;
        }
        breakdown
    }
}

/// Term-level result of matching one field of one case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldMatchResult {
    /// Predicted terms that consumed a gold term
    pub true_positive: usize,
    /// Predicted terms with no gold counterpart
    pub false_positive: usize,
    /// Gold terms never consumed
    pub false_negative: usize,
    /// Matches per tier, including `no_match` for unmatched predictions
    pub tier_breakdown: TierBreakdown,
    /// One entry per predicted term, in prediction order
    #[serde(default)]
    pub term_matches: Vec<TermMatch>,
    /// Gold terms left in the pool, in gold order
    #[serde(default)]
    pub unmatched_gold: Vec<String>,
}

impl FieldMatchResult {
    /// Number of predicted terms scored.
    pub fn predicted_count(&self) -> usize {
        self.true_positive + self.false_positive
    }

    /// Number of gold terms scored.
    pub fn gold_count(&self) -> usize {
        self.true_positive + self.false_negative
    }

    /// Whether either side had any terms.
    pub fn has_terms(&self) -> bool {
        self.predicted_count() > 0 || self.gold_count() > 0
    }

    /// Binary per-case correctness: at least one predicted term matched.
    pub fn is_correct(&self) -> bool {
        self.true_positive > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_priority_order() {
        assert!(MatchTier::ItaMatch < MatchTier::WordOverlap);
        assert!(MatchTier::WordOverlap < MatchTier::FuzzyMatch);
        assert!(MatchTier::FuzzyMatch < MatchTier::NoMatch);
    }

    #[test]
    fn test_tier_serializes_snake_case() {
        let json = serde_json::to_string(&MatchTier::ItaMatch).unwrap();
        assert_eq!(json, "\"ita_match\"");
        assert_eq!(MatchTier::NoMatch.to_string(), "no_match");
    }

    #[test]
    fn test_breakdown_record_and_merge() {
        let mut a = TierBreakdown::new();
        a.record(MatchTier::ItaMatch);
        a.record(MatchTier::NoMatch);

        let mut b = TierBreakdown::new();
        b.record(MatchTier::NoMatch);
        b.record(MatchTier::FuzzyMatch);

        a.merge(&b);
        assert_eq!(a.get(MatchTier::ItaMatch), 1);
        assert_eq!(a.get(MatchTier::NoMatch), 2);
        assert_eq!(a.get(MatchTier::FuzzyMatch), 1);
        assert_eq!(a.get(MatchTier::WordOverlap), 0);
        assert_eq!(a.total(), 4);
    }

    #[test]
    fn test_breakdown_serializes_as_map() {
        let breakdown: TierBreakdown =
            [(MatchTier::ItaMatch, 1), (MatchTier::NoMatch, 1)].into_iter().collect();
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json, serde_json::json!({"ita_match": 1, "no_match": 1}));
    }

    #[test]
    fn test_field_result_counts() {
        let result = FieldMatchResult {
            true_positive: 1,
            false_positive: 1,
            false_negative: 2,
            tier_breakdown: TierBreakdown::new(),
            term_matches: vec![
                TermMatch {
                    predicted: "jwara".into(),
                    gold: Some("jvara".into()),
                    tier: MatchTier::ItaMatch,
                },
                TermMatch {
                    predicted: "kasa".into(),
                    gold: None,
                    tier: MatchTier::NoMatch,
                },
            ],
            unmatched_gold: vec!["pandu".into(), "shotha".into()],
        };

        assert_eq!(result.predicted_count(), 2);
        assert_eq!(result.gold_count(), 3);
        assert!(result.has_terms());
        assert!(result.is_correct());
        assert!(!FieldMatchResult::default().has_terms());
    }

    #[test]
    fn test_counts_only_result_has_terms() {
        let result: FieldMatchResult = serde_json::from_value(serde_json::json!({
            "true_positive": 0,
            "false_positive": 2,
            "false_negative": 0,
            "tier_breakdown": {"no_match": 2}
        }))
        .unwrap();

        assert!(result.term_matches.is_empty());
        assert_eq!(result.predicted_count(), 2);
        assert!(result.has_terms());
        assert!(!result.is_correct());
    }
}
