//! Corpus aggregation of per-case field evaluations.
//!
//! - accuracy over cases with any terms (correct = at least one true positive)
//! - macro means of the text metrics over every case
//! - micro term-level precision/recall/F1 from summed counts

use serde::{Deserialize, Serialize};

use crate::models::{
    harmonic_mean, CaseEvaluation, CorpusMetrics, Field, FieldEvaluation, TermLevelMetrics,
    TierBreakdown,
};

/// Corpus metrics for both fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldReport {
    pub diagnosis: CorpusMetrics,
    pub treatment: CorpusMetrics,
}

impl FieldReport {
    pub fn field(&self, field: Field) -> &CorpusMetrics {
        match field {
            Field::Diagnosis => &self.diagnosis,
            Field::Treatment => &self.treatment,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Aggregate one field's evaluations. An empty corpus yields all zeros.
pub fn aggregate<'a, I>(evaluations: I) -> CorpusMetrics
where
    I: IntoIterator<Item = &'a FieldEvaluation>,
{
    let mut n_cases = 0usize;
    let mut n_scored = 0usize;
    let mut n_correct = 0usize;
    let mut rouge_sum = 0.0;
    let mut token_sum = 0.0;
    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    let mut tier_breakdown = TierBreakdown::new();

    for evaluation in evaluations {
        let matches = &evaluation.matches;
        n_cases += 1;
        if matches.has_terms() {
            n_scored += 1;
            if matches.is_correct() {
                n_correct += 1;
            }
        }
        rouge_sum += evaluation.text.rouge_l.f1;
        token_sum += evaluation.text.token_f1.f1;
        tp += matches.true_positive;
        fp += matches.false_positive;
        fn_ += matches.false_negative;
        tier_breakdown.merge(&matches.tier_breakdown);
    }

    let (rouge_l, token_f1) = if n_cases == 0 {
        (0.0, 0.0)
    } else {
        (rouge_sum / n_cases as f64, token_sum / n_cases as f64)
    };

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);

    CorpusMetrics {
        n_scored,
        accuracy: ratio(n_correct, n_scored),
        n_correct,
        rouge_l,
        token_f1,
        term_level: TermLevelMetrics {
            tp,
            fp,
            fn_,
            precision,
            recall,
            f1: harmonic_mean(precision, recall),
            tier_breakdown,
        },
    }
}

/// Aggregate one field across a corpus of case evaluations.
pub fn aggregate_field(cases: &[CaseEvaluation], field: Field) -> CorpusMetrics {
    aggregate(cases.iter().map(|case| case.field(field)))
}

/// Aggregate both fields.
pub fn aggregate_all(cases: &[CaseEvaluation]) -> FieldReport {
    FieldReport {
        diagnosis: aggregate_field(cases, Field::Diagnosis),
        treatment: aggregate_field(cases, Field::Treatment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldMatchResult, MatchTier, TextMetrics, TextScores};

    fn evaluation(tp: usize, fp: usize, fn_: usize, rouge: f64) -> FieldEvaluation {
        let mut tier_breakdown = TierBreakdown::new();
        for _ in 0..tp {
            tier_breakdown.record(MatchTier::ItaMatch);
        }
        for _ in 0..fp {
            tier_breakdown.record(MatchTier::NoMatch);
        }
        let scores = TextScores {
            precision: rouge,
            recall: rouge,
            f1: rouge,
        };
        FieldEvaluation {
            matches: FieldMatchResult {
                true_positive: tp,
                false_positive: fp,
                false_negative: fn_,
                tier_breakdown,
                term_matches: Vec::new(),
                unmatched_gold: vec!["gold".to_string(); fn_],
            },
            text: TextMetrics {
                rouge_l: scores,
                token_f1: scores,
            },
        }
    }

    #[test]
    fn test_aggregate_empty_corpus() {
        let metrics = aggregate(std::iter::empty());
        assert_eq!(metrics, CorpusMetrics::default());
    }

    #[test]
    fn test_accuracy_skips_cases_without_terms() {
        let evals = vec![
            evaluation(1, 0, 0, 1.0),
            evaluation(0, 1, 1, 0.0),
            // no terms on either side: text metric counts, accuracy does not
            evaluation(0, 0, 0, 1.0),
        ];
        let metrics = aggregate(&evals);
        assert_eq!(metrics.n_scored, 2);
        assert_eq!(metrics.n_correct, 1);
        assert_eq!(metrics.accuracy, 0.5);
        assert!((metrics.rouge_l - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_micro_term_metrics() {
        // per-case precision would average to 0.75; summed counts give 3/5
        let evals = vec![evaluation(1, 0, 0, 0.0), evaluation(2, 2, 1, 0.0)];
        let metrics = aggregate(&evals);
        let term = &metrics.term_level;
        assert_eq!((term.tp, term.fp, term.fn_), (3, 2, 1));
        assert_eq!(term.precision, 0.6);
        assert_eq!(term.recall, 0.75);
        assert!((term.f1 - 2.0 * 0.6 * 0.75 / 1.35).abs() < 1e-12);
        assert_eq!(term.tier_breakdown.get(MatchTier::ItaMatch), 3);
        assert_eq!(term.tier_breakdown.get(MatchTier::NoMatch), 2);
    }

    #[test]
    fn test_zero_denominators() {
        let metrics = aggregate(&[evaluation(0, 0, 2, 0.0)]);
        assert_eq!(metrics.term_level.precision, 0.0);
        assert_eq!(metrics.term_level.recall, 0.0);
        assert_eq!(metrics.term_level.f1, 0.0);
        assert_eq!(metrics.accuracy, 0.0);
    }

    #[test]
    fn test_prediction_only_case_is_scored() {
        let only_fp = FieldEvaluation {
            matches: FieldMatchResult {
                false_positive: 2,
                ..FieldMatchResult::default()
            },
            text: TextMetrics {
                rouge_l: TextScores::ZERO,
                token_f1: TextScores::ZERO,
            },
        };
        let metrics = aggregate(&[only_fp]);
        assert_eq!(metrics.n_scored, 1);
        assert_eq!(metrics.n_correct, 0);
        assert_eq!(metrics.accuracy, 0.0);
    }

    #[test]
    fn test_aggregate_all_splits_fields() {
        let cases = vec![CaseEvaluation {
            diagnosis: evaluation(1, 0, 0, 1.0),
            treatment: evaluation(0, 1, 0, 0.0),
        }];
        let report = aggregate_all(&cases);
        assert_eq!(report.field(Field::Diagnosis).accuracy, 1.0);
        assert_eq!(report.field(Field::Treatment).n_scored, 1);
        assert_eq!(report.field(Field::Treatment).accuracy, 0.0);
    }

    #[test]
    fn test_output_shape() {
        let metrics = aggregate(&[evaluation(1, 0, 0, 1.0)]);
        let json = serde_json::to_value(&metrics).unwrap();
        for key in ["n_scored", "accuracy", "n_correct", "rouge_l", "token_f1", "term_level"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["term_level"]["fn"], 0);
        assert_eq!(json["term_level"]["tier_breakdown"]["ita_match"], 1);
    }
}
