//! Inter-rater agreement.
//!
//! Two raters' term sets for the same case are compared as whole sets with
//! the matcher's tiers; the resulting binary agreements feed Cohen's kappa
//! and PABAK.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::matcher::{significant_words, TermMatcher};
use crate::models::{Field, MatchTier, RaterAnnotation};
use crate::terms::split_terms;

use super::{check_paired, StatsResult};

/// Why a pair of term sets was not scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    BothEmpty,
    OneEmpty,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::BothEmpty => "both_empty",
            SkipReason::OneEmpty => "one_empty",
        }
    }

    /// Skip reason for two set sizes, if either is empty.
    pub fn for_sizes(left: usize, right: usize) -> Option<Self> {
        match (left, right) {
            (0, 0) => Some(SkipReason::BothEmpty),
            (0, _) | (_, 0) => Some(SkipReason::OneEmpty),
            _ => None,
        }
    }
}

/// Scored comparison of two non-empty term sets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgreementOutcome {
    /// Strongest tier linking the two sets; `no_match` means disagreement
    pub tier: MatchTier,
}

impl AgreementOutcome {
    pub fn agrees(&self) -> bool {
        self.tier.is_match()
    }
}

/// Result of comparing two raters' term sets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetComparison {
    Scored(AgreementOutcome),
    Skipped(SkipReason),
}

impl SetComparison {
    /// The scored outcome; `None` when skipped.
    pub fn outcome(&self) -> Option<AgreementOutcome> {
        match self {
            SetComparison::Scored(outcome) => Some(*outcome),
            SetComparison::Skipped(_) => None,
        }
    }

    /// Level label: a tier name or a skip reason.
    pub fn level(&self) -> &'static str {
        match self {
            SetComparison::Scored(outcome) => outcome.tier.as_str(),
            SetComparison::Skipped(reason) => reason.as_str(),
        }
    }
}

/// Compare two term sets at set level.
///
/// Tiers, first hit wins: any shared vocabulary id, any shared significant
/// word across the union of each side's words, any cross pair passing the
/// fuzzy tier.
pub fn compare_term_sets<S: AsRef<str>>(matcher: &TermMatcher<'_>, a: &[S], b: &[S]) -> SetComparison {
    if let Some(reason) = SkipReason::for_sizes(a.len(), b.len()) {
        return SetComparison::Skipped(reason);
    }

    let ids = |terms: &[S]| -> HashSet<String> {
        terms.iter().filter_map(|t| matcher.resolve_id(t.as_ref())).collect()
    };
    let words = |terms: &[S]| -> HashSet<String> {
        terms.iter().flat_map(|t| significant_words(t.as_ref())).collect()
    };

    let tier = if !ids(a).is_disjoint(&ids(b)) {
        MatchTier::ItaMatch
    } else if !words(a).is_disjoint(&words(b)) {
        MatchTier::WordOverlap
    } else if a
        .iter()
        .any(|x| b.iter().any(|y| matcher.fuzzy_similar(x.as_ref(), y.as_ref())))
    {
        MatchTier::FuzzyMatch
    } else {
        MatchTier::NoMatch
    };

    SetComparison::Scored(AgreementOutcome { tier })
}

/// Cohen's kappa and PABAK over binary agreements.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct KappaStats {
    pub n: usize,
    pub agree: usize,
    pub disagree: usize,
    /// Observed agreement
    pub po: f64,
    /// Chance agreement
    pub pe: f64,
    pub kappa: f64,
    /// Prevalence-adjusted bias-adjusted kappa
    pub pabak: f64,
}

impl KappaStats {
    pub fn band(&self) -> KappaBand {
        KappaBand::from(self.kappa)
    }
}

/// Compute kappa statistics. No observations yields an all-zero record.
pub fn cohen_kappa(agreements: &[bool]) -> KappaStats {
    let n = agreements.len();
    if n == 0 {
        return KappaStats::default();
    }

    let agree = agreements.iter().filter(|&&a| a).count();
    let disagree = n - agree;
    let p_agree = agree as f64 / n as f64;
    let p_disagree = disagree as f64 / n as f64;

    let po = p_agree;
    let pe = p_agree * p_agree + p_disagree * p_disagree;
    let kappa = if pe < 1.0 { (po - pe) / (1.0 - pe) } else { 1.0 };

    KappaStats {
        n,
        agree,
        disagree,
        po,
        pe,
        kappa,
        pabak: 2.0 * po - 1.0,
    }
}

/// Landis & Koch interpretation bands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KappaBand {
    Poor,
    Slight,
    Fair,
    Moderate,
    Substantial,
    AlmostPerfect,
}

impl KappaBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            KappaBand::Poor => "Poor",
            KappaBand::Slight => "Slight",
            KappaBand::Fair => "Fair",
            KappaBand::Moderate => "Moderate",
            KappaBand::Substantial => "Substantial",
            KappaBand::AlmostPerfect => "Almost Perfect",
        }
    }
}

impl From<f64> for KappaBand {
    fn from(kappa: f64) -> Self {
        if kappa < 0.0 {
            KappaBand::Poor
        } else if kappa < 0.21 {
            KappaBand::Slight
        } else if kappa < 0.41 {
            KappaBand::Fair
        } else if kappa < 0.61 {
            KappaBand::Moderate
        } else if kappa < 0.81 {
            KappaBand::Substantial
        } else {
            KappaBand::AlmostPerfect
        }
    }
}

impl fmt::Display for KappaBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agreement between two raters on one field across a corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgreementReport {
    pub field: Field,
    /// One comparison per case, in case order
    pub comparisons: Vec<SetComparison>,
    /// Case counts per level (tier names and skip reasons)
    pub levels: BTreeMap<String, usize>,
    pub kappa: KappaStats,
    pub band: KappaBand,
}

impl AgreementReport {
    /// Cases excluded from kappa.
    pub fn skipped(&self) -> usize {
        self.comparisons.len() - self.kappa.n
    }
}

/// Compare two raters' annotations of the same cases on one field.
pub fn rater_agreement(
    matcher: &TermMatcher<'_>,
    rater_a: &[RaterAnnotation],
    rater_b: &[RaterAnnotation],
    field: Field,
) -> StatsResult<AgreementReport> {
    check_paired(rater_a.len(), rater_b.len())?;

    let comparisons: Vec<SetComparison> = rater_a
        .iter()
        .zip(rater_b)
        .map(|(a, b)| {
            let terms_a = split_terms(a.field(field));
            let terms_b = split_terms(b.field(field));
            compare_term_sets(matcher, &terms_a, &terms_b)
        })
        .collect();

    let mut levels = BTreeMap::new();
    for comparison in &comparisons {
        *levels.entry(comparison.level().to_string()).or_insert(0) += 1;
    }

    let agreements: Vec<bool> = comparisons
        .iter()
        .filter_map(SetComparison::outcome)
        .map(|outcome| outcome.agrees())
        .collect();
    let kappa = cohen_kappa(&agreements);

    if kappa.n == 0 && !comparisons.is_empty() {
        warn!(%field, cases = comparisons.len(), "every case skipped; kappa undefined");
    }
    debug!(%field, n = kappa.n, kappa = kappa.kappa, pabak = kappa.pabak, "rater agreement");

    Ok(AgreementReport {
        field,
        comparisons,
        levels,
        band: kappa.band(),
        kappa,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VocabularyEntry;
    use crate::stats::StatsError;
    use crate::vocab::VocabularyIndex;

    fn setup_vocab() -> VocabularyIndex {
        VocabularyIndex::build(vec![
            VocabularyEntry::from_row("ITA-1", "Fever", "Jvara"),
            VocabularyEntry::from_row("ITA-2", "Cough", "Kasa"),
        ])
        .unwrap()
    }

    #[test]
    fn test_compare_term_sets_tiers() {
        let vocab = setup_vocab();
        let matcher = TermMatcher::with_defaults(&vocab);

        let level = |a: &[&str], b: &[&str]| compare_term_sets(&matcher, a, b).level();
        assert_eq!(level(&["Jwara", "Pandu"], &["Fever"]), "ita_match");
        assert_eq!(level(&["Vataja Shirahshula"], &["Pittaja Shirahshula"]), "word_overlap");
        assert_eq!(level(&["Ardhavabhedaka"], &["Ardhavabhedak"]), "fuzzy_match");
        assert_eq!(level(&["Kamala"], &["Prameha"]), "no_match");
    }

    #[test]
    fn test_compare_term_sets_skips() {
        let vocab = setup_vocab();
        let matcher = TermMatcher::with_defaults(&vocab);

        let both = compare_term_sets::<&str>(&matcher, &[], &[]);
        assert_eq!(both, SetComparison::Skipped(SkipReason::BothEmpty));
        assert_eq!(both.outcome(), None);

        let one = compare_term_sets(&matcher, &["Jwara"], &[]);
        assert_eq!(one, SetComparison::Skipped(SkipReason::OneEmpty));
    }

    #[test]
    fn test_cohen_kappa() {
        let stats = cohen_kappa(&[true, true, true, false]);
        assert_eq!(stats.n, 4);
        assert_eq!(stats.agree, 3);
        assert_eq!(stats.po, 0.75);
        assert_eq!(stats.pe, 0.625);
        assert!((stats.kappa - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.pabak, 0.5);
        assert_eq!(stats.band(), KappaBand::Fair);
    }

    #[test]
    fn test_cohen_kappa_degenerate() {
        assert_eq!(cohen_kappa(&[]), KappaStats::default());

        let unanimous = cohen_kappa(&[true, true]);
        assert_eq!(unanimous.pe, 1.0);
        assert_eq!(unanimous.kappa, 1.0);
        assert_eq!(unanimous.pabak, 1.0);
    }

    #[test]
    fn test_kappa_bands() {
        assert_eq!(KappaBand::from(-0.1), KappaBand::Poor);
        assert_eq!(KappaBand::from(0.0), KappaBand::Slight);
        assert_eq!(KappaBand::from(0.21), KappaBand::Fair);
        assert_eq!(KappaBand::from(0.6), KappaBand::Moderate);
        assert_eq!(KappaBand::from(0.8), KappaBand::Substantial);
        assert_eq!(KappaBand::from(0.81), KappaBand::AlmostPerfect);
        assert_eq!(KappaBand::AlmostPerfect.to_string(), "Almost Perfect");
    }

    #[test]
    fn test_rater_agreement() {
        let vocab = setup_vocab();
        let matcher = TermMatcher::with_defaults(&vocab);

        let rater_a = vec![
            RaterAnnotation::new("Jwara", "Langhana"),
            RaterAnnotation::new("Kamala", ""),
            RaterAnnotation::new("", ""),
        ];
        let rater_b = vec![
            RaterAnnotation::new("Fever; Kasa", "Langhana"),
            RaterAnnotation::new("Prameha", "Virechana"),
            RaterAnnotation::new("", ""),
        ];

        let dx = rater_agreement(&matcher, &rater_a, &rater_b, Field::Diagnosis).unwrap();
        assert_eq!(dx.kappa.n, 2);
        assert_eq!(dx.kappa.agree, 1);
        assert_eq!(dx.skipped(), 1);
        assert_eq!(dx.levels["ita_match"], 1);
        assert_eq!(dx.levels["no_match"], 1);
        assert_eq!(dx.levels["both_empty"], 1);

        let tx = rater_agreement(&matcher, &rater_a, &rater_b, Field::Treatment).unwrap();
        assert_eq!(tx.kappa.n, 1);
        assert_eq!(tx.levels["one_empty"], 1);
        assert_eq!(tx.levels["both_empty"], 1);
    }

    #[test]
    fn test_rater_agreement_shape_error() {
        let vocab = setup_vocab();
        let matcher = TermMatcher::with_defaults(&vocab);
        let result = rater_agreement(&matcher, &[RaterAnnotation::default()], &[], Field::Diagnosis);
        assert_eq!(result.unwrap_err(), StatsError::Shape { left: 1, right: 0 });
    }
}
