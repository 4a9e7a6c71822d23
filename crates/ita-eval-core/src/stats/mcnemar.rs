//! McNemar test on paired binary correctness.

use tracing::debug;

use crate::models::{CaseEvaluation, DiscordantCounts, Field, SignificanceResult};

use super::{check_paired, StatsResult};

/// Uncorrected McNemar test, one degree of freedom.
///
/// `b` counts cases where `a` is correct and `b` is not, `c` the reverse.
/// With no discordant pairs the result is chi-square 0 and p-value 1.
pub fn mcnemar(a: &[bool], b: &[bool]) -> StatsResult<SignificanceResult> {
    check_paired(a.len(), b.len())?;

    let mut counts = DiscordantCounts::default();
    for (&left, &right) in a.iter().zip(b) {
        match (left, right) {
            (true, false) => counts.a_better += 1,
            (false, true) => counts.b_better += 1,
            _ => {}
        }
    }

    let discordant = counts.a_better + counts.b_better;
    let (chi_square, p_value) = if discordant == 0 {
        (0.0, 1.0)
    } else {
        let diff = counts.a_better as f64 - counts.b_better as f64;
        let chi_square = diff * diff / discordant as f64;
        (chi_square, chi_square_sf_1df(chi_square))
    };

    debug!(b = counts.a_better, c = counts.b_better, chi_square, p_value, "mcnemar");

    Ok(SignificanceResult {
        discordant_counts: counts,
        chi_square,
        p_value,
    })
}

/// McNemar test on one field of two aligned case lists.
pub fn mcnemar_cases(
    a: &[CaseEvaluation],
    b: &[CaseEvaluation],
    field: Field,
) -> StatsResult<SignificanceResult> {
    let correct = |cases: &[CaseEvaluation]| -> Vec<bool> {
        cases.iter().map(|case| case.is_correct(field)).collect()
    };
    mcnemar(&correct(a), &correct(b))
}

/// Right tail of the chi-square distribution with one degree of freedom.
pub fn chi_square_sf_1df(chi_square: f64) -> f64 {
    erfc((chi_square / 2.0).sqrt()).clamp(0.0, 1.0)
}

/// Complementary error function, Chebyshev fit with fractional error
/// below 1.2e-7 everywhere.
pub fn erfc(x: f64) -> f64 {
    const COEFFS: [f64; 10] = [
        -1.265_512_23,
        1.000_023_68,
        0.374_091_96,
        0.096_784_18,
        -0.186_288_06,
        0.278_868_07,
        -1.135_203_98,
        1.488_515_87,
        -0.822_152_23,
        0.170_872_77,
    ];

    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = COEFFS.iter().rev().fold(0.0, |acc, &c| c + t * acc);
    let tail = t * (-z * z + poly).exp();
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsError;

    #[test]
    fn test_erfc_known_values() {
        assert!((erfc(0.0) - 1.0).abs() < 1e-6);
        assert!((erfc(1.0) - 0.157_299_207).abs() < 1e-6);
        assert!((erfc(-1.0) - 1.842_700_793).abs() < 1e-6);
        assert!(erfc(6.0) < 1e-15);
    }

    #[test]
    fn test_p_value_at_critical_chi_square() {
        // 3.841 is the 5% critical value for one degree of freedom
        assert!((chi_square_sf_1df(3.841_458_8) - 0.05).abs() < 1e-5);
        assert_eq!(chi_square_sf_1df(0.0), 1.0);
    }

    #[test]
    fn test_mcnemar_balanced_discordance() {
        let result = mcnemar(&[true, true, false, false], &[true, false, false, true]).unwrap();
        assert_eq!(result.discordant_a_better(), 1);
        assert_eq!(result.discordant_b_better(), 1);
        assert_eq!(result.chi_square, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_mcnemar_no_discordance() {
        let result = mcnemar(&[true, false], &[true, false]).unwrap();
        assert_eq!(result.chi_square, 0.0);
        assert_eq!(result.p_value, 1.0);

        let empty = mcnemar(&[], &[]).unwrap();
        assert_eq!(empty.p_value, 1.0);
    }

    #[test]
    fn test_mcnemar_one_sided() {
        let a = vec![true; 10];
        let b = vec![false; 10];
        let result = mcnemar(&a, &b).unwrap();
        assert_eq!(result.discordant_a_better(), 10);
        assert_eq!(result.chi_square, 10.0);
        assert!(result.p_value < 0.01);
        assert!(result.is_significant(0.05));
    }

    #[test]
    fn test_mcnemar_shape_error() {
        let result = mcnemar(&[true], &[true, false]);
        assert_eq!(result.unwrap_err(), StatsError::Shape { left: 1, right: 2 });
    }

    #[test]
    fn test_serialized_shape() {
        let result = mcnemar(&[true, true, false], &[false, true, true]).unwrap();
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["discordant_counts"]["b"], 1);
        assert_eq!(json["discordant_counts"]["c"], 1);
        assert!(json.get("chi_square").is_some());
        assert!(json.get("p_value").is_some());
    }
}
