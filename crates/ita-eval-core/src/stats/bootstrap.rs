//! Seeded percentile bootstrap.
//!
//! Resample indices are drawn sequentially from one `StdRng`, so the same
//! seed and input always reproduce the same bounds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::metrics::{aggregate, aggregate_field};
use crate::models::{CaseEvaluation, ConfidenceInterval, Field, MetricName};

use super::{StatsError, StatsResult};

const LOWER_PERCENTILE: f64 = 0.025;
const UPPER_PERCENTILE: f64 = 0.975;

/// Bootstrap an arbitrary statistic over `n` items.
///
/// `statistic` receives the resampled indices (with replacement) and must
/// be pure. Returns the sorted resample values.
pub fn bootstrap_distribution<F>(
    n: usize,
    n_bootstrap: usize,
    seed: u64,
    mut statistic: F,
) -> StatsResult<Vec<f64>>
where
    F: FnMut(&[usize]) -> f64,
{
    if n == 0 {
        return Err(StatsError::InsufficientData("bootstrap needs at least one case".into()));
    }
    if n_bootstrap == 0 {
        return Err(StatsError::InsufficientData("bootstrap needs at least one resample".into()));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = vec![0usize; n];
    let mut values = Vec::with_capacity(n_bootstrap);
    for _ in 0..n_bootstrap {
        for slot in indices.iter_mut() {
            *slot = rng.gen_range(0..n);
        }
        values.push(statistic(&indices));
    }

    values.sort_by(|left, right| left.total_cmp(right));
    Ok(values)
}

/// 2.5th and 97.5th percentile values of a sorted, non-empty sample.
fn percentile_bounds(sorted: &[f64]) -> (f64, f64) {
    let len = sorted.len();
    let last = len.saturating_sub(1);
    let lower = ((len as f64 * LOWER_PERCENTILE) as usize).min(last);
    let upper = ((len as f64 * UPPER_PERCENTILE) as usize).min(last);
    (sorted[lower], sorted[upper])
}

/// 95% percentile-bootstrap interval for a named corpus metric of one field.
pub fn bootstrap_ci(
    cases: &[CaseEvaluation],
    field: Field,
    metric: MetricName,
    n_bootstrap: usize,
    seed: u64,
) -> StatsResult<ConfidenceInterval> {
    let values = bootstrap_distribution(cases.len(), n_bootstrap, seed, |indices| {
        aggregate(indices.iter().map(|&i| cases[i].field(field))).value(metric)
    })?;
    let (ci_lower, ci_upper) = percentile_bounds(&values);
    let point_estimate = aggregate_field(cases, field).value(metric);

    debug!(
        %field,
        %metric,
        n = cases.len(),
        n_bootstrap,
        point_estimate,
        ci_lower,
        ci_upper,
        "bootstrap interval"
    );

    Ok(ConfidenceInterval {
        point_estimate,
        ci_lower,
        ci_upper,
    })
}
