//! Statistical comparison of prediction sources.
//!
//! - [`mcnemar`]: paired significance test on per-case correctness
//! - [`bootstrap_ci`]: seeded percentile confidence intervals
//! - [`cohen_kappa`] and set-level agreement between raters
//! - [`compare_sources`]: everything above, assembled into one report

mod agreement;
mod bootstrap;
mod mcnemar;
mod report;

pub use agreement::*;
pub use bootstrap::*;
pub use mcnemar::*;
pub use report::*;

use thiserror::Error;

/// Statistics errors.
#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Paired sequences differ in length: {left} vs {right}")]
    Shape { left: usize, right: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

pub type StatsResult<T> = Result<T, StatsError>;

pub(crate) fn check_paired(left: usize, right: usize) -> StatsResult<()> {
    if left == right {
        Ok(())
    } else {
        Err(StatsError::Shape { left, right })
    }
}
