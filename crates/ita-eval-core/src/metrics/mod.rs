//! Text similarity metrics and corpus aggregation.

mod aggregate;
mod text;

pub use aggregate::*;
pub use text::*;
