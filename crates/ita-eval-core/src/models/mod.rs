//! Domain models for the evaluation engine.

mod case;
mod matching;
mod metrics;
mod vocabulary;

pub use case::*;
pub use matching::*;
pub use metrics::*;
pub use vocabulary::*;
