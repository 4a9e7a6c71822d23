//! Clinical term normalization.
//!
//! Pipeline: raw cell → normalize → strip asides/hedges → split → clean

mod splitter;

pub use splitter::*;
