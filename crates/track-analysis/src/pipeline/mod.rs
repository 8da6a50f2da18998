//! Pipeline module.
//!
//! The analysis pipeline and its filtering and scaling steps.

mod analysis;
pub mod normalizer;
pub mod outliers;

pub use analysis::{AnalysisPipeline, NORMALIZED_COLUMN, NORMALIZED_SOURCE, OUTLIER_COLUMN};
pub use normalizer::min_max_scale;
pub use outliers::OutlierHandler;
