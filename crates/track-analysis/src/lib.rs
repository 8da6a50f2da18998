//! Track Analysis Library
//!
//! Exploratory analysis of a music track catalogue with Polars.
//!
//! # Overview
//!
//! One run reads `data/spotify_tracks.csv`, passes it through a fixed
//! sequence of stages and writes its results to `data/output/`:
//!
//! - **Loading**: CSV with header, pandas-style missing-value markers
//! - **Cleaning**: complete-case rows, identifier columns dropped, derived
//!   `energy_loudness_ratio` and `duration_min`, exact duplicates removed
//! - **Outlier filtering**: IQR fence on `tempo`
//! - **Normalization**: `energy` min-max scaled into `energy_norm`
//! - **Reporting**: five PNG charts, two CSV exports and an optional JSON report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use track_analysis::{AnalysisConfig, AnalysisPipeline, DatasetLoader, ReportGenerator};
//!
//! let config = AnalysisConfig::builder().base_dir("/srv/music").build()?;
//! let loader = DatasetLoader::new(&config);
//! let output_dir = loader.ensure_output_dir()?;
//! let raw = loader.load()?;
//!
//! let result = AnalysisPipeline::new(config).run(&raw)?;
//! if let Some(key) = &result.most_common_key {
//!     println!("Most common musical key: {}", key.value);
//! }
//!
//! let generator = ReportGenerator::new(output_dir);
//! generator.render_charts(&result)?;
//! generator.export_datasets(&result)?;
//! ```
//!
//! [`AnalysisPipeline::run`] touches no files, so every stage can be tested
//! against in-memory frames.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{AnalysisError, ResultExt};
pub use loader::DatasetLoader;
pub use pipeline::{AnalysisPipeline, OutlierHandler};
pub use profiler::DataProfiler;
pub use reporting::{AnalysisReport, ReportGenerator, RowCounts};
pub use types::{
    AnalysisResult, ChartSpec, CleanedDataset, CleaningStats, FilteredDataset, HistogramBin,
    IqrFence, KeyCount, LinearFit, RawDataset,
};
