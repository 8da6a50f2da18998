//! Report generation module.
//!
//! Turns an [`AnalysisResult`](crate::types::AnalysisResult) into files:
//! - PNG charts, one per [`ChartSpec`](crate::types::ChartSpec)
//! - CSV exports of the cleaned and the outlier-filtered data
//! - An optional JSON run report ([`AnalysisReport`])
//!
//! # Example
//!
//! ```rust,ignore
//! use track_analysis::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::new(config.output_dir());
//! let mut artifacts = generator.render_charts(&result)?;
//! artifacts.extend(generator.export_datasets(&result)?);
//!
//! let report = ReportGenerator::build_report(&config, &result, &artifacts);
//! generator.write_report_to_file(&report)?;
//! ```

pub mod chart_specs;
pub mod charts;
mod generator;

pub use charts::render_chart;
pub use generator::{AnalysisReport, ReportGenerator, RowCounts};
