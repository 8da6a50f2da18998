//! Writing analysis results to disk.
//!
//! [`ReportGenerator`] renders the charts, exports the cleaned and filtered
//! snapshots as CSV and writes the optional JSON run report.

use crate::config::AnalysisConfig;
use crate::error::{Result, ResultExt};
use crate::reporting::charts::render_chart;
use crate::types::{
    AnalysisResult, CLEANED_EXPORT_FILE, CleaningStats, FILTERED_EXPORT_FILE, IqrFence, KeyCount,
    REPORT_FILE,
};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Run Report Types
// ============================================================================

/// Summary of one run, written as `analysis_report.json` on request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Settings the run used
    pub config: AnalysisConfig,
    /// Row counts of each snapshot
    pub rows: RowCounts,
    pub cleaning: CleaningStats,
    pub tempo_fence: IqrFence,
    pub outliers_removed: usize,
    pub most_common_key: Option<KeyCount>,
    /// Files written to the output directory, in write order
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub raw: usize,
    pub cleaned: usize,
    pub filtered: usize,
}

/// Writes charts, dataset exports and the run report into one directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render every chart of the result, in order. Stops at the first failure.
    pub fn render_charts(&self, result: &AnalysisResult) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::with_capacity(result.charts.len());
        for chart in &result.charts {
            let path = self.output_dir.join(chart.file_name());
            render_chart(chart, &path).context(format!("Rendering {}", chart.file_name()))?;
            info!("Chart saved: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Write the cleaned and the outlier-filtered snapshots as CSV.
    pub fn export_datasets(&self, result: &AnalysisResult) -> Result<Vec<PathBuf>> {
        Ok(vec![
            self.write_csv(result.cleaned.frame(), CLEANED_EXPORT_FILE)?,
            self.write_csv(result.filtered.frame(), FILTERED_EXPORT_FILE)?,
        ])
    }

    /// Write a frame with a header row, overwriting any existing file.
    pub fn write_csv(&self, df: &DataFrame, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(file_name);
        let mut file = File::create(&output_path)?;

        let mut df = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)
            .context(format!("Writing {}", output_path.display()))?;

        info!("Dataset saved: {}", output_path.display());
        Ok(output_path)
    }

    /// Build the run report from a finished analysis.
    pub fn build_report(
        config: &AnalysisConfig,
        result: &AnalysisResult,
        artifacts: &[PathBuf],
    ) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: config.input_path().display().to_string(),
            config: config.clone(),
            rows: RowCounts {
                raw: result.raw_shape.0,
                cleaned: result.cleaned.height(),
                filtered: result.filtered.height(),
            },
            cleaning: result.cleaning.clone(),
            tempo_fence: result.tempo_fence,
            outliers_removed: result.outliers_removed,
            most_common_key: result.most_common_key.clone(),
            artifacts: artifacts
                .iter()
                .filter_map(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
        }
    }

    /// Write the run report to `analysis_report.json`.
    pub fn write_report_to_file(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(REPORT_FILE);
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
