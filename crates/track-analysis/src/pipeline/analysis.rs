//! The analysis pipeline.
//!
//! [`AnalysisPipeline::run`] is a pure function of the loaded data: it
//! cleans, filters, normalizes and prepares every chart descriptor, but
//! reads and writes nothing. Loading and saving are done by
//! [`crate::loader::DatasetLoader`] and [`crate::reporting::ReportGenerator`].

use crate::cleaner::DataCleaner;
use crate::config::AnalysisConfig;
use crate::error::{Result, ResultExt};
use crate::pipeline::normalizer::min_max_scale;
use crate::pipeline::outliers::OutlierHandler;
use crate::profiler::DataProfiler;
use crate::reporting::chart_specs;
use crate::types::{AnalysisResult, CleanedDataset, FilteredDataset, RawDataset};
use crate::utils::has_column;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Column the outlier fence is computed on.
pub const OUTLIER_COLUMN: &str = "tempo";
/// Column that is min-max scaled after outlier removal.
pub const NORMALIZED_SOURCE: &str = "energy";
/// Name of the scaled column.
pub const NORMALIZED_COLUMN: &str = "energy_norm";

/// Runs the analysis steps in order.
///
/// # Example
///
/// ```rust,ignore
/// use track_analysis::{AnalysisConfig, AnalysisPipeline, DatasetLoader};
///
/// let config = AnalysisConfig::default();
/// let raw = DatasetLoader::new(&config).load()?;
/// let result = AnalysisPipeline::new(config).run(&raw)?;
/// println!("{} rows after cleaning", result.cleaned.height());
/// ```
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    cleaner: DataCleaner,
    outliers: OutlierHandler,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        let cleaner = DataCleaner::new(config.identifier_columns.clone());
        let outliers = OutlierHandler::new(config.iqr_multiplier);
        Self {
            config,
            cleaner,
            outliers,
        }
    }

    /// Like [`AnalysisPipeline::new`], but rejects an invalid configuration.
    pub fn try_new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Clean, filter and normalize the data and build every chart descriptor.
    pub fn run(&self, raw: &RawDataset) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        info!("Starting analysis pipeline...");

        // Step 1: cleaning and derived features
        info!("Step 1: Cleaning data...");
        let (cleaned, cleaning) = self.cleaner.clean(raw).context("Cleaning failed")?;

        let most_common_key = if has_column(cleaned.frame(), "key") {
            DataProfiler::most_common(cleaned.frame(), "key")?
        } else {
            warn!("No 'key' column; most common key is unavailable");
            None
        };

        // Step 2: tempo outliers
        info!("Step 2: Removing {} outliers...", OUTLIER_COLUMN);
        let (without_outliers, tempo_fence, outliers_removed) = self
            .outliers
            .remove_outliers(cleaned.frame(), OUTLIER_COLUMN)
            .context("Outlier removal failed")?;
        info!(
            "Removed {} rows outside [{:.2}, {:.2}]",
            outliers_removed, tempo_fence.lower, tempo_fence.upper
        );

        // Step 3: scale energy over the filtered population
        info!("Step 3: Normalizing {}...", NORMALIZED_SOURCE);
        let filtered = FilteredDataset::new(
            min_max_scale(&without_outliers, NORMALIZED_SOURCE, NORMALIZED_COLUMN)
                .context("Normalization failed")?,
        );

        // Step 4: chart descriptors
        info!("Step 4: Preparing charts...");
        let charts = self
            .build_charts(raw, &cleaned, &filtered)
            .context("Preparing charts failed")?;
        debug!("Prepared {} charts", charts.len());

        info!(
            "Analysis complete in {}ms: {} raw -> {} cleaned -> {} filtered rows",
            start_time.elapsed().as_millis(),
            raw.height(),
            cleaned.height(),
            filtered.height()
        );

        Ok(AnalysisResult {
            raw_shape: raw.frame().shape(),
            cleaned,
            filtered,
            cleaning,
            tempo_fence,
            outliers_removed,
            most_common_key,
            charts,
        })
    }

    fn build_charts(
        &self,
        raw: &RawDataset,
        cleaned: &CleanedDataset,
        filtered: &FilteredDataset,
    ) -> Result<Vec<crate::types::ChartSpec>> {
        let mut charts = vec![
            chart_specs::correlation_heatmap(cleaned)?,
            chart_specs::tempo_vs_popularity(cleaned)?,
        ];
        if let Some(top) = chart_specs::top_popular_tracks(raw, self.config.top_track_count)? {
            charts.push(top);
        }
        charts.push(chart_specs::tempo_distribution(
            filtered,
            self.config.histogram_bins,
        )?);
        if let Some(keys) = chart_specs::key_distribution(cleaned, self.config.top_key_count)? {
            charts.push(keys);
        }
        Ok(charts)
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample_raw() -> RawDataset {
        RawDataset::new(
            df![
                "track_id" => ["a", "b", "c", "d", "e", "f"],
                "track_name" => ["A", "B", "C", "D", "E", "F"],
                "album_name" => ["X", "X", "Y", "Y", "Z", "Z"],
                "popularity" => [50i64, 60, 70, 80, 40, 30],
                "duration_ms" => [180_000i64, 240_000, 200_000, 210_000, 190_000, 230_000],
                "energy" => [0.2, 0.4, 0.6, 0.8, 0.5, 0.3],
                "loudness" => [-5.0, -4.0, -6.0, -8.0, -5.0, -3.0],
                "tempo" => [100.0, 110.0, 120.0, 130.0, 115.0, 400.0],
                "key" => [1i64, 1, 5, 5, 1, 7],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_run_filters_and_normalizes() {
        let result = AnalysisPipeline::default().run(&sample_raw()).unwrap();

        assert_eq!(result.raw_shape, (6, 9));
        assert_eq!(result.cleaned.height(), 6);
        assert_eq!(result.outliers_removed, 1);
        assert_eq!(result.filtered.height(), 5);
        assert!(result.tempo_fence.contains(130.0));
        assert!(!result.tempo_fence.contains(400.0));

        let norm = result
            .filtered
            .frame()
            .column(NORMALIZED_COLUMN)
            .unwrap()
            .f64()
            .unwrap()
            .clone();
        assert_eq!(norm.min(), Some(0.0));
        assert_eq!(norm.max(), Some(1.0));
        // the cleaned snapshot is not scaled
        assert!(!has_column(result.cleaned.frame(), NORMALIZED_COLUMN));
    }

    #[test]
    fn test_run_most_common_key_and_charts() {
        let result = AnalysisPipeline::default().run(&sample_raw()).unwrap();

        let key = result.most_common_key.unwrap();
        assert_eq!(key.value, "1");
        assert_eq!(key.count, 3);

        let names: Vec<&str> = result.charts.iter().map(|c| c.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "correlation_heatmap.png",
                "tempo_vs_popularity.png",
                "top_10_popular_tracks.png",
                "tempo_distribution_no_outliers.png",
                "key_distribution_pie.png",
            ]
        );
    }

    #[test]
    fn test_run_without_key_or_names() {
        let raw = sample_raw().into_frame().drop_many(["key", "track_name"]);
        let result = AnalysisPipeline::default()
            .run(&RawDataset::new(raw))
            .unwrap();

        assert!(result.most_common_key.is_none());
        assert_eq!(result.charts.len(), 3);
        assert!(result.chart("top_10_popular_tracks.png").is_none());
        assert!(result.chart("key_distribution_pie.png").is_none());
    }

    #[test]
    fn test_run_missing_tempo_fails() {
        let raw = sample_raw().into_frame().drop("tempo").unwrap();
        let err = AnalysisPipeline::default()
            .run(&RawDataset::new(raw))
            .unwrap_err();
        assert!(err.to_string().contains("tempo"));
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let config = AnalysisConfig {
            iqr_multiplier: -1.0,
            ..Default::default()
        };
        let err = AnalysisPipeline::try_new(config).err().unwrap();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("IQR multiplier"));

        let config = AnalysisConfig {
            histogram_bins: 0,
            ..Default::default()
        };
        let err = AnalysisPipeline::try_new(config).err().unwrap();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("histogram_bins"));
    }

    #[test]
    fn test_try_new_accepts_defaults() {
        let pipeline = AnalysisPipeline::try_new(AnalysisConfig::default()).unwrap();
        assert_eq!(pipeline.config().iqr_multiplier, 1.5);
    }
}
