//! Dataset snapshots and the structured result of an analysis run.
//!
//! Each stage of the pipeline produces a new snapshot type instead of
//! mutating the previous one, so a `FilteredDataset` can never be passed
//! where the cleaned data is expected.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

macro_rules! dataset_snapshot {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(DataFrame);

        impl $name {
            /// Wrap a frame as this snapshot.
            pub fn new(frame: DataFrame) -> Self {
                Self(frame)
            }

            /// Borrow the underlying frame.
            pub fn frame(&self) -> &DataFrame {
                &self.0
            }

            /// Unwrap into the underlying frame.
            pub fn into_frame(self) -> DataFrame {
                self.0
            }

            /// Number of rows.
            pub fn height(&self) -> usize {
                self.0.height()
            }

            /// Number of columns.
            pub fn width(&self) -> usize {
                self.0.width()
            }
        }
    };
}

dataset_snapshot!(
    /// Tracks exactly as loaded from the input CSV.
    RawDataset
);

dataset_snapshot!(
    /// Complete, de-duplicated rows without identifier columns, plus
    /// `energy_loudness_ratio` and `duration_min`.
    CleanedDataset
);

dataset_snapshot!(
    /// Cleaned rows inside the tempo fence, plus `energy_norm`.
    FilteredDataset
);

/// Bookkeeping of what the cleaner removed or produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub rows_before: usize,
    pub incomplete_rows_dropped: usize,
    pub columns_dropped: Vec<String>,
    pub duplicate_rows_dropped: usize,
    /// Ratios that came out as `inf`/`NaN` because loudness was zero.
    pub non_finite_ratios: usize,
    pub rows_after: usize,
}

/// Interquartile fence used to drop tempo outliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrFence {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFence {
    /// Build the fence `[q1 - k*iqr, q3 + k*iqr]`.
    pub fn new(q1: f64, q3: f64, multiplier: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        }
    }

    /// Boundary values are inside the fence.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        !(value < self.lower || value > self.upper)
    }
}

/// A value of a categorical column with its number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCount {
    pub value: String,
    pub count: usize,
}

/// Ordinary least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// One histogram bin `[start, end)`; the last bin also includes `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Everything needed to draw one chart, computed without touching the disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    CorrelationHeatmap {
        labels: Vec<String>,
        /// Row-major, `labels.len()` x `labels.len()`.
        matrix: Vec<Vec<f64>>,
    },
    TempoVsPopularity {
        points: Vec<(f64, f64)>,
        trend: Option<LinearFit>,
    },
    TopPopularTracks {
        /// Track name and popularity, most popular first.
        tracks: Vec<(String, f64)>,
    },
    TempoDistribution {
        bins: Vec<HistogramBin>,
        /// Density curve already scaled to bin counts.
        kde: Vec<(f64, f64)>,
    },
    KeyDistribution {
        slices: Vec<KeyCount>,
    },
}

impl ChartSpec {
    /// File name the chart is written to inside the output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::CorrelationHeatmap { .. } => "correlation_heatmap.png",
            Self::TempoVsPopularity { .. } => "tempo_vs_popularity.png",
            Self::TopPopularTracks { .. } => "top_10_popular_tracks.png",
            Self::TempoDistribution { .. } => "tempo_distribution_no_outliers.png",
            Self::KeyDistribution { .. } => "key_distribution_pie.png",
        }
    }
}

/// File name of the cleaned dataset export.
pub const CLEANED_EXPORT_FILE: &str = "spotify_cleaned.csv";
/// File name of the outlier-filtered dataset export.
pub const FILTERED_EXPORT_FILE: &str = "spotify_no_outliers.csv";
/// File name of the optional JSON run report.
pub const REPORT_FILE: &str = "analysis_report.json";

/// Result of [`crate::AnalysisPipeline::run`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub raw_shape: (usize, usize),
    pub cleaned: CleanedDataset,
    pub filtered: FilteredDataset,
    pub cleaning: CleaningStats,
    pub tempo_fence: IqrFence,
    pub outliers_removed: usize,
    /// `None` when the data has no `key` column.
    pub most_common_key: Option<KeyCount>,
    /// Charts in rendering order.
    pub charts: Vec<ChartSpec>,
}

impl AnalysisResult {
    /// Find the chart descriptor written to `file_name`, if it was produced.
    pub fn chart(&self, file_name: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.file_name() == file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_keeps_boundaries() {
        let fence = IqrFence::new(60.0, 95.0, 1.5);
        assert_eq!(fence.iqr, 35.0);
        assert_eq!(fence.lower, 7.5);
        assert_eq!(fence.upper, 147.5);
        assert!(fence.contains(7.5));
        assert!(fence.contains(147.5));
        assert!(!fence.contains(200.0));
        assert!(!fence.contains(7.4));
    }

    #[test]
    fn test_linear_fit_predict() {
        let fit = LinearFit {
            slope: 2.0,
            intercept: 1.0,
        };
        assert_eq!(fit.predict(3.0), 7.0);
    }

    #[test]
    fn test_snapshot_accessors() {
        let df = df!["a" => [1, 2, 3], "b" => [4, 5, 6]].unwrap();
        let raw = RawDataset::new(df);
        assert_eq!(raw.height(), 3);
        assert_eq!(raw.width(), 2);
        assert_eq!(raw.into_frame().height(), 3);
    }
}
