//! Configuration types for the track analysis pipeline.
//!
//! The defaults reproduce the fixed layout the tool has always used:
//! `<base>/data/spotify_tracks.csv` in, `<base>/data/output/` out. The builder
//! exists so tests and the CLI can relocate the base directory without
//! touching the rest of the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier columns that carry no analytical value and are dropped during cleaning.
pub const DEFAULT_IDENTIFIER_COLUMNS: [&str; 3] = ["track_id", "track_name", "album_name"];

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use track_analysis::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .base_dir("/srv/tracks")
///     .histogram_bins(40)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Root directory that holds the `data/` folder.
    /// Default: "." (the working directory)
    pub base_dir: PathBuf,

    /// Name of the data folder under `base_dir`.
    /// Default: "data"
    pub data_dir_name: String,

    /// Input CSV file name inside the data folder.
    /// Default: "spotify_tracks.csv"
    pub input_file_name: String,

    /// Output folder name inside the data folder.
    /// Default: "output"
    pub output_dir_name: String,

    /// Columns dropped during cleaning when present.
    /// Default: track_id, track_name, album_name
    pub identifier_columns: Vec<String>,

    /// Multiplier applied to the IQR when building the tempo fence.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Number of bins in the tempo histogram.
    /// Default: 30
    pub histogram_bins: usize,

    /// Number of tracks in the popularity bar chart.
    /// Default: 10
    pub top_track_count: usize,

    /// Number of slices in the musical key pie chart.
    /// Default: 6
    pub top_key_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            data_dir_name: "data".to_string(),
            input_file_name: "spotify_tracks.csv".to_string(),
            output_dir_name: "output".to_string(),
            identifier_columns: DEFAULT_IDENTIFIER_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            iqr_multiplier: 1.5,
            histogram_bins: 30,
            top_track_count: 10,
            top_key_count: 6,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Full path of the input CSV.
    pub fn input_path(&self) -> PathBuf {
        self.base_dir
            .join(&self.data_dir_name)
            .join(&self.input_file_name)
    }

    /// Full path of the output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir
            .join(&self.data_dir_name)
            .join(&self.output_dir_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        for (field, value) in [
            ("histogram_bins", self.histogram_bins),
            ("top_track_count", self.top_track_count),
            ("top_key_count", self.top_key_count),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroCount(field.to_string()));
            }
        }

        if self.input_file_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFileName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a finite, non-negative number)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid value for '{0}': must be at least 1")]
    ZeroCount(String),

    #[error("Input file name must not be empty")]
    EmptyFileName,
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    base_dir: Option<PathBuf>,
    data_dir_name: Option<String>,
    input_file_name: Option<String>,
    output_dir_name: Option<String>,
    identifier_columns: Option<Vec<String>>,
    iqr_multiplier: Option<f64>,
    histogram_bins: Option<usize>,
    top_track_count: Option<usize>,
    top_key_count: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Set the root directory holding the `data/` folder.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Set the name of the data folder.
    pub fn data_dir_name(mut self, name: impl Into<String>) -> Self {
        self.data_dir_name = Some(name.into());
        self
    }

    /// Set the input CSV file name.
    pub fn input_file_name(mut self, name: impl Into<String>) -> Self {
        self.input_file_name = Some(name.into());
        self
    }

    /// Set the output folder name.
    pub fn output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.output_dir_name = Some(name.into());
        self
    }

    /// Replace the list of identifier columns dropped during cleaning.
    pub fn identifier_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the IQR multiplier of the outlier fence.
    ///
    /// # Arguments
    /// * `multiplier` - Non-negative value (1.5 is Tukey's fence)
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the number of tracks shown in the popularity chart.
    pub fn top_track_count(mut self, count: usize) -> Self {
        self.top_track_count = Some(count);
        self
    }

    /// Set the number of keys shown in the pie chart.
    pub fn top_key_count(mut self, count: usize) -> Self {
        self.top_key_count = Some(count);
        self
    }

    /// Build the configuration, validating all values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            base_dir: self.base_dir.unwrap_or(defaults.base_dir),
            data_dir_name: self.data_dir_name.unwrap_or(defaults.data_dir_name),
            input_file_name: self.input_file_name.unwrap_or(defaults.input_file_name),
            output_dir_name: self.output_dir_name.unwrap_or(defaults.output_dir_name),
            identifier_columns: self
                .identifier_columns
                .unwrap_or(defaults.identifier_columns),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            top_track_count: self.top_track_count.unwrap_or(defaults.top_track_count),
            top_key_count: self.top_key_count.unwrap_or(defaults.top_key_count),
        };

        config.validate()?;
        Ok(config)
    }
}
