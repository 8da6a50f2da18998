//! Input loading.
//!
//! Resolves the input and output locations from the configuration, makes sure
//! the output directory exists, and reads the track CSV into a
//! [`RawDataset`]. A missing or unparsable file is fatal.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::RawDataset;
use polars::io::csv::read::{CsvReadOptions, NullValues};
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cell values read as missing, mirroring pandas' default `na_values`.
pub const MISSING_VALUE_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const INFER_SCHEMA_ROWS: usize = 10_000;

/// Reads the input dataset and prepares the output location.
pub struct DatasetLoader<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DatasetLoader<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Path of the input CSV.
    pub fn input_path(&self) -> PathBuf {
        self.config.input_path()
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> Result<PathBuf> {
        let output_dir = self.config.output_dir();
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir).context(format!(
                "Failed to create output directory {}",
                output_dir.display()
            ))?;
            info!("Created output directory: {}", output_dir.display());
        }
        Ok(output_dir)
    }

    /// Load the configured input CSV.
    pub fn load(&self) -> Result<RawDataset> {
        let path = self.input_path();
        info!("Loading dataset from: {}", path.display());
        let raw = Self::read_csv(&path)?;
        info!("Dataset loaded successfully: {:?}", raw.frame().shape());
        Ok(raw)
    }

    /// Read a CSV file with a header row.
    pub fn read_csv(path: &Path) -> Result<RawDataset> {
        if !path.exists() {
            return Err(AnalysisError::InputNotFound(path.to_path_buf()));
        }

        let df = Self::read_options()
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
            .context(format!("Failed to parse {}", path.display()))?;
        debug!("Columns: {:?}", df.get_column_names());
        Ok(RawDataset::new(df))
    }

    /// Parse CSV content held in memory.
    pub fn parse_bytes(bytes: &[u8]) -> Result<RawDataset> {
        let df = Self::read_options()
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .context("Failed to parse CSV content")?;
        Ok(RawDataset::new(df))
    }

    fn read_options() -> CsvReadOptions {
        let null_values = NullValues::AllColumns(
            MISSING_VALUE_MARKERS
                .iter()
                .map(|marker| (*marker).into())
                .collect(),
        );

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_parse_options(
                CsvParseOptions::default()
                    .with_quote_char(Some(b'"'))
                    .with_null_values(Some(null_values)),
            )
    }
}
