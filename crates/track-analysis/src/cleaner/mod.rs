//! Data cleaning module.
//!
//! Turns a [`RawDataset`] into a [`CleanedDataset`]:
//! 1. Drop rows with a missing value in any column (complete-case)
//! 2. Drop identifier columns when present
//! 3. Add the derived fields from [`features`]
//! 4. Remove exact duplicate rows, keeping the first occurrence

pub mod features;

use crate::error::Result;
use crate::types::{CleanedDataset, CleaningStats, RawDataset};
use crate::utils::{has_column, present_mask};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Data cleaner for the track dataset.
pub struct DataCleaner {
    identifier_columns: Vec<String>,
}

impl DataCleaner {
    pub fn new(identifier_columns: Vec<String>) -> Self {
        Self { identifier_columns }
    }

    /// Run every cleaning step and report what was removed.
    pub fn clean(&self, raw: &RawDataset) -> Result<(CleanedDataset, CleaningStats)> {
        info!("Performing data cleaning...");
        let mut stats = CleaningStats {
            rows_before: raw.height(),
            ..Default::default()
        };

        // 1. Complete-case rows only
        let df = Self::drop_incomplete_rows(raw.frame())?;
        stats.incomplete_rows_dropped = raw.height() - df.height();
        if stats.incomplete_rows_dropped > 0 {
            debug!(
                "Removed {} rows with missing values",
                stats.incomplete_rows_dropped
            );
        }

        // 2. Identifier columns
        let (mut df, dropped) = self.drop_identifier_columns(df);
        if !dropped.is_empty() {
            debug!("Dropped identifier columns: {:?}", dropped);
        }
        stats.columns_dropped = dropped;

        // 3. Derived fields
        let (ratio, non_finite) = features::energy_loudness_ratio(&df)?;
        if non_finite > 0 {
            warn!(
                "{} rows have zero loudness; {} is not finite for them",
                non_finite,
                features::ENERGY_LOUDNESS_RATIO
            );
        }
        stats.non_finite_ratios = non_finite;
        df.with_column(ratio)?;
        df.with_column(features::duration_minutes(&df)?)?;

        // 4. Exact duplicates
        let before_duplicates = df.height();
        let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        stats.duplicate_rows_dropped = before_duplicates - df.height();
        if stats.duplicate_rows_dropped > 0 {
            debug!("Removed {} duplicate rows", stats.duplicate_rows_dropped);
        }

        stats.rows_after = df.height();
        info!(
            "Cleaning complete: {} -> {} rows, {} columns",
            stats.rows_before,
            stats.rows_after,
            df.width()
        );
        Ok((CleanedDataset::new(df), stats))
    }

    /// Keep only rows where every column holds a value (nulls and NaN are missing).
    pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
        let mut keep = vec![true; df.height()];
        for column in df.get_columns() {
            for (row, present) in present_mask(column)?.into_iter().enumerate() {
                keep[row] &= present;
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    /// Drop the configured identifier columns that exist in the frame.
    fn drop_identifier_columns(&self, df: DataFrame) -> (DataFrame, Vec<String>) {
        let present: Vec<String> = self
            .identifier_columns
            .iter()
            .filter(|name| has_column(&df, name))
            .cloned()
            .collect();

        if present.is_empty() {
            return (df, present);
        }

        let cols_ref: Vec<PlSmallStr> = present.iter().map(|s| s.as_str().into()).collect();
        (df.drop_many(cols_ref), present)
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_IDENTIFIER_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}
