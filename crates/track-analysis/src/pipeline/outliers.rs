//! Outlier handling module.
//!
//! Removes rows whose value in one numeric column falls outside the
//! interquartile fence `[Q1 - k*IQR, Q3 + k*IQR]`. Quartiles use linear
//! interpolation between ranks.

use crate::error::{AnalysisError, Result};
use crate::profiler::statistics;
use crate::types::IqrFence;
use crate::utils::column_f64_options;
use polars::prelude::*;
use tracing::debug;

/// Handles outlier detection and removal.
pub struct OutlierHandler {
    multiplier: f64,
}

impl OutlierHandler {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Compute the fence of a column from its non-null values.
    pub fn fence(&self, df: &DataFrame, column: &str) -> Result<IqrFence> {
        let values: Vec<f64> = column_f64_options(df, column)?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();

        let (q1, q3) = statistics::quartiles(&values)
            .ok_or_else(|| AnalysisError::NoValidValues(column.to_string()))?;
        let fence = IqrFence::new(q1, q3, self.multiplier);
        debug!(
            "{} fence: Q1={:.3}, Q3={:.3}, IQR={:.3}, bounds=[{:.3}, {:.3}]",
            column, fence.q1, fence.q3, fence.iqr, fence.lower, fence.upper
        );
        Ok(fence)
    }

    /// Remove rows whose value lies outside the fence.
    ///
    /// Returns the filtered frame, the fence and the number of rows removed.
    pub fn remove_outliers(
        &self,
        df: &DataFrame,
        column: &str,
    ) -> Result<(DataFrame, IqrFence, usize)> {
        let fence = self.fence(df, column)?;

        // Nulls are kept, matching a `~(v < lower | v > upper)` mask.
        let mask_values: Vec<bool> = column_f64_options(df, column)?
            .into_iter()
            .map(|v| v.is_none_or(|val| fence.contains(val)))
            .collect();

        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        let filtered = df.filter(&mask)?;
        let removed = df.height() - filtered.height();
        if removed > 0 {
            debug!("Removed {} outlier rows on '{}'", removed, column);
        }

        Ok((filtered, fence, removed))
    }
}

impl Default for OutlierHandler {
    fn default() -> Self {
        Self::new(1.5)
    }
}
