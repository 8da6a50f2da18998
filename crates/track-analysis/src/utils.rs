//! Shared utilities for the analysis pipeline.
//!
//! Column lookup and numeric extraction helpers used by the cleaner, the
//! outlier filter, the normalizer and the chart builders.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
///
/// Booleans are not numeric here, matching what a correlation matrix over
/// audio features is expected to contain.
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Names of all numeric columns, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Check whether the frame has a column with this exact name.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Fail with [`AnalysisError::ColumnNotFound`] unless the column exists.
pub fn require_column(df: &DataFrame, name: &str) -> Result<()> {
    if has_column(df, name) {
        Ok(())
    } else {
        Err(AnalysisError::ColumnNotFound(name.to_string()))
    }
}

/// Read a column as `f64` values, keeping nulls as `None`.
pub fn column_f64_options(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    require_column(df, name)?;
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Read a column as `f64` values, skipping nulls.
pub fn column_f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(column_f64_options(df, name)?.into_iter().flatten().collect())
}

/// Read a column as display strings, keeping nulls as `None`.
///
/// Integer keys become `"5"`, strings are passed through untouched.
pub fn column_string_options(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    require_column(df, name)?;
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Per-row completeness of one column: `false` for nulls and float NaN.
pub fn present_mask(column: &Column) -> Result<Vec<bool>> {
    let series = column.as_materialized_series();
    if is_float_dtype(series.dtype()) {
        let float_series = series.cast(&DataType::Float64)?;
        Ok(float_series
            .f64()?
            .into_iter()
            .map(|v| matches!(v, Some(x) if !x.is_nan()))
            .collect())
    } else {
        Ok(series
            .is_not_null()
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect())
    }
}
