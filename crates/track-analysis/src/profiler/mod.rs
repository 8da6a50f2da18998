//! Data profiling module for the analysis pipeline.
//!
//! This module provides frame-level statistics:
//! - Pairwise correlation over numeric columns
//! - Frequency counts of categorical values (the most common musical key)
//!
//! The slice-level primitives live in [`statistics`].

pub mod statistics;

use crate::error::Result;
use crate::types::KeyCount;
use crate::utils::{column_f64_options, column_string_options, numeric_column_names};
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Data profiler for frame-level statistics.
pub struct DataProfiler;

impl DataProfiler {
    /// Pearson correlation between every pair of numeric columns.
    ///
    /// Returns the column labels and a square, symmetric matrix with `1.0`
    /// on the diagonal of non-constant columns. Pairs involving a constant
    /// column or non-finite values are `NaN`. Rows where either value is
    /// null are skipped pairwise.
    pub fn correlation_matrix(df: &DataFrame) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
        let labels = numeric_column_names(df);
        let columns: Vec<Vec<Option<f64>>> = labels
            .iter()
            .map(|name| column_f64_options(df, name))
            .collect::<Result<_>>()?;

        let n = labels.len();
        let mut matrix = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let (x, y): (Vec<f64>, Vec<f64>) = columns[i]
                    .iter()
                    .zip(&columns[j])
                    .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                    .unzip();
                let r = statistics::pearson(&x, &y);
                matrix[i][j] = r;
                matrix[j][i] = r;
            }
        }

        debug!("Computed {}x{} correlation matrix", n, n);
        Ok((labels, matrix))
    }

    /// Count occurrences of each distinct non-null value of a column.
    ///
    /// Sorted by count, highest first. Ties are ordered by ascending value:
    /// numerically when both values parse as numbers, lexically otherwise.
    pub fn value_counts(df: &DataFrame, column: &str) -> Result<Vec<KeyCount>> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for value in column_string_options(df, column)?.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }

        let mut counts: Vec<KeyCount> = counts
            .into_iter()
            .map(|(value, count)| KeyCount { value, count })
            .collect();
        counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| compare_values(&a.value, &b.value))
        });
        Ok(counts)
    }

    /// Most frequent value of a column, with the tie-break of [`Self::value_counts`].
    pub fn most_common(df: &DataFrame, column: &str) -> Result<Option<KeyCount>> {
        Ok(Self::value_counts(df, column)?.into_iter().next())
    }
}

fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}
