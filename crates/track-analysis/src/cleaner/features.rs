//! Derived numeric fields added during cleaning.

use crate::error::Result;
use crate::utils::column_f64_options;
use polars::prelude::*;

/// `energy / |loudness|`.
pub const ENERGY_LOUDNESS_RATIO: &str = "energy_loudness_ratio";
/// `duration_ms / 60000`.
pub const DURATION_MIN: &str = "duration_min";

const MS_PER_MINUTE: f64 = 60_000.0;

/// Energy relative to absolute loudness.
///
/// Zero loudness is not guarded: the ratio becomes `inf` (or `NaN` when the
/// energy is zero too). Returns the series and the number of non-finite values.
pub fn energy_loudness_ratio(df: &DataFrame) -> Result<(Series, usize)> {
    let energy = column_f64_options(df, "energy")?;
    let loudness = column_f64_options(df, "loudness")?;

    let ratio: Vec<Option<f64>> = energy
        .into_iter()
        .zip(loudness)
        .map(|(e, l)| Some(e? / l?.abs()))
        .collect();
    let non_finite = ratio
        .iter()
        .filter(|v| matches!(v, Some(x) if !x.is_finite()))
        .count();

    Ok((Series::new(ENERGY_LOUDNESS_RATIO.into(), ratio), non_finite))
}

/// Track duration in minutes.
pub fn duration_minutes(df: &DataFrame) -> Result<Series> {
    let minutes: Vec<Option<f64>> = column_f64_options(df, "duration_ms")?
        .into_iter()
        .map(|ms| ms.map(|v| v / MS_PER_MINUTE))
        .collect();
    Ok(Series::new(DURATION_MIN.into(), minutes))
}
