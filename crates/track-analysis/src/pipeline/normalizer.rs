//! Min-max scaling of a single column into `[0, 1]`.

use crate::error::{AnalysisError, Result};
use crate::profiler::statistics;
use crate::utils::column_f64_options;
use polars::prelude::*;
use tracing::{debug, warn};

/// Append a min-max scaled copy of `source` named `target`.
///
/// The range is taken over the frame as given, so callers decide which
/// population is scaled. A constant column has no range; it is treated as
/// a range of one and every value maps to `0.0`.
pub fn min_max_scale(df: &DataFrame, source: &str, target: &str) -> Result<DataFrame> {
    let values = column_f64_options(df, source)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let (min, max) = statistics::min_max(&present)
        .ok_or_else(|| AnalysisError::NoValidValues(source.to_string()))?;

    let mut range = max - min;
    if range == 0.0 {
        warn!("'{}' is constant ({}); '{}' is all zeros", source, min, target);
        range = 1.0;
    }
    debug!("Scaling '{}' with min={}, max={}", source, min, max);

    let scaled: Vec<Option<f64>> = values
        .into_iter()
        .map(|v| v.map(|x| (x - min) / range))
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new(target.into(), scaled))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled_values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_min_max_scale_bounds() {
        let df = df!["energy" => [0.2, 0.6, 1.0, 0.4]].unwrap();
        let out = min_max_scale(&df, "energy", "energy_norm").unwrap();

        let scaled = scaled_values(&out, "energy_norm");
        assert_eq!(scaled[0], 0.0);
        assert_eq!(scaled[2], 1.0);
        assert!((scaled[1] - 0.5).abs() < 1e-12);
        assert!(scaled.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_min_max_scale_appends_column_only() {
        let df = df!["tempo" => [100.0, 120.0], "energy" => [0.1, 0.3]].unwrap();
        let out = min_max_scale(&df, "energy", "energy_norm").unwrap();
        assert_eq!(out.width(), 3);
        assert_eq!(out.get_column_names().last().unwrap().as_str(), "energy_norm");
        assert_eq!(
            out.column("energy").unwrap().f64().unwrap().get(1),
            Some(0.3)
        );
    }

    #[test]
    fn test_min_max_scale_constant_column() {
        let df = df!["energy" => [0.7, 0.7, 0.7]].unwrap();
        let out = min_max_scale(&df, "energy", "energy_norm").unwrap();
        assert_eq!(scaled_values(&out, "energy_norm"), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_min_max_scale_empty() {
        let df = df!["energy" => Vec::<f64>::new()].unwrap();
        let err = min_max_scale(&df, "energy", "energy_norm").unwrap_err();
        assert_eq!(err.error_code(), "NO_VALID_VALUES");
    }
}
