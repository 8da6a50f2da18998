//! Chart descriptors.
//!
//! Each builder reduces a dataset snapshot to exactly the numbers one chart
//! draws. Nothing here touches the filesystem; rendering happens in
//! [`super::charts`].

use crate::error::Result;
use crate::profiler::{DataProfiler, statistics};
use crate::types::{ChartSpec, CleanedDataset, FilteredDataset, RawDataset};
use crate::utils::{column_f64_options, column_string_options, has_column, require_column};
use polars::prelude::*;
use tracing::{debug, info};

/// Evaluation points of the density curve.
const KDE_POINTS: usize = 200;

/// Label used for a track whose name is missing in the raw data.
const UNKNOWN_TRACK: &str = "(unknown)";

/// Pairwise correlation of every numeric column of the cleaned data.
pub fn correlation_heatmap(cleaned: &CleanedDataset) -> Result<ChartSpec> {
    let (labels, matrix) = DataProfiler::correlation_matrix(cleaned.frame())?;
    Ok(ChartSpec::CorrelationHeatmap { labels, matrix })
}

/// Tempo against popularity with a least-squares trend line.
pub fn tempo_vs_popularity(cleaned: &CleanedDataset) -> Result<ChartSpec> {
    let tempo = column_f64_options(cleaned.frame(), "tempo")?;
    let popularity = column_f64_options(cleaned.frame(), "popularity")?;

    let points: Vec<(f64, f64)> = tempo
        .into_iter()
        .zip(popularity)
        .filter_map(|(x, y)| Some((x?, y?)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let trend = statistics::linear_fit(&points);
    if let Some(fit) = trend {
        debug!(
            "Popularity trend: {:.4} * tempo + {:.4}",
            fit.slope, fit.intercept
        );
    }

    Ok(ChartSpec::TempoVsPopularity { points, trend })
}

/// The most popular rows of the raw data, or `None` without a `track_name` column.
pub fn top_popular_tracks(raw: &RawDataset, count: usize) -> Result<Option<ChartSpec>> {
    if !has_column(raw.frame(), "track_name") {
        info!("No 'track_name' column; skipping the top tracks chart");
        return Ok(None);
    }
    require_column(raw.frame(), "popularity")?;

    let top = raw
        .frame()
        .sort(
            ["popularity"],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )?
        .head(Some(count));

    let names = column_string_options(&top, "track_name")?;
    let scores = column_f64_options(&top, "popularity")?;
    let tracks: Vec<(String, f64)> = names
        .into_iter()
        .zip(scores)
        .filter_map(|(name, score)| {
            Some((name.unwrap_or_else(|| UNKNOWN_TRACK.to_string()), score?))
        })
        .collect();

    Ok(Some(ChartSpec::TopPopularTracks { tracks }))
}

/// Histogram and density curve of tempo after outlier removal.
pub fn tempo_distribution(filtered: &FilteredDataset, bins: usize) -> Result<ChartSpec> {
    let tempo: Vec<f64> = column_f64_options(filtered.frame(), "tempo")?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();

    let histogram = statistics::histogram(&tempo, bins);
    let bin_width = histogram.first().map(|b| b.end - b.start).unwrap_or(0.0);
    let scale = tempo.len() as f64 * bin_width;
    let kde = statistics::gaussian_kde(&tempo, KDE_POINTS)
        .into_iter()
        .map(|(x, density)| (x, density * scale))
        .collect();

    Ok(ChartSpec::TempoDistribution {
        bins: histogram,
        kde,
    })
}

/// The most frequent keys of the cleaned data, or `None` without a `key` column.
pub fn key_distribution(cleaned: &CleanedDataset, count: usize) -> Result<Option<ChartSpec>> {
    if !has_column(cleaned.frame(), "key") {
        info!("No 'key' column; skipping the key distribution chart");
        return Ok(None);
    }

    let mut slices = DataProfiler::value_counts(cleaned.frame(), "key")?;
    slices.truncate(count);
    Ok(Some(ChartSpec::KeyDistribution { slices }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyCount;

    fn raw_with_names() -> RawDataset {
        RawDataset::new(
            df![
                "track_name" => [Some("Low"), None, Some("Top"), Some("Mid"), Some("Unrated")],
                "popularity" => [Some(10i64), Some(55), Some(90), Some(55), None],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_top_tracks_sorted_descending() {
        let spec = top_popular_tracks(&raw_with_names(), 3).unwrap().unwrap();
        let ChartSpec::TopPopularTracks { tracks } = spec else {
            panic!("unexpected chart kind");
        };
        assert_eq!(
            tracks,
            vec![
                ("Top".to_string(), 90.0),
                ("(unknown)".to_string(), 55.0),
                ("Mid".to_string(), 55.0),
            ]
        );
    }

    #[test]
    fn test_top_tracks_null_popularity_last_and_dropped() {
        let spec = top_popular_tracks(&raw_with_names(), 10).unwrap().unwrap();
        let ChartSpec::TopPopularTracks { tracks } = spec else {
            panic!("unexpected chart kind");
        };
        assert_eq!(tracks.len(), 4);
        assert_eq!(tracks.last().unwrap().0, "Low");
    }

    #[test]
    fn test_top_tracks_skipped_without_names() {
        let raw = RawDataset::new(df!["popularity" => [1i64, 2]].unwrap());
        assert!(top_popular_tracks(&raw, 10).unwrap().is_none());
    }

    #[test]
    fn test_scatter_points_and_trend() {
        let cleaned = CleanedDataset::new(
            df![
                "tempo" => [100.0, 110.0, 120.0],
                "popularity" => [20i64, 30, 40],
            ]
            .unwrap(),
        );
        let ChartSpec::TempoVsPopularity { points, trend } =
            tempo_vs_popularity(&cleaned).unwrap()
        else {
            panic!("unexpected chart kind");
        };
        assert_eq!(points.len(), 3);
        let trend = trend.unwrap();
        assert!((trend.slope - 1.0).abs() < 1e-9);
        assert!((trend.predict(130.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_distribution_kde_scaled_to_counts() {
        let tempo: Vec<f64> = (0..300).map(|v| 80.0 + (v % 60) as f64).collect();
        let filtered = FilteredDataset::new(df!["tempo" => tempo].unwrap());

        let ChartSpec::TempoDistribution { bins, kde } = tempo_distribution(&filtered, 30).unwrap()
        else {
            panic!("unexpected chart kind");
        };
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 300);
        assert_eq!(kde.len(), 200);
        // 10 values per bin on average; the scaled curve is of the same order
        let peak = kde.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        assert!(peak > 5.0 && peak < 20.0, "peak was {}", peak);
    }

    #[test]
    fn test_key_distribution_top_n() {
        let cleaned = CleanedDataset::new(
            df!["key" => [1i64, 1, 1, 2, 2, 3, 4, 5, 6, 7, 8]].unwrap(),
        );
        let Some(ChartSpec::KeyDistribution { slices }) = key_distribution(&cleaned, 6).unwrap()
        else {
            panic!("expected a key chart");
        };
        assert_eq!(slices.len(), 6);
        assert_eq!(
            slices[0],
            KeyCount {
                value: "1".into(),
                count: 3
            }
        );
        assert_eq!(slices[5].value, "6");
    }

    #[test]
    fn test_key_distribution_skipped_without_key() {
        let cleaned = CleanedDataset::new(df!["tempo" => [1.0]].unwrap());
        assert!(key_distribution(&cleaned, 6).unwrap().is_none());
    }
}
