//! Integration tests for the track analysis.
//!
//! These tests run the loader, the pipeline and the CSV exports against a
//! 100-row sample of the track catalogue. Chart rendering is covered by the
//! unit tests of `reporting::charts`; here the chart descriptors are checked.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use track_analysis::pipeline::NORMALIZED_COLUMN;
use track_analysis::types::{CLEANED_EXPORT_FILE, FILTERED_EXPORT_FILE};
use track_analysis::{
    AnalysisConfig, AnalysisPipeline, AnalysisResult, ChartSpec, DatasetLoader, OutlierHandler,
    RawDataset, ReportGenerator,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Lay out `<base>/data/spotify_tracks.csv` from the sample fixture.
fn project_with_sample() -> TempDir {
    let base = TempDir::new().expect("Failed to create temp dir");
    let data_dir = base.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::copy(
        fixtures_path().join("spotify_sample.csv"),
        data_dir.join("spotify_tracks.csv"),
    )
    .expect("Failed to copy fixture");
    base
}

fn config_for(base: &Path) -> AnalysisConfig {
    AnalysisConfig::builder().base_dir(base).build().unwrap()
}

fn load_sample() -> RawDataset {
    DatasetLoader::read_csv(&fixtures_path().join("spotify_sample.csv")).unwrap()
}

fn run_sample() -> AnalysisResult {
    AnalysisPipeline::default().run(&load_sample()).unwrap()
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

// ============================================================================
// Full Run Tests
// ============================================================================

#[test]
fn test_sample_row_counts() {
    let result = run_sample();

    assert_eq!(result.raw_shape, (100, 20));
    assert_eq!(result.cleaning.incomplete_rows_dropped, 5);
    assert_eq!(result.cleaning.duplicate_rows_dropped, 3);
    assert_eq!(result.cleaned.height(), 92);
    assert_eq!(result.outliers_removed, 2);
    assert_eq!(result.filtered.height(), 90);
}

#[test]
fn test_sample_columns() {
    let result = run_sample();

    assert_eq!(
        result.cleaning.columns_dropped,
        vec!["track_id", "track_name", "album_name"]
    );
    // 20 - 3 identifiers + 2 derived
    assert_eq!(result.cleaned.width(), 19);
    assert_eq!(result.filtered.width(), 20);
}

#[test]
fn test_sample_most_common_key() {
    let key = run_sample().most_common_key.expect("sample has a key column");
    assert_eq!(key.value, "6");
    assert_eq!(key.count, 15);
}

#[test]
fn test_cleaned_has_no_missing_values_or_duplicates() {
    let result = run_sample();
    let df = result.cleaned.frame();

    for column in df.get_columns() {
        assert_eq!(column.null_count(), 0, "nulls in {}", column.name());
    }
    assert!(f64_column(df, "tempo").iter().all(|v| !v.is_nan()));

    let unique = df
        .unique_stable(None, UniqueKeepStrategy::First, None)
        .unwrap();
    assert_eq!(unique.height(), df.height());
}

#[test]
fn test_derived_fields_match_their_definitions() {
    let result = run_sample();
    let df = result.cleaned.frame();

    let energy = f64_column(df, "energy");
    let loudness = f64_column(df, "loudness");
    let ratio = f64_column(df, "energy_loudness_ratio");
    let duration_ms = f64_column(df, "duration_ms");
    let duration_min = f64_column(df, "duration_min");

    for row in 0..df.height() {
        assert!((ratio[row] - energy[row] / loudness[row].abs()).abs() < 1e-12);
        assert!((duration_min[row] - duration_ms[row] / 60_000.0).abs() < 1e-12);
    }
}

#[test]
fn test_filtered_tempo_within_cleaned_fence() {
    let result = run_sample();
    let fence = OutlierHandler::default()
        .fence(result.cleaned.frame(), "tempo")
        .unwrap();

    assert_eq!(fence, result.tempo_fence);
    for tempo in f64_column(result.filtered.frame(), "tempo") {
        assert!(fence.lower <= tempo && tempo <= fence.upper, "{} outside fence", tempo);
    }
}

#[test]
fn test_energy_norm_bounds() {
    let result = run_sample();
    let norm = f64_column(result.filtered.frame(), NORMALIZED_COLUMN);

    assert!(norm.iter().all(|v| (0.0..=1.0).contains(v)));
    assert_eq!(norm.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
    assert_eq!(norm.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 1.0);
}

#[test]
fn test_chart_descriptors() {
    let result = run_sample();
    assert_eq!(result.charts.len(), 5);

    let Some(ChartSpec::TopPopularTracks { tracks }) =
        result.chart("top_10_popular_tracks.png")
    else {
        panic!("missing top tracks chart");
    };
    assert_eq!(tracks.len(), 10);
    assert_eq!(tracks[0], ("Rain Fire".to_string(), 100.0));
    assert!(tracks.windows(2).all(|w| w[0].1 >= w[1].1));

    let Some(ChartSpec::CorrelationHeatmap { labels, matrix }) =
        result.chart("correlation_heatmap.png")
    else {
        panic!("missing heatmap");
    };
    assert!(labels.iter().any(|l| l == "energy_loudness_ratio"));
    assert!(!labels.iter().any(|l| l == "track_genre"));
    for (i, row) in matrix.iter().enumerate() {
        assert!((row[i] - 1.0).abs() < 1e-9);
    }

    let Some(ChartSpec::KeyDistribution { slices }) = result.chart("key_distribution_pie.png")
    else {
        panic!("missing key chart");
    };
    assert_eq!(slices.len(), 6);
}

#[test]
fn test_missing_track_name_skips_bar_chart() {
    let raw = load_sample().into_frame().drop("track_name").unwrap();
    let result = AnalysisPipeline::default()
        .run(&RawDataset::new(raw))
        .unwrap();

    assert_eq!(result.charts.len(), 4);
    assert!(result.chart("top_10_popular_tracks.png").is_none());
}

// ============================================================================
// Filesystem Tests
// ============================================================================

#[test]
fn test_loader_reads_base_dir_and_creates_output() {
    let base = project_with_sample();
    let config = config_for(base.path());
    let loader = DatasetLoader::new(&config);

    let output_dir = loader.ensure_output_dir().unwrap();
    assert_eq!(output_dir, base.path().join("data").join("output"));
    assert!(output_dir.is_dir());

    let raw = loader.load().unwrap();
    assert_eq!(raw.height(), 100);
}

#[test]
fn test_exports_identical_across_runs() {
    let base = project_with_sample();
    let config = config_for(base.path());

    let export = || {
        let loader = DatasetLoader::new(&config);
        let output_dir = loader.ensure_output_dir().unwrap();
        let result = AnalysisPipeline::new(config.clone())
            .run(&loader.load().unwrap())
            .unwrap();
        ReportGenerator::new(output_dir)
            .export_datasets(&result)
            .unwrap()
            .iter()
            .map(|p| fs::read(p).unwrap())
            .collect::<Vec<_>>()
    };

    let first = export();
    let second = export();
    assert_eq!(first, second);

    let output_dir = config.output_dir();
    assert!(output_dir.join(CLEANED_EXPORT_FILE).is_file());
    assert!(output_dir.join(FILTERED_EXPORT_FILE).is_file());
}

#[test]
fn test_exported_csv_reloads_with_same_shape() {
    let base = TempDir::new().unwrap();
    let result = run_sample();
    let paths = ReportGenerator::new(base.path().to_path_buf())
        .export_datasets(&result)
        .unwrap();

    let cleaned = DatasetLoader::read_csv(&paths[0]).unwrap();
    assert_eq!(cleaned.frame().shape(), result.cleaned.frame().shape());
    let filtered = DatasetLoader::read_csv(&paths[1]).unwrap();
    assert_eq!(filtered.frame().shape(), result.filtered.frame().shape());
}

#[test]
fn test_missing_input_file() {
    let base = TempDir::new().unwrap();
    let config = config_for(base.path());

    let err = DatasetLoader::new(&config).load().unwrap_err();
    assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
    assert!(err.to_string().contains("spotify_tracks.csv"));
}
