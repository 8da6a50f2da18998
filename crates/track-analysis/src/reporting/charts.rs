//! PNG rendering of [`ChartSpec`] descriptors with plotters.

use crate::error::{AnalysisError, Result};
use crate::types::{ChartSpec, HistogramBin, KeyCount, LinearFit};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use tracing::debug;

const FONT: &str = "sans-serif";

const HEATMAP_SIZE: (u32, u32) = (1200, 800);
const SCATTER_SIZE: (u32, u32) = (1000, 600);
const BARS_SIZE: (u32, u32) = (1000, 600);
const HISTOGRAM_SIZE: (u32, u32) = (1000, 500);
const PIE_SIZE: (u32, u32) = (700, 700);

/// Longest track name drawn next to a bar.
const MAX_LABEL_CHARS: usize = 40;

const VIRIDIS: [RGBColor; 10] = [
    RGBColor(0x44, 0x01, 0x54),
    RGBColor(0x48, 0x28, 0x78),
    RGBColor(0x3e, 0x49, 0x89),
    RGBColor(0x31, 0x68, 0x8e),
    RGBColor(0x26, 0x82, 0x8e),
    RGBColor(0x1f, 0x9e, 0x89),
    RGBColor(0x35, 0xb7, 0x79),
    RGBColor(0x6e, 0xce, 0x58),
    RGBColor(0xb5, 0xde, 0x2b),
    RGBColor(0xfd, 0xe7, 0x25),
];

const PASTEL: [RGBColor; 10] = [
    RGBColor(0xa1, 0xc9, 0xf4),
    RGBColor(0xff, 0xb4, 0x82),
    RGBColor(0x8d, 0xe5, 0xa1),
    RGBColor(0xff, 0x9f, 0x9b),
    RGBColor(0xd0, 0xbb, 0xff),
    RGBColor(0xde, 0xbb, 0x9b),
    RGBColor(0xfa, 0xb0, 0xe4),
    RGBColor(0xcf, 0xcf, 0xcf),
    RGBColor(0xff, 0xfe, 0xa3),
    RGBColor(0xb9, 0xf2, 0xf0),
];

const COOL: RGBColor = RGBColor(59, 76, 192);
const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
const WARM: RGBColor = RGBColor(180, 4, 38);
const MISSING_CELL: RGBColor = RGBColor(200, 200, 200);
const HISTOGRAM_FILL: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for AnalysisError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        AnalysisError::ChartRenderFailed(err.to_string())
    }
}

/// Render one chart to `path`.
pub fn render_chart(spec: &ChartSpec, path: &Path) -> Result<()> {
    debug!("Rendering {}", path.display());
    match spec {
        ChartSpec::CorrelationHeatmap { labels, matrix } => draw_heatmap(path, labels, matrix),
        ChartSpec::TempoVsPopularity { points, trend } => draw_scatter(path, points, *trend),
        ChartSpec::TopPopularTracks { tracks } => draw_bars(path, tracks),
        ChartSpec::TempoDistribution { bins, kde } => draw_histogram(path, bins, kde),
        ChartSpec::KeyDistribution { slices } => draw_pie(path, slices),
    }
}

fn text_style(size: f64, color: &RGBColor) -> TextStyle<'static> {
    (FONT, size).into_font().color(color)
}

fn centered(size: f64, color: &RGBColor) -> TextStyle<'static> {
    text_style(size, color).pos(Pos::new(HPos::Center, VPos::Center))
}

fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Diverging blue-grey-red map over `[-1, 1]`.
fn coolwarm(value: f64) -> RGBColor {
    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0).clamp(0.0, 1.0);
    if t < 0.5 {
        lerp(COOL, NEUTRAL, t * 2.0)
    } else {
        lerp(NEUTRAL, WARM, (t - 0.5) * 2.0)
    }
}

/// Axis range with a 5% margin; a zero-width range is widened by 0.5 on each side.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return 0.0..1.0;
    }
    if max <= min {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 3).collect();
        format!("{head}...")
    }
}

/// Score printed at the end of a bar; whole numbers drop the decimal part.
fn value_label(score: f64) -> String {
    format!("{score}")
}

fn draw_heatmap(path: &Path, labels: &[String], matrix: &[Vec<f64>]) -> Result<()> {
    let root = BitMapBackend::new(path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("Correlation Heatmap of Audio Features", (FONT, 30.0))?;

    let (width, height) = area.dim_in_pixel();
    let (left, right, top, bottom) = (180i32, 120i32, 10i32, 170i32);
    let n = labels.len().max(1) as i32;
    let cell_w = ((width as i32 - left - right) / n).max(1);
    let cell_h = ((height as i32 - top - bottom) / n).max(1);
    let annotation_size = (cell_h as f64 * 0.3).clamp(8.0, 16.0);

    for (row, values) in matrix.iter().enumerate() {
        for (col, &value) in values.iter().enumerate() {
            let x0 = left + col as i32 * cell_w;
            let y0 = top + row as i32 * cell_h;
            let fill = if value.is_nan() {
                MISSING_CELL
            } else {
                coolwarm(value)
            };
            area.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                fill.filled(),
            ))?;
            area.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                WHITE.stroke_width(1),
            ))?;
            if !value.is_nan() {
                let ink = if value.abs() > 0.6 { WHITE } else { BLACK };
                area.draw(&Text::new(
                    format!("{value:.2}"),
                    (x0 + cell_w / 2, y0 + cell_h / 2),
                    centered(annotation_size, &ink),
                ))?;
            }
        }
    }

    let grid_bottom = top + n * cell_h;
    for (i, label) in labels.iter().enumerate() {
        let center = i as i32;
        area.draw(&Text::new(
            label.clone(),
            (left - 8, top + center * cell_h + cell_h / 2),
            text_style(14.0, &BLACK).pos(Pos::new(HPos::Right, VPos::Center)),
        ))?;
        area.draw(&Text::new(
            label.clone(),
            (left + center * cell_w + cell_w / 2, grid_bottom + 8),
            (FONT, 14.0)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    // Color bar
    let bar_x = left + n * cell_w + 30;
    let steps = 100;
    let bar_h = (grid_bottom - top).max(steps);
    for step in 0..steps {
        let value = 1.0 - 2.0 * step as f64 / (steps - 1) as f64;
        let y0 = top + step * bar_h / steps;
        let y1 = top + (step + 1) * bar_h / steps;
        area.draw(&Rectangle::new(
            [(bar_x, y0), (bar_x + 24, y1)],
            coolwarm(value).filled(),
        ))?;
    }
    for (value, y) in [(1.0, top), (0.0, top + bar_h / 2), (-1.0, top + bar_h)] {
        area.draw(&Text::new(
            format!("{value:.1}"),
            (bar_x + 30, y),
            text_style(13.0, &BLACK).pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn draw_scatter(path: &Path, points: &[(f64, f64)], trend: Option<LinearFit>) -> Result<()> {
    let root = BitMapBackend::new(path, SCATTER_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = padded_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().map(|p| p.1));
    let (x_start, x_end) = (x_range.start, x_range.end);

    let mut chart = ChartBuilder::on(&root)
        .caption("Tempo vs Popularity", (FONT, 30))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("Tempo (BPM)")
        .y_desc("Popularity Score")
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.6).filled())),
    )?;

    if let Some(fit) = trend {
        chart
            .draw_series(LineSeries::new(
                vec![(x_start, fit.predict(x_start)), (x_end, fit.predict(x_end))],
                RED.stroke_width(2),
            ))?
            .label("Trend")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_bars(path: &Path, tracks: &[(String, f64)]) -> Result<()> {
    let root = BitMapBackend::new(path, BARS_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("Top 10 Most Popular Tracks", (FONT, 30.0))?;

    let (width, height) = area.dim_in_pixel();
    let (left, right, top, bottom) = (300i32, 60i32, 10i32, 70i32);
    let plot_w = (width as i32 - left - right).max(1);
    let plot_h = (height as i32 - top - bottom).max(1);
    let x_max = tracks
        .iter()
        .map(|t| t.1)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let to_x = |v: f64| left + (v / x_max * plot_w as f64).round() as i32;

    let n = tracks.len().max(1) as i32;
    let slot = plot_h / n;
    for (i, (name, score)) in tracks.iter().enumerate() {
        let y0 = top + i as i32 * slot + slot / 10;
        let y1 = top + (i as i32 + 1) * slot - slot / 10;
        let color = VIRIDIS[i * VIRIDIS.len() / tracks.len().max(1)];
        area.draw(&Rectangle::new([(left, y0), (to_x(*score), y1)], color.filled()))?;
        area.draw(&Text::new(
            truncate_label(name),
            (left - 8, (y0 + y1) / 2),
            text_style(13.0, &BLACK).pos(Pos::new(HPos::Right, VPos::Center)),
        ))?;
        area.draw(&Text::new(
            value_label(*score),
            (to_x(*score) + 6, (y0 + y1) / 2),
            text_style(13.0, &BLACK).pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    let axis_y = top + plot_h;
    area.draw(&PathElement::new(vec![(left, axis_y), (left + plot_w, axis_y)], &BLACK))?;
    area.draw(&PathElement::new(vec![(left, top), (left, axis_y)], &BLACK))?;
    for tick in 0..=5 {
        let value = x_max * tick as f64 / 5.0;
        let x = to_x(value);
        area.draw(&PathElement::new(vec![(x, axis_y), (x, axis_y + 5)], &BLACK))?;
        area.draw(&Text::new(
            format!("{value:.0}"),
            (x, axis_y + 16),
            centered(13.0, &BLACK),
        ))?;
    }
    area.draw(&Text::new(
        "Popularity Score",
        (left + plot_w / 2, axis_y + 45),
        centered(16.0, &BLACK),
    ))?;
    area.draw(&Text::new(
        "Track Name",
        (18, top + plot_h / 2),
        (FONT, 16.0)
            .into_font()
            .transform(FontTransform::Rotate270)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;

    root.present()?;
    Ok(())
}

fn draw_histogram(path: &Path, bins: &[HistogramBin], kde: &[(f64, f64)]) -> Result<()> {
    let root = BitMapBackend::new(path, HISTOGRAM_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => first.start..last.end,
        _ => 0.0..1.0,
    };
    let y_max = bins
        .iter()
        .map(|b| b.count as f64)
        .chain(kde.iter().map(|p| p.1))
        .fold(1.0_f64, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption("Tempo Distribution (Outliers Removed)", (FONT, 30))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..y_max * 1.1)?;
    chart
        .configure_mesh()
        .x_desc("Tempo (BPM)")
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new(
            [(b.start, 0.0), (b.end, b.count as f64)],
            HISTOGRAM_FILL.mix(0.7).filled(),
        )
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], WHITE.stroke_width(1))
    }))?;
    chart.draw_series(LineSeries::new(kde.iter().copied(), BLUE.stroke_width(2)))?;

    root.present()?;
    Ok(())
}

fn draw_pie(path: &Path, slices: &[KeyCount]) -> Result<()> {
    let root = BitMapBackend::new(path, PIE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("Top 6 Most Common Musical Keys", (FONT, 30.0))?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64) * 0.35;

    let sizes: Vec<f64> = slices.iter().map(|s| s.count as f64).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| PASTEL[i % PASTEL.len()])
        .collect();
    let labels: Vec<String> = slices.iter().map(|s| s.value.clone()).collect();

    if sizes.iter().sum::<f64>() > 0.0 {
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(140.0);
        pie.label_style(text_style(18.0, &BLACK));
        pie.percentages(text_style(15.0, &BLACK));
        area.draw(&pie)?;
    }

    root.present()?;
    Ok(())
}
