//! CLI entry point for the track analysis.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use track_analysis::{AnalysisConfig, AnalysisPipeline, DatasetLoader, ReportGenerator};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis of a music track catalogue",
    long_about = "Reads <base-dir>/data/spotify_tracks.csv, cleans it, removes tempo outliers \
                  and writes charts and CSV exports to <base-dir>/data/output/.\n\n\
                  EXAMPLES:\n  \
                  # Run against ./data\n  \
                  track-analysis\n\n  \
                  # Another project root, with a JSON run report\n  \
                  track-analysis --base-dir /srv/music -r"
)]
struct Args {
    /// Directory containing `data/`; defaults to the working directory
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Also write analysis_report.json to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over the command-line level.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let pipeline = AnalysisPipeline::try_new(AnalysisConfig {
        base_dir: args.base_dir,
        ..Default::default()
    })?;

    let loader = DatasetLoader::new(pipeline.config());
    let output_dir = loader.ensure_output_dir()?;
    let raw = loader.load()?;

    let result = pipeline.run(&raw)?;

    // The only line written to stdout
    match &result.most_common_key {
        Some(key) => println!("Most common musical key: {}", key.value),
        None => warn!("No musical key could be determined"),
    }

    let generator = ReportGenerator::new(output_dir);
    let mut artifacts = generator.render_charts(&result)?;
    artifacts.extend(generator.export_datasets(&result)?);

    if args.emit_report {
        let report = ReportGenerator::build_report(pipeline.config(), &result, &artifacts);
        artifacts.push(generator.write_report_to_file(&report)?);
    }

    info!(
        "Wrote {} files to {}",
        artifacts.len(),
        generator.output_dir().display()
    );
    Ok(())
}
