use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use lvrlab::{prelude::*, report::io::FileExtension};
use polars::prelude::{CsvWriter, IntoLazy, SerWriter, col};
use tracing_subscriber::EnvFilter;

const USD_PER_MILLION: f64 = 1_000_000.0;

/// Runs the TAM analysis over every network and prints the summary.
///
/// Usage: `tam [DATA_DIR] [OUT_DIR]`, defaulting to `dataset` and
/// `reports`.
fn main() -> Result<()> {
    init_tracing();

    let (data_dir, out_dir) = parse_args();

    let pipeline = AnalysisPipeline::new(DatasetConfig::new(&data_dir)?);
    let run = pipeline.run()?;

    let csv_path = write_summary_csv(&out_dir, &run.tam_summary)?;
    println!("CSV file '{}' has been created.", csv_path.display());
    println!();

    for network_run in &run.networks {
        match network_run.tam.date_range() {
            Some((first, last)) => {
                println!("{:?} data range: {first} to {last}", network_run.network);
            }
            None => {
                println!("{:?} data range: no overlapping days", network_run.network);
            }
        }

        let avg_millions =
            network_run.tam.average_daily_tam_usd().unwrap_or(0.0) / USD_PER_MILLION;
        println!(
            "{:?} average daily TAM: ${avg_millions:.2} million",
            network_run.network
        );
    }

    let total_millions = run.tam_summary.combined_avg_daily_tam_usd()? / USD_PER_MILLION;
    println!("\nTotal average daily TAM across all networks: ${total_millions:.2} million");

    Ok(())
}

// ================================================================================================
// Exports
// ================================================================================================

/// Writes the per-network summary with the published header names.
///
/// The library schema stays snake_case; the presentation names only exist
/// in this exported artifact.
fn write_summary_csv(out_dir: &Path, summary: &TamSummary) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create '{}'", out_dir.display()))?;

    let mut pretty = summary
        .as_df()
        .clone()
        .lazy()
        .select([
            col(TamSummaryCol::Network).alias("Network"),
            col(TamSummaryCol::AvgDailyTamMusd).alias("Average Daily TAM (Millions USD)"),
        ])
        .collect()?;

    let path = out_dir.join(summary.filename(FileExtension::Csv));
    let mut file = fs::File::create(&path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    CsvWriter::new(&mut file).finish(&mut pretty)?;

    Ok(path)
}

// ================================================================================================
// Setup
// ================================================================================================

fn parse_args() -> (PathBuf, PathBuf) {
    let mut args = env::args().skip(1);

    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dataset"));
    let out_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("reports"));

    (data_dir, out_dir)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
