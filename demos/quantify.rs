use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use lvrlab::{prelude::*, report::io::FileExtension};
use tracing_subscriber::EnvFilter;

/// Derives every LVR report for one network and exports the tables.
///
/// Usage: `quantify [DATA_DIR] [NETWORK] [OUT_DIR]`, defaulting to
/// `dataset`, `optimism` and `reports`.
fn main() -> Result<()> {
    init_tracing();

    let args = parse_args()?;

    let pipeline = AnalysisPipeline::new(DatasetConfig::new(&args.data_dir)?);
    let run = pipeline.run_network(args.network)?;

    let overview = run.ledger.overview()?;
    let leaderboard = run.ledger.pool_leaderboard()?;
    let weekday = run.ledger.weekday_profile()?;
    let week_of_month = run.ledger.week_of_month_profile()?;

    println!("\n--- {:?} Average LVR (Basis Points) ---", args.network);
    println!("Daily:   {:.4}", overview.daily_lvr_bps()?);
    println!("Weekly:  {:.4}", overview.weekly_lvr_bps()?);
    println!("Monthly: {:.4}", overview.monthly_lvr_bps()?);

    println!("\n--- Longest Active Pools by Average Daily LVR ---");
    println!("{}", leaderboard.as_df());

    println!("\n--- Average LVR by Day of Week ---");
    println!("{}", weekday.as_df());

    println!("\n--- Average LVR by Week of Month ---");
    println!("{}", week_of_month.as_df());

    export_reports(&args.out_dir, &run, &overview, &leaderboard, &weekday, &week_of_month)?;
    println!("\nReports written to '{}'.", args.out_dir.display());

    Ok(())
}

// ================================================================================================
// Exports
// ================================================================================================

fn export_reports(
    out_dir: &Path,
    run: &NetworkRun,
    overview: &LvrOverview,
    leaderboard: &PoolLeaderboard,
    weekday: &WeekdayProfile,
    week_of_month: &WeekOfMonthProfile,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create '{}'", out_dir.display()))?;

    overview.to_csv(out_dir, None, None)?;
    leaderboard.to_csv(out_dir, None, None)?;
    run.daily_lvr.to_csv(out_dir, None, None)?;
    weekday.to_csv(out_dir, None, None)?;
    week_of_month.to_csv(out_dir, None, None)?;

    // The leaderboard additionally goes out as JSON, with the active
    // durations rendered human readable.
    let json = serde_json::to_string_pretty(&leaderboard.to_json()?)?;
    let json_path = out_dir.join(leaderboard.filename(FileExtension::Json));
    fs::write(&json_path, json)
        .with_context(|| format!("Failed to write '{}'", json_path.display()))?;

    Ok(())
}

// ================================================================================================
// Setup
// ================================================================================================

struct Args {
    data_dir: PathBuf,
    network: Network,
    out_dir: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);

    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dataset"));
    let network = match args.next() {
        Some(raw) => Network::from_str(&raw).with_context(|| {
            format!("Unknown network '{raw}', expected one of: arbitrum, base, mainnet, optimism")
        })?,
        None => Network::Optimism,
    };
    let out_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("reports"));

    Ok(Args {
        data_dir,
        network,
        out_dir,
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
