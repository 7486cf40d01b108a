//! groupstats - prints the October group statistics (or any other month).

use anyhow::Context;
use clap::Parser;
use tracing::Level;

use groupstats::config::{Cli, OutputFormat};
use groupstats::data::DataLoader;
use groupstats::stats::StatsCalculator;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = cli.resolve().context("failed to resolve settings")?;
    tracing::info!(
        path = %config.data_path.display(),
        year = config.year,
        month = config.month,
        min_size = config.min_size,
        "groupstats starting"
    );

    let df = DataLoader::load(&config.data_path)
        .with_context(|| format!("failed to load {}", config.data_path.display()))?;
    let report = StatsCalculator::compute_report(&df, config.year, config.month, config.min_size)?;

    match cli.format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
