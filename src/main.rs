mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use cli::{Cli, Commands};
use kline_batch::app::{build_presets, execute, render_rows};
use kline_batch::config::{load_config, FetchConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path).context("Failed to load configuration")?,
        None => FetchConfig::builtin(),
    };

    let title = match &cli.command {
        Commands::Snapshot { .. } => "Major symbols snapshot",
        Commands::Timeframes { .. } => "Single symbol, all timeframes",
        Commands::Symbols { .. } => "Klines by symbol",
        Commands::Intervals { .. } => "Klines by interval",
    };

    let presets = build_presets(&config).context("Failed to build klines client")?;
    let job = cli.command.into_job();

    let rows = execute(&presets, &job, config.sequential_delay_ms)
        .await
        .context("Batch fetch failed")?;

    cli::show_banner(title);
    print!("{}", render_rows(&rows));

    Ok(())
}
