use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use kline_batch::app::FetchJob;
use kline_batch::fetch::{IntervalBatchParams, SymbolBatchParams};

#[derive(Parser)]
#[command(name = "kline-batch")]
#[command(about = "Batch-fetch futures klines for several symbols or intervals")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON fetch config; builtin defaults when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Latest 1m candles for the major pairs (or the given symbols)
    Snapshot {
        symbols: Vec<String>,
    },

    /// Every configured timeframe for one symbol
    Timeframes {
        symbol: Option<String>,
    },

    /// One interval across several symbols
    Symbols {
        #[arg(short, long)]
        interval: String,

        #[command(flatten)]
        range: RangeArgs,

        /// Fetch one symbol at a time instead of all at once
        #[arg(long)]
        sequential: bool,

        /// Gap between sequential calls in milliseconds
        #[arg(long, requires = "sequential")]
        delay_ms: Option<u64>,

        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Several intervals for one symbol
    Intervals {
        #[arg(short, long)]
        symbol: String,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(required = true)]
        intervals: Vec<String>,
    },
}

#[derive(Args, Clone, Copy)]
pub struct RangeArgs {
    /// Candles per request (exchange default 500, max 1500)
    #[arg(short, long)]
    pub limit: Option<u16>,

    /// Start time in epoch milliseconds
    #[arg(long)]
    pub start: Option<i64>,

    /// End time in epoch milliseconds
    #[arg(long)]
    pub end: Option<i64>,
}

impl Commands {
    pub fn into_job(self) -> FetchJob {
        match self {
            Commands::Snapshot { symbols } => FetchJob::Snapshot { symbols },
            Commands::Timeframes { symbol } => FetchJob::Timeframes { symbol },
            Commands::Symbols {
                interval,
                range,
                sequential,
                delay_ms,
                symbols,
            } => {
                let mut params =
                    SymbolBatchParams::new(interval).with_range(range.start, range.end);
                params.limit = range.limit;
                FetchJob::Symbols {
                    symbols,
                    params,
                    sequential,
                    delay_ms,
                }
            }
            Commands::Intervals {
                symbol,
                range,
                intervals,
            } => {
                let mut params =
                    IntervalBatchParams::default().with_range(range.start, range.end);
                params.limit = range.limit;
                FetchJob::Intervals {
                    symbol,
                    intervals,
                    params,
                }
            }
        }
    }
}

pub fn show_banner(title: &str) {
    println!("# ---------------------------------------------------------------- #");
    println!("# {title}");
    println!(
        "# Executing date: {}",
        kline_batch::utils::current_human_timestamp()
    );
    println!("# ---------------------------------------------------------------- #");
}
