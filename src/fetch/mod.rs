use crate::error::Result;

pub mod batch;
pub mod client;
pub mod exchange_info;
pub mod kline;
pub mod pacing;
pub mod presets;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchFetcher, BatchReport, FetchOutcome};
pub use client::{HttpKlineClient, KlineSource};
pub use kline::{
    IntervalBatchParams, KlineMap, KlineRecord, KlineSeries, KlinesParams, SymbolBatchParams,
};
pub use pacing::{FixedDelay, NoDelay, Pacer};
pub use presets::MarketPresets;

/// Futures klines endpoint on the public market-data host.
pub const KLINES_ENDPOINT: &str = "https://fapi.binance.com/fapi/v1/klines";

/// Courtesy gap between calls of a sequential batch.
pub const DEFAULT_SEQUENTIAL_DELAY_MS: u64 = 100;

pub type FetchResult<T> = Result<T>;

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}
