use crate::config::PresetConfig;

use super::batch::BatchFetcher;
use super::client::KlineSource;
use super::kline::{IntervalBatchParams, KlineMap, SymbolBatchParams};
use super::FetchResult;

/// Named dashboard queries layered over [`BatchFetcher`].
pub struct MarketPresets<S> {
    fetcher: BatchFetcher<S>,
    presets: PresetConfig,
}

impl<S: KlineSource> MarketPresets<S> {
    pub fn new(fetcher: BatchFetcher<S>) -> Self {
        Self::with_presets(fetcher, PresetConfig::builtin())
    }

    pub fn with_presets(fetcher: BatchFetcher<S>, presets: PresetConfig) -> Self {
        Self { fetcher, presets }
    }

    pub fn fetcher(&self) -> &BatchFetcher<S> {
        &self.fetcher
    }

    pub fn presets(&self) -> &PresetConfig {
        &self.presets
    }

    /// Latest short-interval candles for several symbols at once. `None`
    /// uses the configured list of major pairs.
    pub async fn fetch_major_snapshot(&self, symbols: Option<&[String]>) -> FetchResult<KlineMap> {
        let symbols = symbols.unwrap_or(self.presets.major_symbols.as_slice());
        let params = SymbolBatchParams::new(self.presets.snapshot_interval.as_str())
            .with_limit(self.presets.snapshot_limit);

        self.fetcher.fetch_parallel_by_symbol(symbols, &params).await
    }

    /// Every configured timeframe for one symbol, keyed by interval.
    pub async fn fetch_single_symbol_all_timeframes(
        &self,
        symbol: Option<&str>,
    ) -> FetchResult<KlineMap> {
        let symbol = symbol.unwrap_or(self.presets.default_symbol.as_str());
        let params = IntervalBatchParams::default().with_limit(self.presets.timeframe_limit);

        self.fetcher
            .fetch_parallel_by_interval(symbol, self.presets.timeframes.as_slice(), &params)
            .await
    }
}
