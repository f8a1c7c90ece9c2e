use log::info;

use crate::app::summary::{summarize, SummaryRow};
use crate::config::FetchConfig;
use crate::error::Result;
use crate::fetch::{
    BatchFetcher, FixedDelay, HttpKlineClient, IntervalBatchParams, KlineSource, MarketPresets,
    SymbolBatchParams,
};

/// One dashboard query, as picked on the command line.
#[derive(Debug, Clone)]
pub enum FetchJob {
    Snapshot {
        symbols: Vec<String>,
    },
    Timeframes {
        symbol: Option<String>,
    },
    Symbols {
        symbols: Vec<String>,
        params: SymbolBatchParams,
        sequential: bool,
        delay_ms: Option<u64>,
    },
    Intervals {
        symbol: String,
        intervals: Vec<String>,
        params: IntervalBatchParams,
    },
}

/// Wire the HTTP client, batch fetcher and presets from configuration.
pub fn build_presets(config: &FetchConfig) -> Result<MarketPresets<HttpKlineClient>> {
    let client = HttpKlineClient::from_config(config)?;
    let fetcher = match config.max_concurrency {
        Some(limit) => BatchFetcher::new(client).with_concurrency_limit(limit),
        None => BatchFetcher::new(client),
    };
    Ok(MarketPresets::with_presets(fetcher, config.presets.clone()))
}

/// Run `job` and return one summary row per requested key, in request order.
pub async fn execute<S: KlineSource>(
    presets: &MarketPresets<S>,
    job: &FetchJob,
    default_delay_ms: u64,
) -> Result<Vec<SummaryRow>> {
    match job {
        FetchJob::Snapshot { symbols } => {
            let requested = if symbols.is_empty() {
                None
            } else {
                Some(symbols.as_slice())
            };
            let map = presets.fetch_major_snapshot(requested).await?;
            let keys = requested.unwrap_or(presets.presets().major_symbols.as_slice());
            Ok(summarize(keys, &map))
        }
        FetchJob::Timeframes { symbol } => {
            let map = presets
                .fetch_single_symbol_all_timeframes(symbol.as_deref())
                .await?;
            Ok(summarize(presets.presets().timeframes.as_slice(), &map))
        }
        FetchJob::Symbols {
            symbols,
            params,
            sequential,
            delay_ms,
        } => {
            let fetcher = presets.fetcher();
            let map = if *sequential {
                let delay_ms = delay_ms.unwrap_or(default_delay_ms);
                info!(
                    "Fetching {} symbols sequentially with {delay_ms} ms gap",
                    symbols.len()
                );
                let pacer = FixedDelay::from_millis(delay_ms);
                fetcher
                    .fetch_sequential_by_symbol_report(symbols.as_slice(), params, &pacer)
                    .await?
                    .into_series_map()
            } else {
                fetcher
                    .fetch_parallel_by_symbol(symbols.as_slice(), params)
                    .await?
            };
            Ok(summarize(symbols.as_slice(), &map))
        }
        FetchJob::Intervals {
            symbol,
            intervals,
            params,
        } => {
            let map = presets
                .fetcher()
                .fetch_parallel_by_interval(symbol, intervals.as_slice(), params)
                .await?;
            Ok(summarize(intervals.as_slice(), &map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubSource;

    fn stub_presets(source: StubSource) -> MarketPresets<StubSource> {
        MarketPresets::new(BatchFetcher::new(source))
    }

    #[tokio::test]
    async fn snapshot_without_symbols_lists_major_pairs() {
        let presets = stub_presets(StubSource::new());

        let rows = execute(&presets, &FetchJob::Snapshot { symbols: vec![] }, 100)
            .await
            .expect("snapshot job");

        let keys: Vec<&str> = rows.iter().map(|row| row.key.as_str()).collect();
        assert_eq!(keys, vec!["BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "ADAUSDT"]);
        assert!(rows.iter().all(|row| row.records == 10));
    }

    #[tokio::test]
    async fn sequential_symbols_job_uses_given_order() {
        let presets = stub_presets(StubSource::new().failing("BADSYMBOL"));
        let job = FetchJob::Symbols {
            symbols: vec!["BTCUSDT".to_string(), "BADSYMBOL".to_string()],
            params: SymbolBatchParams::new("1m").with_limit(5),
            sequential: true,
            delay_ms: Some(0),
        };

        let rows = execute(&presets, &job, 100).await.expect("symbols job");

        assert_eq!(rows[0].key, "BTCUSDT");
        assert_eq!(rows[0].records, 5);
        assert_eq!(rows[1].key, "BADSYMBOL");
        assert_eq!(rows[1].records, 0);
    }

    #[tokio::test]
    async fn intervals_job_keys_rows_by_interval() {
        let presets = stub_presets(StubSource::new());
        let job = FetchJob::Intervals {
            symbol: "ETHUSDT".to_string(),
            intervals: vec!["1h".to_string(), "1d".to_string()],
            params: IntervalBatchParams::default().with_limit(2),
        };

        let rows = execute(&presets, &job, 100).await.expect("intervals job");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].key, "1d");
        assert_eq!(rows[1].records, 2);
    }

    #[test]
    fn builds_presets_from_config() {
        let mut config = FetchConfig::builtin();
        config.max_concurrency = Some(3);

        let presets = build_presets(&config).expect("build presets");

        assert_eq!(presets.fetcher().source().endpoint(), config.endpoint);
        assert_eq!(presets.presets(), &config.presets);
    }
}
