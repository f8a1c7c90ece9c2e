use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use log::{error, info};

use crate::error::AppError;

use super::client::KlineSource;
use super::kline::{
    IntervalBatchParams, KlineMap, KlineRecord, KlineSeries, KlinesParams, SymbolBatchParams,
};
use super::pacing::{FixedDelay, Pacer};
use super::{ensure_concurrency_limit, FetchResult, DEFAULT_SEQUENTIAL_DELAY_MS};

/// Result of one call inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(KlineSeries),
    Failed(String),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    /// Records for this key; a failed call reads as no records.
    pub fn series(&self) -> &[KlineRecord] {
        match self {
            FetchOutcome::Fetched(series) => series,
            FetchOutcome::Failed(_) => &[],
        }
    }

    pub fn into_series(self) -> KlineSeries {
        match self {
            FetchOutcome::Fetched(series) => series,
            FetchOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Per-key outcomes of a batch, in the order the keys were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    entries: Vec<(String, FetchOutcome)>,
}

impl BatchReport {
    pub fn entries(&self) -> &[(String, FetchOutcome)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&FetchOutcome> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, outcome)| outcome)
    }

    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(key, _)| key.as_str())
    }

    pub fn failed_count(&self) -> usize {
        self.failed_keys().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse to the plain lookup map, failed keys mapping to empty series.
    pub fn into_series_map(self) -> KlineMap {
        self.entries
            .into_iter()
            .map(|(key, outcome)| (key, outcome.into_series()))
            .collect()
    }
}

/// Fans klines requests out over symbols or intervals and keys the results.
///
/// A failing call never fails the batch: it is logged and its key maps to
/// an empty series. Only malformed input, rejected before any request is
/// sent, surfaces as `Err`.
pub struct BatchFetcher<S> {
    source: S,
    concurrency_limit: Option<usize>,
}

impl<S: KlineSource> BatchFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            concurrency_limit: None,
        }
    }

    /// Cap the number of parallel calls in flight. Result order is unchanged.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(ensure_concurrency_limit(limit));
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn fetch_parallel_by_symbol<K: AsRef<str>>(
        &self,
        symbols: &[K],
        common: &SymbolBatchParams,
    ) -> FetchResult<KlineMap> {
        Ok(self
            .fetch_parallel_by_symbol_report(symbols, common)
            .await?
            .into_series_map())
    }

    pub async fn fetch_parallel_by_symbol_report<K: AsRef<str>>(
        &self,
        symbols: &[K],
        common: &SymbolBatchParams,
    ) -> FetchResult<BatchReport> {
        validate_symbol_batch(symbols, common).map_err(|err| {
            error!("Error in batch API calls: {err}");
            err
        })?;

        let requests = distinct_keys(symbols)
            .into_iter()
            .map(|symbol| (symbol.to_string(), common.for_symbol(symbol)))
            .collect();

        let report = self
            .fan_out(requests, |symbol, err| {
                error!("Error fetching data for {symbol}: {err}");
            })
            .await;
        log_summary("symbol", &report);
        Ok(report)
    }

    /// Sequential fetch with the default 100 ms courtesy gap.
    pub async fn fetch_sequential_by_symbol_default<K: AsRef<str>>(
        &self,
        symbols: &[K],
        common: &SymbolBatchParams,
    ) -> FetchResult<KlineMap> {
        self.fetch_sequential_by_symbol(symbols, common, DEFAULT_SEQUENTIAL_DELAY_MS)
            .await
    }

    pub async fn fetch_sequential_by_symbol<K: AsRef<str>>(
        &self,
        symbols: &[K],
        common: &SymbolBatchParams,
        delay_ms: u64,
    ) -> FetchResult<KlineMap> {
        let pacer = FixedDelay::from_millis(delay_ms);
        Ok(self
            .fetch_sequential_by_symbol_report(symbols, common, &pacer)
            .await?
            .into_series_map())
    }

    /// Issue one call per symbol, in order, letting `pacer` decide the gap
    /// between consecutive calls.
    pub async fn fetch_sequential_by_symbol_report<K, P>(
        &self,
        symbols: &[K],
        common: &SymbolBatchParams,
        pacer: &P,
    ) -> FetchResult<BatchReport>
    where
        K: AsRef<str>,
        P: Pacer + ?Sized,
    {
        validate_symbol_batch(symbols, common).map_err(|err| {
            error!("Error in sequential API calls: {err}");
            err
        })?;

        let symbols = distinct_keys(symbols);
        let total = symbols.len();
        let mut entries = Vec::with_capacity(total);

        for (index, symbol) in symbols.into_iter().enumerate() {
            let params = common.for_symbol(symbol);

            let outcome = match self.source.fetch_klines(&params).await {
                Ok(series) => FetchOutcome::Fetched(series),
                Err(err) => {
                    error!("Error fetching data for {symbol}: {err}");
                    FetchOutcome::Failed(err.to_string())
                }
            };
            entries.push((symbol.to_string(), outcome));

            let remaining = total - index - 1;
            if remaining > 0 {
                pacer.pause(index + 1, remaining).await;
            }
        }

        let report = BatchReport { entries };
        log_summary("symbol", &report);
        Ok(report)
    }

    pub async fn fetch_parallel_by_interval<K: AsRef<str>>(
        &self,
        symbol: &str,
        intervals: &[K],
        other: &IntervalBatchParams,
    ) -> FetchResult<KlineMap> {
        Ok(self
            .fetch_parallel_by_interval_report(symbol, intervals, other)
            .await?
            .into_series_map())
    }

    pub async fn fetch_parallel_by_interval_report<K: AsRef<str>>(
        &self,
        symbol: &str,
        intervals: &[K],
        other: &IntervalBatchParams,
    ) -> FetchResult<BatchReport> {
        validate_interval_batch(symbol, intervals).map_err(|err| {
            error!("Error in multi-interval API calls: {err}");
            err
        })?;

        let requests = distinct_keys(intervals)
            .into_iter()
            .map(|interval| {
                (
                    interval.to_string(),
                    other.for_interval(symbol, interval),
                )
            })
            .collect();

        let report = self
            .fan_out(requests, |interval, err| {
                error!("Error fetching {interval} data for {symbol}: {err}");
            })
            .await;
        log_summary("interval", &report);
        Ok(report)
    }

    async fn fan_out<F>(&self, requests: Vec<(String, KlinesParams)>, on_error: F) -> BatchReport
    where
        F: Fn(&str, &AppError),
    {
        let limit = ensure_concurrency_limit(self.concurrency_limit.unwrap_or(requests.len()));

        // `buffered` yields in submission order, so keys line up with the input
        // no matter which call finishes first.
        let results: Vec<(String, FetchResult<KlineSeries>)> = stream::iter(requests)
            .map(|(key, params)| async move {
                let result = self.source.fetch_klines(&params).await;
                (key, result)
            })
            .buffered(limit)
            .collect()
            .await;

        let entries = results
            .into_iter()
            .map(|(key, result)| {
                let outcome = match result {
                    Ok(series) => FetchOutcome::Fetched(series),
                    Err(err) => {
                        on_error(&key, &err);
                        FetchOutcome::Failed(err.to_string())
                    }
                };
                (key, outcome)
            })
            .collect();

        BatchReport { entries }
    }
}

fn log_summary(dimension: &str, report: &BatchReport) {
    info!(
        "Fetched klines by {dimension}: {} ok, {} failed",
        report.len() - report.failed_count(),
        report.failed_count()
    );
}

fn validate_symbol_batch<K: AsRef<str>>(
    symbols: &[K],
    common: &SymbolBatchParams,
) -> FetchResult<()> {
    if common.interval.trim().is_empty() {
        return Err(AppError::invalid_argument("interval must not be blank"));
    }
    validate_keys("symbol", symbols)
}

fn validate_interval_batch<K: AsRef<str>>(symbol: &str, intervals: &[K]) -> FetchResult<()> {
    if symbol.trim().is_empty() {
        return Err(AppError::invalid_argument("symbol must not be blank"));
    }
    validate_keys("interval", intervals)
}

fn validate_keys<K: AsRef<str>>(dimension: &str, keys: &[K]) -> FetchResult<()> {
    if keys.iter().any(|key| key.as_ref().trim().is_empty()) {
        return Err(AppError::invalid_argument(format!(
            "{dimension} must not be blank"
        )));
    }
    Ok(())
}

/// Keys in first-seen order with repeats dropped; one call per distinct key.
fn distinct_keys<K: AsRef<str>>(keys: &[K]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .map(|key| key.as_ref())
        .filter(|key| seen.insert(*key))
        .collect()
}
