use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::{sleep, Duration};

use crate::error::AppError;

use super::client::KlineSource;
use super::kline::{KlineRecord, KlineSeries, KlinesParams};
use super::FetchResult;

/// Builds `count` one-minute klines starting at `open_time`.
pub fn sample_series(count: usize, open_time: i64) -> KlineSeries {
    (0..count)
        .map(|i| {
            let start = open_time + i as i64 * 60_000;
            let price = format!("{}.50", 100 + i);
            KlineRecord {
                open_time: start,
                open: price.clone(),
                high: price.clone(),
                low: price.clone(),
                close: price,
                volume: "12.000".to_string(),
                close_time: start + 59_999,
                quote_asset_volume: "1206.000".to_string(),
                trade_count: 42,
                taker_buy_base_volume: "6.000".to_string(),
                taker_buy_quote_volume: "603.000".to_string(),
                ignore: serde_json::Value::from("0"),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub params: KlinesParams,
    pub started_at: Instant,
}

/// In-memory `KlineSource`. Any symbol or interval listed in `failing`
/// answers with a 400; everything else returns `limit` (or 3) records.
#[derive(Default)]
pub struct StubSource {
    failing: HashSet<String>,
    latency: HashMap<String, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn with_latency(mut self, key: &str, latency: Duration) -> Self {
        self.latency.insert(key.to_string(), latency);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KlineSource for StubSource {
    async fn fetch_klines(&self, params: &KlinesParams) -> FetchResult<KlineSeries> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            params: params.clone(),
            started_at: Instant::now(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = self
            .latency
            .get(&params.symbol)
            .or_else(|| self.latency.get(&params.interval))
            .copied()
            .unwrap_or(Duration::from_millis(5));
        sleep(latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&params.symbol) || self.failing.contains(&params.interval) {
            return Err(AppError::Status {
                status: StatusCode::BAD_REQUEST,
                body: r#"{"code":-1121,"msg":"Invalid symbol."}"#.to_string(),
            });
        }

        let count = params.limit.map(usize::from).unwrap_or(3);
        Ok(sample_series(count, params.start_time.unwrap_or(1_700_000_000_000)))
    }
}
