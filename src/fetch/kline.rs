use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// One candlestick as returned by the futures klines endpoint.
///
/// The exchange encodes a kline as a 12-element JSON array; field order is
/// fixed by the API. Prices and volumes stay as the decimal strings the
/// exchange sent so nothing is lost to float rounding. The trailing field is
/// unused upstream and kept as whatever JSON value arrived.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KlineRecord {
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub close_time: i64,
    pub quote_asset_volume: String,
    pub trade_count: u64,
    pub taker_buy_base_volume: String,
    pub taker_buy_quote_volume: String,
    pub ignore: Value,
}

impl Serialize for KlineRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.open_time,
            &self.open,
            &self.high,
            &self.low,
            &self.close,
            &self.volume,
            self.close_time,
            &self.quote_asset_volume,
            self.trade_count,
            &self.taker_buy_base_volume,
            &self.taker_buy_quote_volume,
            &self.ignore,
        )
            .serialize(serializer)
    }
}

impl KlineRecord {
    pub fn open_price(&self) -> Option<f64> {
        parse_decimal(&self.open)
    }

    pub fn high_price(&self) -> Option<f64> {
        parse_decimal(&self.high)
    }

    pub fn low_price(&self) -> Option<f64> {
        parse_decimal(&self.low)
    }

    pub fn close_price(&self) -> Option<f64> {
        parse_decimal(&self.close)
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Klines for one symbol/interval query, ascending by open time.
pub type KlineSeries = Vec<KlineRecord>;

/// Series keyed by the fan-out dimension (symbol or interval).
pub type KlineMap = HashMap<String, KlineSeries>;

/// Largest page the exchange accepts. Not enforced locally.
pub const MAX_KLINE_LIMIT: u16 = 1500;

/// Full query for a single klines request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlinesParams {
    pub symbol: String,
    pub interval: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub limit: Option<u16>,
}

impl KlinesParams {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    /// Query-string pairs in the order the endpoint documents them.
    /// Absent bounds are left out rather than sent empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("symbol", self.symbol.clone()),
            ("interval", self.interval.clone()),
        ];
        if let Some(start) = self.start_time {
            pairs.push(("startTime", start.to_string()));
        }
        if let Some(end) = self.end_time {
            pairs.push(("endTime", end.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Parameters shared by every call of a by-symbol batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolBatchParams {
    pub interval: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub limit: Option<u16>,
}

impl SymbolBatchParams {
    pub fn new(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_range(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn for_symbol(&self, symbol: &str) -> KlinesParams {
        KlinesParams {
            symbol: symbol.to_string(),
            interval: self.interval.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            limit: self.limit,
        }
    }
}

/// Parameters shared by every call of a by-interval batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalBatchParams {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub limit: Option<u16>,
}

impl IntervalBatchParams {
    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_range(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn for_interval(&self, symbol: &str, interval: &str) -> KlinesParams {
        KlinesParams {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            start_time: self.start_time,
            end_time: self.end_time,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        1499040000000,
        "0.01634790",
        "0.80000000",
        "0.01575800",
        "0.01577100",
        "148976.11427815",
        1499644799999,
        "2434.19055334",
        308,
        "1756.87402397",
        "28.46694368",
        "0"
    ]"#;

    #[test]
    fn decodes_array_layout_in_field_order() {
        let record: KlineRecord = serde_json::from_str(SAMPLE).expect("decode kline");

        assert_eq!(record.open_time, 1_499_040_000_000);
        assert_eq!(record.open, "0.01634790");
        assert_eq!(record.high, "0.80000000");
        assert_eq!(record.low, "0.01575800");
        assert_eq!(record.close, "0.01577100");
        assert_eq!(record.volume, "148976.11427815");
        assert_eq!(record.close_time, 1_499_644_799_999);
        assert_eq!(record.quote_asset_volume, "2434.19055334");
        assert_eq!(record.trade_count, 308);
        assert_eq!(record.taker_buy_base_volume, "1756.87402397");
        assert_eq!(record.taker_buy_quote_volume, "28.46694368");
        assert_eq!(record.ignore, "0");
    }

    #[test]
    fn encodes_back_to_the_same_array() {
        let record: KlineRecord = serde_json::from_str(SAMPLE).expect("decode kline");
        let encoded = serde_json::to_value(&record).expect("encode kline");
        let expected: Value = serde_json::from_str(SAMPLE).expect("parse sample");

        assert_eq!(encoded, expected);
    }

    #[test]
    fn accepts_any_trailing_value() {
        let numeric = r#"[1499040000000,"0.1","0.2","0.1","0.15","5.0",1499040059999,"0.75",3,"2.0","0.3",0]"#;
        let null = r#"[1499040000000,"0.1","0.2","0.1","0.15","5.0",1499040059999,"0.75",3,"2.0","0.3",null]"#;

        let record: KlineRecord = serde_json::from_str(numeric).expect("numeric trailing field");
        assert_eq!(record.ignore, Value::from(0));
        assert_eq!(record.trade_count, 3);

        let record: KlineRecord = serde_json::from_str(null).expect("null trailing field");
        assert!(record.ignore.is_null());
    }

    #[test]
    fn rejects_short_rows() {
        let short = r#"[1499040000000, "0.1", "0.2"]"#;
        assert!(serde_json::from_str::<KlineRecord>(short).is_err());
    }

    #[test]
    fn parses_prices_on_demand() {
        let record: KlineRecord = serde_json::from_str(SAMPLE).expect("decode kline");
        let close = record.close_price().expect("close parses");
        assert!((close - 0.015771).abs() < 1e-9);
    }

    #[test]
    fn query_pairs_skip_missing_bounds() {
        let params = SymbolBatchParams::new("1m").with_limit(10).for_symbol("BTCUSDT");

        assert_eq!(
            params.query_pairs(),
            vec![
                ("symbol", "BTCUSDT".to_string()),
                ("interval", "1m".to_string()),
                ("limit", "10".to_string()),
            ]
        );
    }

    #[test]
    fn query_pairs_include_time_range() {
        let params = IntervalBatchParams::default()
            .with_range(Some(1_000), Some(2_000))
            .for_interval("ETHUSDT", "1h");

        assert_eq!(
            params.query_pairs(),
            vec![
                ("symbol", "ETHUSDT".to_string()),
                ("interval", "1h".to_string()),
                ("startTime", "1000".to_string()),
                ("endTime", "2000".to_string()),
            ]
        );
    }
}
