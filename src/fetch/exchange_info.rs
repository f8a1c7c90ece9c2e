//! Response shape of the futures exchange-info endpoint.
//!
//! Nothing in the batch layer requests this document; the types exist so
//! dashboard code can decode instrument metadata with the same crate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    #[serde(default)]
    pub exchange_filters: Vec<serde_json::Value>,
    pub rate_limits: Vec<RateLimit>,
    pub server_time: i64,
    pub assets: Vec<Asset>,
    pub symbols: Vec<SymbolInfo>,
    pub timezone: String,
}

impl ExchangeInfo {
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|info| info.symbol == symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub interval: String,
    pub interval_num: u32,
    pub limit: u32,
    pub rate_limit_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset: String,
    pub margin_available: bool,
    pub auto_asset_exchange: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub pair: String,
    pub contract_type: String,
    pub delivery_date: i64,
    pub onboard_date: i64,
    pub status: String,
    pub maint_margin_percent: String,
    pub required_margin_percent: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub margin_asset: String,
    pub price_precision: u32,
    pub quantity_precision: u32,
    pub base_asset_precision: u32,
    pub quote_precision: u32,
    pub underlying_type: String,
    #[serde(default)]
    pub underlying_sub_type: Vec<String>,
    #[serde(default)]
    pub settle_plan: i64,
    pub trigger_protect: String,
    pub liquidation_fee: String,
    pub market_take_bound: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
    #[serde(default)]
    pub order_types: Vec<String>,
    #[serde(default)]
    pub time_in_force: Vec<String>,
}

impl SymbolInfo {
    pub fn filter(&self, filter_type: &str) -> Option<&SymbolFilter> {
        self.filters
            .iter()
            .find(|filter| filter.filter_type == filter_type)
    }
}

/// A single entry of a symbol's `filters` list. Which fields are present
/// depends on `filter_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFilter {
    pub filter_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_qty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier_down: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier_decimal: Option<String>,
}
