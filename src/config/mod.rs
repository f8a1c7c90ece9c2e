use serde::{Deserialize, Serialize};

use crate::fetch::{DEFAULT_SEQUENTIAL_DELAY_MS, KLINES_ENDPOINT};

pub mod loader;
pub mod validator;

pub use loader::{load_config, load_config_from_str};
pub use validator::validate_config;

/// Symbols, intervals and page sizes used by the dashboard presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub major_symbols: Vec<String>,
    pub snapshot_interval: String,
    pub snapshot_limit: u16,
    pub default_symbol: String,
    pub timeframes: Vec<String>,
    pub timeframe_limit: u16,
}

impl PresetConfig {
    pub fn builtin() -> Self {
        Self {
            major_symbols: ["BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "ADAUSDT"]
                .into_iter()
                .map(String::from)
                .collect(),
            snapshot_interval: "1m".to_string(),
            snapshot_limit: 10,
            default_symbol: "BTCUSDT".to_string(),
            timeframes: ["1m", "5m", "15m", "1h", "4h", "1d"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeframe_limit: 10,
        }
    }
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    pub endpoint: String,
    /// No timeout is applied when unset; a hung call then blocks its slot.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub sequential_delay_ms: u64,
    pub max_concurrency: Option<usize>,
    pub presets: PresetConfig,
}

impl FetchConfig {
    pub fn builtin() -> Self {
        Self {
            endpoint: KLINES_ENDPOINT.to_string(),
            request_timeout_secs: None,
            user_agent: None,
            sequential_delay_ms: DEFAULT_SEQUENTIAL_DELAY_MS,
            max_concurrency: None,
            presets: PresetConfig::builtin(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
