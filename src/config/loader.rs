use std::{fs, path::Path};

use log::warn;
use serde::Deserialize;

use crate::error::{Context, Result};

use super::{validator, FetchConfig, PresetConfig};

/// Load a fetch configuration from a JSON file, filling gaps with builtin values.
pub fn load_config(path: &Path) -> Result<FetchConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read fetch config JSON at {}", path.display()))?;

    load_config_from_str(&json)
        .with_context(|| format!("invalid fetch config at {}", path.display()))
        .map_err(Into::into)
}

pub fn load_config_from_str(json: &str) -> Result<FetchConfig> {
    let raw: RawFetchConfig = serde_json::from_str(json)?;
    let config = raw.into_config();

    validator::validate_config(&config)?;

    Ok(config)
}

#[derive(Debug, Deserialize, Default)]
struct RawFetchConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    sequential_delay_ms: Option<u64>,
    #[serde(default)]
    max_concurrency: Option<usize>,
    #[serde(default)]
    presets: RawPresetConfig,
}

impl RawFetchConfig {
    fn into_config(self) -> FetchConfig {
        let builtin = FetchConfig::builtin();

        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => {
                warn!(
                    "fetch config has no endpoint, falling back to {}",
                    builtin.endpoint
                );
                builtin.endpoint
            }
        };

        FetchConfig {
            endpoint,
            request_timeout_secs: self.request_timeout_secs,
            user_agent: self.user_agent,
            sequential_delay_ms: self
                .sequential_delay_ms
                .unwrap_or(builtin.sequential_delay_ms),
            max_concurrency: self.max_concurrency,
            presets: self.presets.into_presets(builtin.presets),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawPresetConfig {
    #[serde(default)]
    major_symbols: Option<Vec<String>>,
    #[serde(default)]
    snapshot_interval: Option<String>,
    #[serde(default)]
    snapshot_limit: Option<u16>,
    #[serde(default)]
    default_symbol: Option<String>,
    #[serde(default)]
    timeframes: Option<Vec<String>>,
    #[serde(default)]
    timeframe_limit: Option<u16>,
}

impl RawPresetConfig {
    fn into_presets(self, fallback: PresetConfig) -> PresetConfig {
        PresetConfig {
            major_symbols: self.major_symbols.unwrap_or(fallback.major_symbols),
            snapshot_interval: self.snapshot_interval.unwrap_or(fallback.snapshot_interval),
            snapshot_limit: self.snapshot_limit.unwrap_or(fallback.snapshot_limit),
            default_symbol: self.default_symbol.unwrap_or(fallback.default_symbol),
            timeframes: self.timeframes.unwrap_or(fallback.timeframes),
            timeframe_limit: self.timeframe_limit.unwrap_or(fallback.timeframe_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join("configs")
            .join("binance_futures.json");

        let config = load_config(&path).expect("load shipped config");

        assert_eq!(config.endpoint, "https://fapi.binance.com/fapi/v1/klines");
        assert_eq!(config.presets, PresetConfig::builtin());
        assert_eq!(config.sequential_delay_ms, 100);
    }

    #[test]
    fn missing_keys_fall_back_to_builtin() {
        let config = load_config_from_str("{}").expect("empty object is a valid config");

        assert_eq!(config, FetchConfig::builtin());
    }

    #[test]
    fn overrides_presets_partially() {
        let json = r#"{
            "request_timeout_secs": 5,
            "presets": { "major_symbols": ["BTCUSDT", "XRPUSDT"], "snapshot_limit": 20 }
        }"#;

        let config = load_config_from_str(json).expect("partial override");

        assert_eq!(config.request_timeout_secs, Some(5));
        assert_eq!(config.presets.major_symbols, vec!["BTCUSDT", "XRPUSDT"]);
        assert_eq!(config.presets.snapshot_limit, 20);
        assert_eq!(config.presets.snapshot_interval, "1m");
        assert_eq!(config.presets.timeframes.len(), 6);
    }

    #[test]
    fn rejects_invalid_values() {
        let json = r#"{ "endpoint": "ftp://example.com/klines" }"#;

        let err = load_config_from_str(json).expect_err("ftp endpoint should be rejected");
        assert!(err.to_string().contains("http"), "unexpected error: {err}");
    }

    #[test]
    fn reports_missing_file() {
        let err = load_config(Path::new("does/not/exist.json")).expect_err("missing file");
        assert!(
            err.to_string().contains("failed to read fetch config"),
            "unexpected error: {err}"
        );
    }
}
