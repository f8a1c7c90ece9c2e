use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::fetch::kline::MAX_KLINE_LIMIT;

use super::{FetchConfig, PresetConfig};

/// Validate a fetch configuration and surface every problem at once.
pub fn validate_config(config: &FetchConfig) -> Result<()> {
    let mut issues = Vec::new();

    validate_endpoint(&config.endpoint, &mut issues);
    if config.max_concurrency == Some(0) {
        issues.push("max_concurrency must be at least 1 when set".to_string());
    }
    validate_presets(&config.presets, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "fetch config invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_endpoint(endpoint: &str, issues: &mut Vec<String>) {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        issues.push("endpoint must not be empty".to_string());
    } else if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
        issues.push(format!("endpoint `{endpoint}` must use http or https"));
    }
}

fn validate_presets(presets: &PresetConfig, issues: &mut Vec<String>) {
    validate_list("presets.major_symbols", &presets.major_symbols, issues);
    validate_list("presets.timeframes", &presets.timeframes, issues);

    if presets.snapshot_interval.trim().is_empty() {
        issues.push("presets.snapshot_interval must not be empty".to_string());
    }
    if presets.default_symbol.trim().is_empty() {
        issues.push("presets.default_symbol must not be empty".to_string());
    }

    validate_limit("presets.snapshot_limit", presets.snapshot_limit, issues);
    validate_limit("presets.timeframe_limit", presets.timeframe_limit, issues);
}

fn validate_list(label: &str, values: &[String], issues: &mut Vec<String>) {
    if values.is_empty() {
        issues.push(format!("{label} must contain at least one entry"));
        return;
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for value in values {
        if value.trim().is_empty() {
            issues.push(format!("{label} contains a blank entry"));
        } else if !seen.insert(value.as_str()) {
            duplicates.push(value.as_str());
        }
    }

    if !duplicates.is_empty() {
        issues.push(format!(
            "{label} contains duplicate entries: {}",
            duplicates.join(", ")
        ));
    }
}

fn validate_limit(label: &str, limit: u16, issues: &mut Vec<String>) {
    if limit == 0 || limit > MAX_KLINE_LIMIT {
        issues.push(format!(
            "{label} must be between 1 and {MAX_KLINE_LIMIT}, got {limit}"
        ));
    }
}
