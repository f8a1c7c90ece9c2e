use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Request};

use crate::config::FetchConfig;
use crate::error::{AppError, Context};

use super::kline::{KlineSeries, KlinesParams};
use super::FetchResult;

/// Capability to retrieve one kline series. The batch layer only sees this
/// trait, so tests can swap the network for an in-memory source.
#[async_trait]
pub trait KlineSource: Send + Sync {
    async fn fetch_klines(&self, params: &KlinesParams) -> FetchResult<KlineSeries>;
}

/// `KlineSource` backed by the exchange's REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpKlineClient {
    client: Client,
    endpoint: String,
    user_agent: Option<String>,
}

impl HttpKlineClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            user_agent: None,
        }
    }

    /// Use a preconfigured `reqwest` client, e.g. one with proxies disabled.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            user_agent: None,
        }
    }

    pub fn from_config(config: &FetchConfig) -> FetchResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .context("Failed to construct klines HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, params: &KlinesParams) -> FetchResult<Request> {
        let mut request = self.client.get(&self.endpoint).query(&params.query_pairs());
        if let Some(agent) = &self.user_agent {
            request = request.header(USER_AGENT, agent);
        }
        Ok(request.build()?)
    }
}

#[async_trait]
impl KlineSource for HttpKlineClient {
    async fn fetch_klines(&self, params: &KlinesParams) -> FetchResult<KlineSeries> {
        let request = self.build_request(params)?;
        debug!("GET {}", request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Status { status, body });
        }

        let body = response.text().await?;
        let series: KlineSeries = serde_json::from_str(&body).with_context(|| {
            format!(
                "Failed to decode klines for {} {}",
                params.symbol, params.interval
            )
        })?;
        Ok(series)
    }
}
