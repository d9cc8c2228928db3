use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    chains::{client::ActivitySource, resilience::ResilientClient},
    config::ExplorerConfig,
    models::{RankError, Result},
};

/// Account list endpoints of an Etherscan-compatible API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerAction {
    Transactions,
    TokenTransfers,
    NftTransfers,
}

impl ExplorerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorerAction::Transactions => "txlist",
            ExplorerAction::TokenTransfers => "tokentx",
            ExplorerAction::NftTransfers => "tokennfttx",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

impl ExplorerResponse {
    /// `status: "0"` with a list result just means "nothing found". With a
    /// string result it is an API error (bad key, rate limit, ...).
    pub fn into_result(self, action: ExplorerAction) -> Result<Value> {
        if self.status == "0" && !self.result.is_array() {
            let detail = match &self.result {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(RankError::Explorer {
                action: action.as_str().to_string(),
                message: format!("{}: {}", self.message, detail),
            });
        }
        Ok(self.result)
    }
}

pub struct ExplorerClient {
    http: reqwest::Client,
    config: ExplorerConfig,
    resilience: ResilientClient,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        config.validate().map_err(RankError::ConfigError)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let resilience = ResilientClient::new(
            "explorer".to_string(),
            config.circuit_config(),
            config.retry_config(),
        );

        Ok(Self {
            http,
            config,
            resilience,
        })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn query_params(&self, action: ExplorerAction, address: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", action.as_str().to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", "99999999".to_string()),
            ("page", "1".to_string()),
            ("offset", self.config.page_size.to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }

    async fn fetch_once(&self, action: ExplorerAction, address: &str) -> Result<Value> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&self.query_params(action, address))
            .send()
            .await?
            .error_for_status()?;

        let body: ExplorerResponse = response.json().await?;
        let result = body.into_result(action)?;

        debug!(
            "Explorer {} for {} returned {} records",
            action.as_str(),
            address,
            result.as_array().map(|a| a.len()).unwrap_or(0)
        );
        Ok(result)
    }

    pub async fn fetch(&self, action: ExplorerAction, address: &str) -> Result<Value> {
        self.resilience
            .call(action.as_str(), || self.fetch_once(action, address))
            .await
    }
}

#[async_trait]
impl ActivitySource for ExplorerClient {
    fn name(&self) -> String {
        self.config.base_url.clone()
    }

    async fn transactions(&self, address: &str) -> Result<Value> {
        self.fetch(ExplorerAction::Transactions, address).await
    }

    async fn token_transfers(&self, address: &str) -> Result<Value> {
        self.fetch(ExplorerAction::TokenTransfers, address).await
    }

    async fn nft_transfers(&self, address: &str) -> Result<Value> {
        self.fetch(ExplorerAction::NftTransfers, address).await
    }
}
