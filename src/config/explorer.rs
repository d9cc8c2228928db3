use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chains::resilience::{CircuitBreakerConfig, RetryConfig};

/// Etherscan-compatible block explorer endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Records requested per list (`offset` query parameter).
    pub page_size: u32,
    pub failure_threshold: u32,
    pub circuit_reset_seconds: u64,
    /// JSON-RPC endpoint used to resolve ENS names on the command line.
    pub ens_rpc_url: Option<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.basescan.org/api".to_string(),
            api_key: None,
            timeout_seconds: 30,
            max_retries: 3,
            retry_base_delay_ms: 250,
            page_size: 10_000,
            failure_threshold: 5,
            circuit_reset_seconds: 60,
            ens_rpc_url: Some("https://ethereum.publicnode.com".to_string()),
        }
    }
}

impl ExplorerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries.max(1),
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            ..Default::default()
        }
    }

    pub fn circuit_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold.max(1),
            timeout_duration: Duration::from_secs(self.circuit_reset_seconds),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("Explorer base URL must be http(s): {}", self.base_url));
        }
        if self.page_size == 0 {
            return Err("Explorer page size must be positive".to_string());
        }
        Ok(())
    }
}
