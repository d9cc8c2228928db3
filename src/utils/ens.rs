use ethers::prelude::*;
use tracing::info;

use crate::models::{RankError, Result};

pub fn is_ens_name(input: &str) -> bool {
    input.trim().to_lowercase().ends_with(".eth")
}

/// Resolve an ENS name to an Ethereum address
pub async fn resolve_ens_name(provider: &Provider<Http>, ens_name: &str) -> Result<String> {
    // Check if it's already an address
    if ens_name.starts_with("0x") && ens_name.len() == 42 {
        return Ok(ens_name.to_string());
    }

    if !is_ens_name(ens_name) {
        return Err(RankError::InvalidAddress(format!("Invalid ENS name: {}", ens_name)));
    }

    match provider.resolve_name(ens_name).await {
        Ok(address) => Ok(format!("{:?}", address)),
        Err(e) => Err(RankError::InvalidAddress(format!(
            "Failed to resolve ENS name {}: {}",
            ens_name, e
        ))),
    }
}

/// Turns user input into an address, resolving `.eth` names through
/// `rpc_url` when one is configured.
pub async fn resolve_wallet(input: &str, rpc_url: Option<&str>) -> Result<String> {
    let input = input.trim();
    if !is_ens_name(input) {
        return Ok(input.to_string());
    }

    let rpc_url = rpc_url.ok_or_else(|| {
        RankError::ConfigError(format!("Cannot resolve {} without an ENS RPC endpoint", input))
    })?;
    let provider = Provider::<Http>::try_from(rpc_url)
        .map_err(|e| RankError::ConfigError(format!("Invalid ENS RPC URL: {}", e)))?;

    let resolved = resolve_ens_name(&provider, input).await?;
    info!("Resolved {} to {}", input, resolved);
    Ok(resolved)
}
