use async_trait::async_trait;
use serde_json::Value;

use crate::models::Result;

/// Where a wallet's raw activity lists come from.
///
/// Each call returns the untyped list payload for one address; decoding (and
/// defaulting of anything that is not a list) happens in the ranking engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> String;

    /// Normal transactions sent or received by the address.
    async fn transactions(&self, address: &str) -> Result<Value>;

    /// ERC-20 transfer events involving the address.
    async fn token_transfers(&self, address: &str) -> Result<Value>;

    /// ERC-721 transfer events involving the address.
    async fn nft_transfers(&self, address: &str) -> Result<Value>;
}
