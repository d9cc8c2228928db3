use chrono::Utc;
use ethers::types::Address;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    chains::ActivitySource,
    models::{RankError, RankingCache, RawActivity, Result, StoredScore, WalletReport},
    scoring::{BadgeEvaluator, RankingEngine},
    store::ScoreStore,
};

/// Fetches a wallet's activity, ranks it, and optionally records the score.
pub struct RankingService {
    source: Arc<dyn ActivitySource>,
    engine: RankingEngine,
    badges: BadgeEvaluator,
    cache: RankingCache,
    store: Option<Arc<dyn ScoreStore>>,
}

impl RankingService {
    pub fn new(source: Arc<dyn ActivitySource>, engine: RankingEngine, cache: RankingCache) -> Self {
        Self {
            source,
            engine,
            badges: BadgeEvaluator::default(),
            cache,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ScoreStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_badges(mut self, badges: BadgeEvaluator) -> Self {
        self.badges = badges;
        self
    }

    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }

    /// Ranks a wallet, serving a fresh cached report when there is one.
    pub async fn rank_wallet(&self, address: &str) -> Result<WalletReport> {
        let address = normalize_address(address)?;

        if let Some(report) = self.cache.get(&address) {
            info!("Serving cached ranking for {}", address);
            return Ok(report);
        }

        self.compute(&address).await
    }

    /// Re-ranks every address, ignoring the cache. One failure does not stop
    /// the batch.
    pub async fn refresh_all(&self, addresses: &[String]) -> Vec<(String, Result<WalletReport>)> {
        info!("Refreshing rankings for {} wallets", addresses.len());

        let mut results = Vec::with_capacity(addresses.len());
        for address in addresses {
            let result = match normalize_address(address) {
                Ok(normalized) => self.compute(&normalized).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!("Failed to refresh {}: {}", address, e);
            }
            results.push((address.clone(), result));
        }

        results
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>> {
        let store = self.store.as_ref().ok_or(RankError::StoreUnavailable)?;
        store.leaderboard(limit).await
    }

    async fn compute(&self, address: &str) -> Result<WalletReport> {
        let raw = self.fetch_activity(address).await;
        let ranking = self.engine.calculate_raw(&raw);
        let badges = self.badges.evaluate(&ranking);

        info!(
            "Ranked {}: {} points, {} ({} badges)",
            address,
            ranking.total_points,
            ranking.rank,
            badges.len()
        );

        let report = WalletReport {
            address: address.to_string(),
            ranking,
            badges,
            calculated_at: Utc::now(),
        };

        if let Some(store) = &self.store {
            store.save(&StoredScore::from(&report)).await?;
        }

        self.cache.insert(report.clone());
        Ok(report)
    }

    /// Fetches the three lists concurrently. A failed fetch contributes an
    /// empty list rather than failing the ranking.
    async fn fetch_activity(&self, address: &str) -> RawActivity {
        let source = self.source.name();
        let (transactions, token_transfers, nft_transfers) = futures::join!(
            self.source.transactions(address),
            self.source.token_transfers(address),
            self.source.nft_transfers(address),
        );

        RawActivity::new(
            or_empty(transactions, "transactions", &source, address),
            or_empty(token_transfers, "token transfers", &source, address),
            or_empty(nft_transfers, "nft transfers", &source, address),
        )
    }
}

fn or_empty(result: Result<Value>, list: &str, source: &str, address: &str) -> Value {
    result.unwrap_or_else(|e| {
        warn!("Failed to fetch {} for {} from {}: {}", list, address, source, e);
        Value::Array(Vec::new())
    })
}

/// Validates a hex EVM address and returns it lower-cased.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) || trimmed.len() != 42 {
        return Err(RankError::InvalidAddress(address.to_string()));
    }

    Address::from_str(&trimmed[2..])
        .map(|parsed| format!("{:?}", parsed))
        .map_err(|_| RankError::InvalidAddress(address.to_string()))
}
