use ethers::types::U256;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::{
    models::{
        round2, ActivityStats, NftTransfer, Rank, RankError, RankingError, RankingResult,
        RawActivity, Result, ScoreBreakdown, TokenTransfer, Transaction,
    },
    scoring::weights::{ScoringWeights, ValueComparison},
};

/// Upper bound for progress toward the next tier; only the top tier reports 100.
pub const MAX_PROGRESS: f64 = 99.99;

/// Scores a wallet's activity and places it in a rank tier.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    weights: ScoringWeights,
    high_value_threshold: U256,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            high_value_threshold: U256::exp10(18),
        }
    }
}

impl RankingEngine {
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        weights.validate().map_err(RankError::ConfigError)?;
        let high_value_threshold = weights
            .high_value_threshold()
            .map_err(RankError::ConfigError)?;

        Ok(Self {
            weights,
            high_value_threshold,
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Ranks typed activity. Never fails; an internal failure yields the
    /// default Newbie result.
    pub fn calculate(
        &self,
        transactions: &[Transaction],
        token_transfers: &[TokenTransfer],
        nft_transfers: &[NftTransfer],
    ) -> RankingResult {
        self.try_calculate(transactions, token_transfers, nft_transfers)
            .unwrap_or_else(|e| {
                warn!("Ranking failed, falling back to default result: {}", e);
                RankingResult::default()
            })
    }

    /// Ranks untyped explorer payloads. Non-array payloads count as empty;
    /// a malformed record yields the default result.
    pub fn calculate_raw(&self, raw: &RawActivity) -> RankingResult {
        match raw.decode() {
            Ok(activity) => self.calculate(
                &activity.transactions,
                &activity.token_transfers,
                &activity.nft_transfers,
            ),
            Err(e) => {
                warn!("Ranking failed, falling back to default result: {}", e);
                RankingResult::default()
            }
        }
    }

    pub fn try_calculate(
        &self,
        transactions: &[Transaction],
        token_transfers: &[TokenTransfer],
        nft_transfers: &[NftTransfer],
    ) -> std::result::Result<RankingResult, RankingError> {
        let stats = ActivityStats {
            transactions: transactions.len() as u64,
            tokens: count_unique(token_transfers.iter().filter_map(TokenTransfer::token_key)),
            nfts: count_unique(nft_transfers.iter().filter_map(NftTransfer::nft_key)),
            contracts: count_unique(transactions.iter().filter_map(Transaction::destination)),
        };

        let breakdown = ScoreBreakdown {
            transaction_points: round2(self.transaction_points(transactions)),
            token_points: round2(stats.tokens as f64 * self.weights.token_points),
            nft_points: round2(stats.nfts as f64 * self.weights.nft_points),
            unique_contract_points: round2(
                stats.contracts as f64 * self.weights.unique_contract_points,
            ),
        };

        let total_points = round2(breakdown.sum());
        if !total_points.is_finite() {
            return Err(RankingError::NonFinite);
        }

        let (rank, percentile) = progress(total_points);
        debug!(
            "Ranked activity: {} points, {} ({}%)",
            total_points, rank, percentile
        );

        Ok(RankingResult {
            total_points,
            rank,
            percentile,
            breakdown,
            stats,
        })
    }

    fn transaction_points(&self, transactions: &[Transaction]) -> f64 {
        let base = self.weights.base_transaction_points;
        let successful = transactions.iter().filter(|tx| tx.is_successful()).count();
        let high_value = transactions
            .iter()
            .filter(|tx| self.is_high_value(tx.value.as_deref()))
            .count();

        transactions.len() as f64 * base
            + successful as f64 * base * (self.weights.success_multiplier - 1.0)
            + high_value as f64 * base * (self.weights.high_value_multiplier - 1.0)
    }

    /// Whether a wei amount is strictly above the high-value threshold.
    /// Missing, negative or unparseable amounts never are.
    pub fn is_high_value(&self, value: Option<&str>) -> bool {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return false;
        };

        match self.weights.value_comparison {
            ValueComparison::Exact => {
                if !value.bytes().all(|b| b.is_ascii_digit()) {
                    return false;
                }
                // All digits, so the only possible parse failure is overflow.
                match U256::from_dec_str(value) {
                    Ok(wei) => wei > self.high_value_threshold,
                    Err(_) => true,
                }
            }
            ValueComparison::Approximate => {
                let threshold = self.high_value_threshold.to_string().parse::<f64>();
                match (value.parse::<f64>(), threshold) {
                    (Ok(wei), Ok(threshold)) if wei.is_finite() => wei > threshold,
                    _ => false,
                }
            }
        }
    }
}

/// Rank tier and progress toward the next tier for a point total.
pub fn progress(total_points: f64) -> (Rank, f64) {
    let rank = Rank::from_points(total_points);

    let percentile = match rank.next() {
        Some(next) => {
            let current = rank.threshold();
            let span = next.threshold() - current;
            let raw = (total_points - current) / span * 100.0;
            round2(raw.clamp(0.0, MAX_PROGRESS))
        }
        None => 100.0,
    };

    (rank, percentile)
}

/// Ranks typed activity with the default weights.
pub fn calculate_ranking(
    transactions: &[Transaction],
    token_transfers: &[TokenTransfer],
    nft_transfers: &[NftTransfer],
) -> RankingResult {
    RankingEngine::default().calculate(transactions, token_transfers, nft_transfers)
}

/// Ranks untyped explorer payloads (bare arrays or `{"result": [...]}`
/// envelopes) with the default weights.
pub fn rank_from_json(transactions: &Value, token_transfers: &Value, nft_transfers: &Value) -> RankingResult {
    let raw = RawActivity::new(
        transactions.clone(),
        token_transfers.clone(),
        nft_transfers.clone(),
    );
    RankingEngine::default().calculate_raw(&raw)
}

fn count_unique<I: Iterator<Item = String>>(keys: I) -> u64 {
    keys.collect::<HashSet<_>>().len() as u64
}
