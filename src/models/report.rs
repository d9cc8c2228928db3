use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActivityStats, Badge, Rank, RankingResult};

/// Everything the service knows about one wallet after a ranking pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletReport {
    pub address: String,
    pub ranking: RankingResult,
    pub badges: Vec<Badge>,
    pub calculated_at: DateTime<Utc>,
}

/// The slice of a report that gets written back to the score store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredScore {
    pub address: String,
    pub total_points: f64,
    pub rank: Rank,
    pub stats: ActivityStats,
    pub updated_at: DateTime<Utc>,
}

impl From<&WalletReport> for StoredScore {
    fn from(report: &WalletReport) -> Self {
        Self {
            address: report.address.clone(),
            total_points: report.ranking.total_points,
            rank: report.ranking.rank,
            stats: report.ranking.stats,
            updated_at: report.calculated_at,
        }
    }
}
