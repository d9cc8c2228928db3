use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rank tiers in ascending order of required points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Rank {
    #[default]
    Newbie,
    Explorer,
    Trader,
    Investor,
    Whale,
    Legend,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Newbie,
        Rank::Explorer,
        Rank::Trader,
        Rank::Investor,
        Rank::Whale,
        Rank::Legend,
    ];

    /// Minimum total points for this tier.
    pub fn threshold(&self) -> f64 {
        match self {
            Rank::Newbie => 0.0,
            Rank::Explorer => 4_500.0,
            Rank::Trader => 22_500.0,
            Rank::Investor => 90_000.0,
            Rank::Whale => 225_000.0,
            Rank::Legend => 450_000.0,
        }
    }

    pub fn from_points(points: f64) -> Self {
        Rank::ALL
            .iter()
            .rev()
            .find(|rank| rank.threshold() <= points)
            .copied()
            .unwrap_or(Rank::Newbie)
    }

    pub fn next(&self) -> Option<Rank> {
        match self {
            Rank::Newbie => Some(Rank::Explorer),
            Rank::Explorer => Some(Rank::Trader),
            Rank::Trader => Some(Rank::Investor),
            Rank::Investor => Some(Rank::Whale),
            Rank::Whale => Some(Rank::Legend),
            Rank::Legend => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Newbie => "Newbie",
            Rank::Explorer => "Explorer",
            Rank::Trader => "Trader",
            Rank::Investor => "Investor",
            Rank::Whale => "Whale",
            Rank::Legend => "Legend",
        }
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Rank::ALL
            .iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown rank: {}", s))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ActivityStats {
    /// Raw transaction count, duplicates included.
    pub transactions: u64,
    /// Distinct token contracts.
    pub tokens: u64,
    /// Distinct (contract, token id) pairs.
    pub nfts: u64,
    /// Distinct transaction destinations.
    pub contracts: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub transaction_points: f64,
    pub token_points: f64,
    pub nft_points: f64,
    pub unique_contract_points: f64,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> f64 {
        self.transaction_points + self.token_points + self.nft_points + self.unique_contract_points
    }
}

/// Outcome of one ranking pass. The default value is the zero-activity
/// Newbie result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RankingResult {
    pub total_points: f64,
    pub rank: Rank,
    pub percentile: f64,
    pub breakdown: ScoreBreakdown,
    pub stats: ActivityStats,
}

impl RankingResult {
    /// Points still missing to reach the next tier, `None` at the top tier.
    pub fn points_to_next_rank(&self) -> Option<f64> {
        self.rank
            .next()
            .map(|next| round2((next.threshold() - self.total_points).max(0.0)))
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_from_points_boundaries() {
        assert_eq!(Rank::from_points(0.0), Rank::Newbie);
        assert_eq!(Rank::from_points(4_499.99), Rank::Newbie);
        assert_eq!(Rank::from_points(4_500.0), Rank::Explorer);
        assert_eq!(Rank::from_points(22_500.0), Rank::Trader);
        assert_eq!(Rank::from_points(89_999.0), Rank::Trader);
        assert_eq!(Rank::from_points(225_000.0), Rank::Whale);
        assert_eq!(Rank::from_points(1_000_000.0), Rank::Legend);
    }

    #[test]
    fn test_thresholds_strictly_increase() {
        for pair in Rank::ALL.windows(2) {
            assert!(pair[0].threshold() < pair[1].threshold());
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(Rank::Legend.next(), None);
    }

    #[test]
    fn test_rank_parsing() {
        assert_eq!("whale".parse::<Rank>(), Ok(Rank::Whale));
        assert_eq!("Legend".parse::<Rank>(), Ok(Rank::Legend));
        assert!("admiral".parse::<Rank>().is_err());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(RankingResult::default()).unwrap();
        assert_eq!(json["totalPoints"], 0.0);
        assert_eq!(json["rank"], "Newbie");
        assert_eq!(json["breakdown"]["uniqueContractPoints"], 0.0);
        assert_eq!(json["stats"]["nfts"], 0);
    }

    #[test]
    fn test_points_to_next_rank() {
        let result = RankingResult {
            total_points: 4_000.0,
            ..Default::default()
        };
        assert_eq!(result.points_to_next_rank(), Some(500.0));

        let legend = RankingResult {
            total_points: 500_000.0,
            rank: Rank::Legend,
            percentile: 100.0,
            ..Default::default()
        };
        assert_eq!(legend.points_to_next_rank(), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(99.994), 99.99);
    }
}
