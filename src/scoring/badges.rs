use crate::models::{Badge, BadgeFamily, RankingResult};

const fn badge(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    level: u8,
    family: BadgeFamily,
    threshold: u64,
) -> Badge {
    Badge {
        id,
        title,
        description,
        icon,
        level,
        family,
        threshold,
    }
}

/// Every badge, grouped by family in ascending threshold order.
pub static BADGES: [Badge; 24] = [
    // Transactions
    badge("tx_starter", "First Steps", "Sent 40 transactions", "zap", 1, BadgeFamily::Transactions, 40),
    badge("tx_regular", "Regular", "Sent 200 transactions", "activity", 2, BadgeFamily::Transactions, 200),
    badge("tx_active", "Active Trader", "Sent 400 transactions", "trending-up", 3, BadgeFamily::Transactions, 400),
    badge("tx_power", "Power User", "Sent 1,000 transactions", "flame", 4, BadgeFamily::Transactions, 1_000),
    badge("tx_machine", "Transaction Machine", "Sent 2,500 transactions", "cpu", 5, BadgeFamily::Transactions, 2_500),
    badge("tx_master", "Transaction Master", "Sent 5,000 transactions", "crown", 6, BadgeFamily::Transactions, 5_000),
    // Tokens
    badge("token_collector", "Token Collector", "Held 5 different tokens", "coins", 1, BadgeFamily::Tokens, 5),
    badge("token_explorer", "Token Explorer", "Held 25 different tokens", "compass", 2, BadgeFamily::Tokens, 25),
    badge("token_diversifier", "Diversifier", "Held 50 different tokens", "pie-chart", 3, BadgeFamily::Tokens, 50),
    badge("token_hunter", "Token Hunter", "Held 100 different tokens", "target", 4, BadgeFamily::Tokens, 100),
    badge("token_hoarder", "Token Hoarder", "Held 250 different tokens", "vault", 5, BadgeFamily::Tokens, 250),
    badge("token_master", "Token Master", "Held 500 different tokens", "gem", 6, BadgeFamily::Tokens, 500),
    // NFTs
    badge("nft_first", "First Mint", "Owned your first NFT", "image", 1, BadgeFamily::Nfts, 1),
    badge("nft_enthusiast", "NFT Enthusiast", "Owned 10 NFTs", "images", 2, BadgeFamily::Nfts, 10),
    badge("nft_curator", "Curator", "Owned 25 NFTs", "frame", 3, BadgeFamily::Nfts, 25),
    badge("nft_collector", "Collector", "Owned 50 NFTs", "gallery", 4, BadgeFamily::Nfts, 50),
    badge("nft_connoisseur", "Connoisseur", "Owned 100 NFTs", "palette", 5, BadgeFamily::Nfts, 100),
    badge("nft_master", "NFT Master", "Owned 250 NFTs", "trophy", 6, BadgeFamily::Nfts, 250),
    // Contracts
    badge("contract_curious", "Curious", "Interacted with 10 contracts", "search", 1, BadgeFamily::Contracts, 10),
    badge("contract_builder", "Builder", "Interacted with 50 contracts", "hammer", 2, BadgeFamily::Contracts, 50),
    badge("contract_navigator", "Navigator", "Interacted with 100 contracts", "map", 3, BadgeFamily::Contracts, 100),
    badge("contract_architect", "Architect", "Interacted with 250 contracts", "layers", 4, BadgeFamily::Contracts, 250),
    badge("contract_pioneer", "Pioneer", "Interacted with 500 contracts", "rocket", 5, BadgeFamily::Contracts, 500),
    badge("contract_master", "Contract Master", "Interacted with 1,000 contracts", "shield", 6, BadgeFamily::Contracts, 1_000),
];

/// Evaluates a badge table against ranking results.
#[derive(Debug, Clone, Copy)]
pub struct BadgeEvaluator {
    table: &'static [Badge],
}

impl Default for BadgeEvaluator {
    fn default() -> Self {
        Self { table: &BADGES }
    }
}

impl BadgeEvaluator {
    pub fn new(table: &'static [Badge]) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static [Badge] {
        self.table
    }

    /// Earned badges, in table order.
    pub fn evaluate(&self, result: &RankingResult) -> Vec<Badge> {
        self.table
            .iter()
            .filter(|badge| badge.is_earned(result))
            .copied()
            .collect()
    }

    pub fn family(&self, family: BadgeFamily) -> impl Iterator<Item = &'static Badge> {
        let table = self.table;
        table.iter().filter(move |badge| badge.family == family)
    }

    /// Highest earned level in a family.
    pub fn highest(&self, family: BadgeFamily, result: &RankingResult) -> Option<Badge> {
        self.family(family)
            .filter(|badge| badge.is_earned(result))
            .max_by_key(|badge| badge.level)
            .copied()
    }

    /// Next locked badge in a family and how far the wallet is from it.
    pub fn next(&self, family: BadgeFamily, result: &RankingResult) -> Option<(Badge, u64)> {
        self.family(family)
            .filter(|badge| !badge.is_earned(result))
            .min_by_key(|badge| badge.threshold)
            .map(|badge| (*badge, badge.remaining(result)))
    }
}

/// Earned badges from the built-in table.
pub fn evaluate_badges(result: &RankingResult) -> Vec<Badge> {
    BadgeEvaluator::default().evaluate(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityStats;
    use std::collections::HashSet;

    fn result_with(stats: ActivityStats) -> RankingResult {
        RankingResult {
            stats,
            ..Default::default()
        }
    }

    #[test]
    fn test_table_shape() {
        let ids: HashSet<_> = BADGES.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BADGES.len());

        for family in BadgeFamily::ALL {
            let badges: Vec<_> = BadgeEvaluator::default().family(family).collect();
            assert_eq!(badges.len(), 6);
            for (i, pair) in badges.windows(2).enumerate() {
                assert!(pair[0].threshold < pair[1].threshold);
                assert_eq!(pair[0].level as usize, i + 1);
            }
            assert_eq!(badges[5].level, 6);
        }
    }

    #[test]
    fn test_no_activity_no_badges() {
        assert!(evaluate_badges(&RankingResult::default()).is_empty());
    }

    #[test]
    fn test_transaction_thresholds() {
        let thresholds: Vec<u64> = BadgeEvaluator::default()
            .family(BadgeFamily::Transactions)
            .map(|b| b.threshold)
            .collect();
        assert_eq!(thresholds, vec![40, 200, 400, 1_000, 2_500, 5_000]);
    }

    #[test]
    fn test_all_transaction_badges_at_5000() {
        let result = result_with(ActivityStats {
            transactions: 5_000,
            ..Default::default()
        });
        let earned = evaluate_badges(&result);

        assert_eq!(earned.len(), 6);
        assert!(earned.iter().all(|b| b.family == BadgeFamily::Transactions));
    }

    #[test]
    fn test_higher_badge_implies_lower() {
        let evaluator = BadgeEvaluator::default();
        let result = result_with(ActivityStats {
            transactions: 450,
            tokens: 30,
            nfts: 1,
            contracts: 9,
        });
        let earned = evaluator.evaluate(&result);

        for family in BadgeFamily::ALL {
            let levels: Vec<u8> = earned
                .iter()
                .filter(|b| b.family == family)
                .map(|b| b.level)
                .collect();
            let expected: Vec<u8> = (1..=levels.len() as u8).collect();
            assert_eq!(levels, expected);
        }

        assert_eq!(evaluator.highest(BadgeFamily::Transactions, &result).map(|b| b.level), Some(3));
        assert_eq!(evaluator.highest(BadgeFamily::Tokens, &result).map(|b| b.id), Some("token_explorer"));
        assert_eq!(evaluator.highest(BadgeFamily::Contracts, &result), None);
    }

    #[test]
    fn test_badges_can_be_unearned() {
        let evaluator = BadgeEvaluator::default();
        let before = result_with(ActivityStats { nfts: 12, ..Default::default() });
        let after = result_with(ActivityStats { nfts: 3, ..Default::default() });

        assert_eq!(evaluator.evaluate(&before).len(), 2);
        assert_eq!(evaluator.evaluate(&after).len(), 1);
    }

    #[test]
    fn test_next_badge() {
        let evaluator = BadgeEvaluator::default();
        let result = result_with(ActivityStats {
            contracts: 42,
            ..Default::default()
        });

        let (badge, remaining) = evaluator.next(BadgeFamily::Contracts, &result).unwrap();
        assert_eq!(badge.id, "contract_builder");
        assert_eq!(remaining, 8);

        let maxed = result_with(ActivityStats {
            contracts: 1_000,
            ..Default::default()
        });
        assert!(evaluator.next(BadgeFamily::Contracts, &maxed).is_none());
    }
}
