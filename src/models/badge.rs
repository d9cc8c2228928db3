use serde::Serialize;

use crate::models::{ActivityStats, RankingResult};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BadgeFamily {
    Transactions,
    Tokens,
    Nfts,
    Contracts,
}

impl BadgeFamily {
    pub const ALL: [BadgeFamily; 4] = [
        BadgeFamily::Transactions,
        BadgeFamily::Tokens,
        BadgeFamily::Nfts,
        BadgeFamily::Contracts,
    ];

    /// The stat this family is judged on.
    pub fn metric(&self, stats: &ActivityStats) -> u64 {
        match self {
            BadgeFamily::Transactions => stats.transactions,
            BadgeFamily::Tokens => stats.tokens,
            BadgeFamily::Nfts => stats.nfts,
            BadgeFamily::Contracts => stats.contracts,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeFamily::Transactions => "transactions",
            BadgeFamily::Tokens => "tokens",
            BadgeFamily::Nfts => "nfts",
            BadgeFamily::Contracts => "contracts",
        }
    }
}

/// Static achievement descriptor. Badges carry no state of their own.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// Intensity level, 1 through 6.
    pub level: u8,
    pub family: BadgeFamily,
    pub threshold: u64,
}

impl Badge {
    pub fn is_earned(&self, result: &RankingResult) -> bool {
        self.family.metric(&result.stats) >= self.threshold
    }

    /// How many more units of the family metric are needed, zero once earned.
    pub fn remaining(&self, result: &RankingResult) -> u64 {
        self.threshold
            .saturating_sub(self.family.metric(&result.stats))
    }
}
