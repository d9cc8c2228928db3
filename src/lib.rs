pub mod chains;
pub mod config;
pub mod models;
pub mod scoring;
pub mod store;
pub mod utils;

pub use config::Settings;
pub use models::{
    ActivityStats, Badge, BadgeFamily, NftTransfer, Rank, RankError, RankingResult, Result,
    ScoreBreakdown, TokenTransfer, Transaction, WalletReport,
};
pub use scoring::{calculate_ranking, evaluate_badges, rank_from_json, RankingEngine, RankingService};
