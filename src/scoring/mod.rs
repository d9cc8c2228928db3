pub mod algorithm;
pub mod badges;
pub mod service;
pub mod weights;

pub use algorithm::{calculate_ranking, progress, rank_from_json, RankingEngine};
pub use badges::{evaluate_badges, BadgeEvaluator, BADGES};
pub use service::{normalize_address, RankingService};
pub use weights::{ScoringWeights, ValueComparison};
