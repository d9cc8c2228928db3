pub mod explorer;
pub mod settings;

pub use explorer::ExplorerConfig;
pub use settings::*;
pub use crate::scoring::{ScoringWeights, ValueComparison};
