use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// How a transaction's wei `value` is compared against the high-value
/// threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueComparison {
    /// Exact 256-bit integer comparison.
    #[default]
    Exact,
    /// Parse as a float first, like explorer front-ends usually do.
    /// Loses precision above 2^53 wei.
    Approximate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    pub base_transaction_points: f64,
    pub success_multiplier: f64,
    pub high_value_multiplier: f64,
    /// Decimal wei string; transactions strictly above it earn the bonus.
    pub high_value_threshold_wei: String,
    pub token_points: f64,
    pub nft_points: f64,
    pub unique_contract_points: f64,
    pub value_comparison: ValueComparison,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base_transaction_points: 10.0,
            success_multiplier: 1.5,
            high_value_multiplier: 2.0,
            high_value_threshold_wei: "1000000000000000000".to_string(), // 1 native unit
            token_points: 50.0,
            nft_points: 100.0,
            unique_contract_points: 25.0,
            value_comparison: ValueComparison::Exact,
        }
    }
}

impl ScoringWeights {
    pub fn high_value_threshold(&self) -> Result<U256, String> {
        U256::from_dec_str(self.high_value_threshold_wei.trim()).map_err(|e| {
            format!(
                "Invalid high value threshold {:?}: {}",
                self.high_value_threshold_wei, e
            )
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        let points = [
            self.base_transaction_points,
            self.token_points,
            self.nft_points,
            self.unique_contract_points,
        ];
        if points.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err("All point weights must be finite and non-negative".to_string());
        }

        // Below 1.0 a bonus would turn into a penalty and adding activity
        // could lower the total.
        if !(self.success_multiplier >= 1.0 && self.success_multiplier.is_finite())
            || !(self.high_value_multiplier >= 1.0 && self.high_value_multiplier.is_finite())
        {
            return Err("Multipliers must be finite and at least 1.0".to_string());
        }

        self.high_value_threshold()?;
        Ok(())
    }
}
