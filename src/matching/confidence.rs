use serde::{Deserialize, Serialize};

use super::model::ConfidenceTier;
use crate::errors::ConfigError;

/// Numeric scores per tier and the threshold for pre-checking a proposal.
///
/// Nothing is persisted on the strength of [`ConfidencePolicy::should_auto_match`];
/// it only tells the confirmation screen which proposals to pre-select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub auto_match_threshold: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            high: 0.9,
            medium: 0.7,
            low: 0.5,
            auto_match_threshold: 0.7,
        }
    }
}

impl ConfidencePolicy {
    pub fn score(&self, tier: ConfidenceTier) -> f64 {
        match tier {
            ConfidenceTier::High => self.high,
            ConfidenceTier::Medium => self.medium,
            ConfidenceTier::Low => self.low,
            ConfidenceTier::None => 0.0,
        }
    }

    /// An unmatched transaction is never auto-matched, whatever the threshold.
    pub fn should_auto_match(&self, tier: ConfidenceTier) -> bool {
        tier != ConfidenceTier::None && self.score(tier) >= self.auto_match_threshold
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("high", self.high),
            ("medium", self.medium),
            ("low", self.low),
            ("auto_match_threshold", self.auto_match_threshold),
        ];
        if let Some((name, value)) = values
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Err(ConfigError::Invalid(format!(
                "confidence.{name} must be within [0, 1], got {value}"
            )));
        }
        if !(self.high >= self.medium && self.medium >= self.low) {
            return Err(ConfigError::Invalid(
                "confidence scores must satisfy high >= medium >= low".to_string(),
            ));
        }
        Ok(())
    }
}
