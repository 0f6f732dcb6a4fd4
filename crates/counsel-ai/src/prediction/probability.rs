use serde::{Deserialize, Serialize};

use super::domain::CollegeType;

/// Base probability for rank differences strictly below `below`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBand {
    pub below: i64,
    pub probability: f64,
}

/// Piecewise admission model. An auditable approximation, not a fitted model:
/// changing any value here is a model change and must be versioned as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityConfig {
    /// Ascending by `below`.
    pub bands: Vec<ProbabilityBand>,
    /// Applies once the rank difference clears every band.
    pub tail_probability: f64,
    pub state_quota_multiplier: f64,
    pub state_quota_cap: f64,
    pub government_multiplier: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for ProbabilityConfig {
    fn default() -> Self {
        let band = |below, probability| ProbabilityBand { below, probability };
        Self {
            bands: vec![
                band(-100, 0.95),
                band(-50, 0.85),
                band(0, 0.70),
                band(50, 0.50),
                band(100, 0.30),
                band(200, 0.15),
            ],
            tail_probability: 0.05,
            state_quota_multiplier: 1.2,
            state_quota_cap: 0.95,
            government_multiplier: 0.9,
            floor: 0.05,
            ceiling: 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quota {
    pub state_quota: bool,
}

/// Every intermediate of one probability computation, kept for reasoning strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityEstimate {
    pub rank_difference: i64,
    pub base_probability: f64,
    pub state_quota_applied: bool,
    pub government_applied: bool,
    pub probability: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ProbabilityModel {
    config: ProbabilityConfig,
}

impl ProbabilityModel {
    pub fn new(config: ProbabilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbabilityConfig {
        &self.config
    }

    pub fn score_probability(
        &self,
        student_rank: u32,
        historical_closing_rank: u32,
        quota: Quota,
        college_type: CollegeType,
    ) -> f64 {
        self.estimate(student_rank, historical_closing_rank, quota, college_type)
            .probability
    }

    pub fn estimate(
        &self,
        student_rank: u32,
        historical_closing_rank: u32,
        quota: Quota,
        college_type: CollegeType,
    ) -> ProbabilityEstimate {
        let rank_difference = i64::from(student_rank) - i64::from(historical_closing_rank);
        let base_probability = self.base_probability(rank_difference);

        let mut probability = base_probability;
        if quota.state_quota {
            probability = (probability * self.config.state_quota_multiplier)
                .min(self.config.state_quota_cap);
        }
        let government_applied = college_type == CollegeType::Government;
        if government_applied {
            probability *= self.config.government_multiplier;
        }

        ProbabilityEstimate {
            rank_difference,
            base_probability,
            state_quota_applied: quota.state_quota,
            government_applied,
            probability: probability.clamp(self.config.floor, self.config.ceiling),
        }
    }

    fn base_probability(&self, rank_difference: i64) -> f64 {
        self.config
            .bands
            .iter()
            .find(|band| rank_difference < band.below)
            .map(|band| band.probability)
            .unwrap_or(self.config.tail_probability)
    }
}
