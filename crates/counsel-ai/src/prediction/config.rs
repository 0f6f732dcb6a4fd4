use serde::{Deserialize, Serialize};

use super::calibration::ModelCalibration;
use super::probability::ProbabilityConfig;
use super::scorer::{AffordabilityBands, ScoringWeights};

/// Result trimming applied by the recommendation assembler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssemblyLimits {
    /// Predictions at or below this probability are dropped as noise.
    pub min_probability: f64,
    pub internal_limit: usize,
    pub display_limit: usize,
}

impl Default for AssemblyLimits {
    fn default() -> Self {
        Self {
            min_probability: 0.10,
            internal_limit: 50,
            display_limit: 10,
        }
    }
}

/// All model constants in one serializable place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub calibration: ModelCalibration,
    pub probability: ProbabilityConfig,
    pub weights: ScoringWeights,
    pub affordability: AffordabilityBands,
    pub limits: AssemblyLimits,
}
