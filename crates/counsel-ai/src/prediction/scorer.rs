use serde::{Deserialize, Serialize};

use super::domain::{College, FinancialProfile, IncomeBand};

/// Linear weights of the composite score; they sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub admission: f64,
    pub safety: f64,
    pub placement: f64,
    pub financial: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            admission: 0.40,
            safety: 0.25,
            placement: 0.20,
            financial: 0.15,
        }
    }
}

/// Annual fee (INR) each income band is assumed to afford comfortably.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityBands {
    pub low: u32,
    pub middle: u32,
    pub high: u32,
}

impl Default for AffordabilityBands {
    fn default() -> Self {
        Self {
            low: 150_000,
            middle: 500_000,
            high: 1_500_000,
        }
    }
}

impl AffordabilityBands {
    pub fn threshold(&self, band: IncomeBand) -> u32 {
        match band {
            IncomeBand::Low => self.low,
            IncomeBand::Middle => self.middle,
            IncomeBand::High => self.high,
        }
    }
}

/// Each weighted term of an overall score, reproducible from its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub admission: f64,
    pub safety: f64,
    pub placement: f64,
    pub financial: f64,
    pub financial_feasibility: f64,
    pub annual_fee: u32,
    pub fee_threshold: u32,
    pub overall: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    weights: ScoringWeights,
    bands: AffordabilityBands,
}

impl CompositeScorer {
    pub fn new(weights: ScoringWeights, bands: AffordabilityBands) -> Self {
        Self { weights, bands }
    }

    pub fn score(
        &self,
        admission_probability: f64,
        college: &College,
        profile: &FinancialProfile,
    ) -> ScoreBreakdown {
        // Upper end of the fee band.
        let annual_fee = college.fee_range.max;
        let fee_threshold = self.bands.threshold(profile.effective_band());
        let financial_feasibility = financial_feasibility(annual_fee, fee_threshold);

        let admission = self.weights.admission * admission_probability;
        let safety = self.weights.safety * (college.safety_score / 10.0);
        let placement = self.weights.placement * (college.placement_score / 10.0);
        let financial = self.weights.financial * financial_feasibility;

        ScoreBreakdown {
            admission,
            safety,
            placement,
            financial,
            financial_feasibility,
            annual_fee,
            fee_threshold,
            overall: (admission + safety + placement + financial).clamp(0.0, 1.0),
        }
    }
}

pub fn financial_feasibility(annual_fee: u32, threshold: u32) -> f64 {
    let fee = f64::from(annual_fee);
    let threshold = f64::from(threshold);
    if fee <= threshold {
        1.0
    } else if fee <= threshold * 1.5 {
        0.7
    } else if fee <= threshold * 2.0 {
        0.4
    } else {
        0.2
    }
}
