//! Admission prediction pipeline: normalize a score, match it against
//! historical cutoffs, score each candidate, and assemble a ranked list.

pub mod assembler;
pub mod cache;
pub mod calibration;
pub mod config;
pub mod domain;
pub mod history;
pub mod normalizer;
pub mod probability;
pub mod report;
pub mod router;
pub mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use assembler::RecommendationAssembler;
pub use cache::{CacheKey, Clock, ResultCache, SystemClock};
pub use calibration::{CalibrationError, DifficultyAdjustment, ModelCalibration};
pub use config::{AssemblyLimits, EngineConfig};
pub use domain::{
    Category, College, CollegeId, CollegeType, ExamScore, ExamType, FeeRange, FinancialProfile,
    HistoricalCutoff, IncomeBand, NormalizedScore, Prediction, ScoreInput, ScoreType,
    ValidationError,
};
pub use history::{
    sample_stores, CollegeDirectory, CutoffQuery, HistoricalPatternStore, ImportError,
    InMemoryCollegeDirectory, InMemoryPatternStore, StoreError,
};
pub use normalizer::ScoreNormalizer;
pub use probability::{ProbabilityConfig, ProbabilityEstimate, ProbabilityModel, Quota};
pub use report::{ConfidenceIntervals, PredictionReport, PredictionRequest};
pub use router::prediction_router;
pub use scorer::{AffordabilityBands, CompositeScorer, ScoreBreakdown, ScoringWeights};
pub use service::{PredictionService, Recommendations};
