use super::calibration::{CalibrationError, ModelCalibration};
use super::domain::{ExamScore, NormalizedScore, ScoreInput, ValidationError};

/// Converts marks, percentiles, or ranks into a comparable rank space.
#[derive(Debug, Clone)]
pub struct ScoreNormalizer {
    calibration: ModelCalibration,
}

impl Default for ScoreNormalizer {
    fn default() -> Self {
        Self {
            calibration: ModelCalibration::v2025(),
        }
    }
}

impl ScoreNormalizer {
    /// Rejects calibrations whose constants could produce a non-positive rank.
    pub fn new(calibration: ModelCalibration) -> Result<Self, CalibrationError> {
        calibration.validate()?;
        Ok(Self { calibration })
    }

    pub fn calibration(&self) -> &ModelCalibration {
        &self.calibration
    }

    pub fn normalize(&self, input: &ScoreInput) -> Result<NormalizedScore, ValidationError> {
        input.score.validate()?;

        let exam = input.exam();
        let pool = f64::from(self.calibration.pool_size(exam));
        let c = &self.calibration;

        let (rank, percentile, confidence) = match input.score {
            ExamScore::NeetMarks(marks) => {
                let rank = rank_from_steps(720.0 - marks, c.k_neet);
                (rank, percentile_from_rank(rank, pool), c.base_confidence)
            }
            // No official NEET percentile-to-rank table exists; derive it from the pool.
            ExamScore::NeetPercentile(percentile) => {
                let rank = rank_from_steps((100.0 - percentile) / 100.0, pool);
                (rank, percentile, c.unofficial_confidence)
            }
            ExamScore::JeePercentile(percentile) => {
                let rank = rank_from_steps(100.0 - percentile, c.k_jee);
                (rank, percentile, c.base_confidence)
            }
            ExamScore::JeeMarks(marks) => {
                let rank = rank_from_steps(300.0 - marks, c.k_jee_marks);
                (
                    rank,
                    percentile_from_rank(rank, pool),
                    c.unofficial_confidence,
                )
            }
            ExamScore::NeetRank(rank) | ExamScore::JeeRank(rank) => {
                (rank, percentile_from_rank(rank, pool), c.base_confidence)
            }
        };

        let multiplier = c.difficulty_for(exam, input.year);
        let adjusted_rank = to_rank(f64::from(rank) * multiplier);

        Ok(NormalizedScore {
            exam,
            original_score: input.score.value(),
            original_type: input.score.score_type(),
            normalized_rank: rank,
            adjusted_rank,
            difficulty_multiplier: multiplier,
            estimated_percentile: percentile,
            confidence,
        })
    }
}

fn rank_from_steps(distance: f64, scale: f64) -> u32 {
    to_rank(distance * scale)
}

/// Ranks are at least 1; a NaN collapses to the floor instead of casting to 0.
fn to_rank(raw: f64) -> u32 {
    if raw.is_nan() {
        return 1;
    }
    raw.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

fn percentile_from_rank(rank: u32, pool: f64) -> f64 {
    if pool <= 0.0 {
        return 0.0;
    }
    ((1.0 - f64::from(rank) / pool) * 100.0).clamp(0.0, 100.0)
}
