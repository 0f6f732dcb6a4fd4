use serde::{Deserialize, Serialize};

use super::domain::{
    Category, ExamScore, ExamType, FinancialProfile, IncomeBand, NormalizedScore, Prediction,
    ScoreInput, ScoreType, ValidationError,
};

/// Wire shape submitted by the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub exam_type: String,
    pub score_type: String,
    pub score_value: f64,
    pub category: String,
    #[serde(default)]
    pub state: Option<String>,
    pub year: u16,
    #[serde(default)]
    pub income_band: Option<String>,
}

impl PredictionRequest {
    /// Validate the loosely typed payload into engine inputs.
    pub fn into_input(self) -> Result<(ScoreInput, FinancialProfile), ValidationError> {
        let exam: ExamType = self.exam_type.parse()?;
        let score_type: ScoreType = self.score_type.parse()?;
        let category: Category = self.category.parse()?;
        let income_band = self
            .income_band
            .as_deref()
            .filter(|band| !band.trim().is_empty())
            .map(str::parse::<IncomeBand>)
            .transpose()?;

        let score = ExamScore::new(exam, score_type, self.score_value)?;
        let input = ScoreInput::new(score, category, self.state, self.year)?;
        Ok((input, FinancialProfile { income_band }))
    }
}

/// Descriptive bucket counts over the returned predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl ConfidenceIntervals {
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let mut intervals = Self {
            total: predictions.len(),
            ..Self::default()
        };
        for prediction in predictions {
            let probability = prediction.admission_probability;
            if probability > 0.70 {
                intervals.high += 1;
            } else if probability > 0.40 {
                intervals.medium += 1;
            } else {
                intervals.low += 1;
            }
        }
        intervals
    }
}

/// Response returned to chat, table, and export renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub normalized_score: NormalizedScore,
    pub predictions: Vec<Prediction>,
    pub confidence_intervals: ConfidenceIntervals,
    /// False when the historical store failed or held no matching rows.
    pub data_available: bool,
    pub low_confidence: bool,
}
