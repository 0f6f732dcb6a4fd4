use serde::{Deserialize, Serialize};

use super::domain::ExamType;

/// Year-specific correction applied to a normalized rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustment {
    pub exam: ExamType,
    pub year: u16,
    pub multiplier: f64,
}

/// Versioned constants behind score-to-rank conversion.
///
/// The linear scale factors are heuristics, not a fitted calibration. A
/// changed value gets a new `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCalibration {
    pub version: String,
    /// Ranks per NEET mark below 720.
    pub k_neet: f64,
    pub pool_neet: u32,
    /// Ranks per JEE Main percentile point below 100.
    pub k_jee: f64,
    pub pool_jee: u32,
    /// Ranks per raw JEE Main mark below 300; unofficial conversion.
    pub k_jee_marks: f64,
    pub base_confidence: f64,
    pub unofficial_confidence: f64,
    pub difficulty: Vec<DifficultyAdjustment>,
}

impl ModelCalibration {
    pub fn v2025() -> Self {
        Self {
            version: "2025.1".into(),
            k_neet: 2_800.0,
            pool_neet: 2_000_000,
            k_jee: 12_000.0,
            pool_jee: 1_200_000,
            k_jee_marks: 4_000.0,
            base_confidence: 0.8,
            unofficial_confidence: 0.6,
            difficulty: vec![
                DifficultyAdjustment {
                    exam: ExamType::Neet,
                    year: 2024,
                    multiplier: 1.10,
                },
                DifficultyAdjustment {
                    exam: ExamType::JeeMain,
                    year: 2024,
                    multiplier: 1.05,
                },
            ],
        }
    }

    pub fn pool_size(&self, exam: ExamType) -> u32 {
        match exam {
            ExamType::Neet => self.pool_neet,
            ExamType::JeeMain => self.pool_jee,
        }
    }

    /// Multiplier for the exam sitting, 1.0 when the year has no entry.
    pub fn difficulty_for(&self, exam: ExamType, year: u16) -> f64 {
        self.difficulty
            .iter()
            .find(|entry| entry.exam == exam && entry.year == year)
            .map(|entry| entry.multiplier)
            .unwrap_or(1.0)
    }

    /// Replace (or add) the multiplier for one exam/year.
    pub fn with_difficulty(
        mut self,
        exam: ExamType,
        year: u16,
        multiplier: f64,
    ) -> Result<Self, CalibrationError> {
        check_multiplier(exam, year, multiplier)?;
        self.difficulty
            .retain(|entry| !(entry.exam == exam && entry.year == year));
        self.difficulty.push(DifficultyAdjustment {
            exam,
            year,
            multiplier,
        });
        Ok(self)
    }

    /// Scale factors and pools must be positive and finite, confidences within
    /// `[0, 1]`, and every difficulty multiplier positive and finite.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (name, value) in [
            ("k_neet", self.k_neet),
            ("k_jee", self.k_jee),
            ("k_jee_marks", self.k_jee_marks),
            ("pool_neet", f64::from(self.pool_neet)),
            ("pool_jee", f64::from(self.pool_jee)),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalibrationError::InvalidConstant { name, value });
            }
        }
        for (name, value) in [
            ("base_confidence", self.base_confidence),
            ("unofficial_confidence", self.unofficial_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CalibrationError::InvalidConstant { name, value });
            }
        }
        for entry in &self.difficulty {
            check_multiplier(entry.exam, entry.year, entry.multiplier)?;
        }
        Ok(())
    }
}

fn check_multiplier(exam: ExamType, year: u16, multiplier: f64) -> Result<(), CalibrationError> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(())
    } else {
        Err(CalibrationError::InvalidMultiplier {
            exam,
            year,
            multiplier,
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("difficulty multiplier for {exam} {year} must be positive and finite, got {multiplier}")]
    InvalidMultiplier {
        exam: ExamType,
        year: u16,
        multiplier: f64,
    },
    #[error("calibration constant {name} is out of range: {value}")]
    InvalidConstant { name: &'static str, value: f64 },
}

impl Default for ModelCalibration {
    fn default() -> Self {
        Self::v2025()
    }
}
