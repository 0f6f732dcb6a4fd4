use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Competitive exam a score was obtained in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExamType {
    #[serde(rename = "NEET")]
    Neet,
    #[serde(rename = "JEE-MAIN", alias = "JEE_MAIN")]
    JeeMain,
}

impl ExamType {
    pub fn label(&self) -> &'static str {
        match self {
            ExamType::Neet => "NEET",
            ExamType::JeeMain => "JEE-MAIN",
        }
    }

    /// Highest rank a candidate can hold, used to bound rank inputs.
    pub fn max_rank(&self) -> u32 {
        match self {
            ExamType::Neet => 2_500_000,
            ExamType::JeeMain => 1_500_000,
        }
    }

    pub fn max_marks(&self) -> f64 {
        match self {
            ExamType::Neet => 720.0,
            ExamType::JeeMain => 300.0,
        }
    }

    /// JEE Main uses negative marking, so a raw total can drop below zero.
    pub fn min_marks(&self) -> f64 {
        match self {
            ExamType::Neet => 0.0,
            ExamType::JeeMain => -75.0,
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExamType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "NEET" | "NEET-UG" => Ok(ExamType::Neet),
            "JEE-MAIN" | "JEE" | "JEE-MAINS" => Ok(ExamType::JeeMain),
            _ => Err(ValidationError::Unrecognized {
                field: "examType",
                value: value.to_string(),
            }),
        }
    }
}

/// Representation the student reported their score in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Marks,
    Percentile,
    Rank,
}

impl FromStr for ScoreType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "marks" | "score" => Ok(ScoreType::Marks),
            "percentile" => Ok(ScoreType::Percentile),
            "rank" => Ok(ScoreType::Rank),
            _ => Err(ValidationError::Unrecognized {
                field: "scoreType",
                value: value.to_string(),
            }),
        }
    }
}

/// Reservation classification used to pick the applicable cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    General,
    #[serde(rename = "OBC")]
    Obc,
    #[serde(rename = "SC")]
    Sc,
    #[serde(rename = "ST")]
    St,
    #[serde(rename = "EWS")]
    Ews,
    #[serde(rename = "PWD")]
    Pwd,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Obc => "OBC",
            Category::Sc => "SC",
            Category::St => "ST",
            Category::Ews => "EWS",
            Category::Pwd => "PWD",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GENERAL" | "GEN" | "UR" | "OPEN" => Ok(Category::General),
            "OBC" | "OBC-NCL" => Ok(Category::Obc),
            "SC" => Ok(Category::Sc),
            "ST" => Ok(Category::St),
            "EWS" => Ok(Category::Ews),
            "PWD" | "PH" => Ok(Category::Pwd),
            _ => Err(ValidationError::Unrecognized {
                field: "category",
                value: value.to_string(),
            }),
        }
    }
}

/// Institution classification; government seats carry a competition penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollegeType {
    Government,
    Private,
    Deemed,
    Nit,
    Iiit,
}

impl FromStr for CollegeType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "government" | "govt" => Ok(CollegeType::Government),
            "private" => Ok(CollegeType::Private),
            "deemed" => Ok(CollegeType::Deemed),
            "nit" => Ok(CollegeType::Nit),
            "iiit" => Ok(CollegeType::Iiit),
            other => Err(format!("unknown college type '{other}'")),
        }
    }
}

/// Identifier wrapper for colleges in the reference data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollegeId(pub String);

impl fmt::Display for CollegeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Annual tuition band in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRange {
    pub min: u32,
    pub max: u32,
}

/// Read-only college reference entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: CollegeId,
    pub name: String,
    pub location: String,
    pub state: String,
    #[serde(rename = "type")]
    pub college_type: CollegeType,
    pub courses: Vec<String>,
    pub fee_range: FeeRange,
    /// 0 to 10.
    pub safety_score: f64,
    /// 0 to 10.
    pub placement_score: f64,
    pub hostel_available: bool,
}

/// One historical closing/opening rank record for a college, category and round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalCutoff {
    pub college_id: CollegeId,
    pub exam: ExamType,
    pub exam_year: u16,
    pub category: Category,
    pub round_number: u8,
    pub opening_rank: u32,
    pub closing_rank: u32,
    pub state_quota: bool,
}

/// A score tagged with the exam and representation it belongs to.
///
/// Each variant carries only the numeric payload valid for its pair, so an
/// unsupported combination cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExamScore {
    NeetMarks(f64),
    NeetPercentile(f64),
    NeetRank(u32),
    JeeMarks(f64),
    JeePercentile(f64),
    JeeRank(u32),
}

impl ExamScore {
    pub fn new(exam: ExamType, score_type: ScoreType, value: f64) -> Result<Self, ValidationError> {
        let score = match (exam, score_type) {
            (ExamType::Neet, ScoreType::Marks) => ExamScore::NeetMarks(value),
            (ExamType::Neet, ScoreType::Percentile) => ExamScore::NeetPercentile(value),
            (ExamType::Neet, ScoreType::Rank) => ExamScore::NeetRank(whole_rank(exam, value)?),
            (ExamType::JeeMain, ScoreType::Marks) => ExamScore::JeeMarks(value),
            (ExamType::JeeMain, ScoreType::Percentile) => ExamScore::JeePercentile(value),
            (ExamType::JeeMain, ScoreType::Rank) => ExamScore::JeeRank(whole_rank(exam, value)?),
        };
        score.validate()?;
        Ok(score)
    }

    pub fn exam(&self) -> ExamType {
        match self {
            ExamScore::NeetMarks(_) | ExamScore::NeetPercentile(_) | ExamScore::NeetRank(_) => {
                ExamType::Neet
            }
            ExamScore::JeeMarks(_) | ExamScore::JeePercentile(_) | ExamScore::JeeRank(_) => {
                ExamType::JeeMain
            }
        }
    }

    pub fn score_type(&self) -> ScoreType {
        match self {
            ExamScore::NeetMarks(_) | ExamScore::JeeMarks(_) => ScoreType::Marks,
            ExamScore::NeetPercentile(_) | ExamScore::JeePercentile(_) => ScoreType::Percentile,
            ExamScore::NeetRank(_) | ExamScore::JeeRank(_) => ScoreType::Rank,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            ExamScore::NeetMarks(v)
            | ExamScore::NeetPercentile(v)
            | ExamScore::JeeMarks(v)
            | ExamScore::JeePercentile(v) => v,
            ExamScore::NeetRank(r) | ExamScore::JeeRank(r) => f64::from(r),
        }
    }

    /// Checks the payload against the valid domain for its exam and score type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let exam = self.exam();
        let (min, max) = match self.score_type() {
            ScoreType::Marks => (exam.min_marks(), exam.max_marks()),
            ScoreType::Percentile => (0.0, 100.0),
            ScoreType::Rank => (1.0, f64::from(exam.max_rank())),
        };
        let value = self.value();
        if !value.is_finite() || value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: "scoreValue",
                context: format!("{} {}", exam.label(), self.score_type().label()),
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

impl ScoreType {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreType::Marks => "marks",
            ScoreType::Percentile => "percentile",
            ScoreType::Rank => "rank",
        }
    }
}

/// Ranks must be whole and within the exam's candidate pool.
fn whole_rank(exam: ExamType, value: f64) -> Result<u32, ValidationError> {
    let max = exam.max_rank();
    if value.is_finite() && value.fract() != 0.0 {
        return Err(ValidationError::NotWholeNumber {
            field: "scoreValue",
            value,
        });
    }
    if value.is_finite() && value >= 1.0 && value <= f64::from(max) {
        Ok(value as u32)
    } else {
        Err(ValidationError::OutOfRange {
            field: "scoreValue",
            context: format!("{} {}", exam.label(), ScoreType::Rank.label()),
            value,
            min: 1.0,
            max: f64::from(max),
        })
    }
}

pub const MIN_COUNSELING_YEAR: u16 = 2015;
pub const MAX_COUNSELING_YEAR: u16 = 2100;

/// Validated student input for one prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreInput {
    pub score: ExamScore,
    pub category: Category,
    pub state: Option<String>,
    pub year: u16,
}

impl ScoreInput {
    pub fn new(
        score: ExamScore,
        category: Category,
        state: Option<String>,
        year: u16,
    ) -> Result<Self, ValidationError> {
        score.validate()?;
        if !(MIN_COUNSELING_YEAR..=MAX_COUNSELING_YEAR).contains(&year) {
            return Err(ValidationError::OutOfRange {
                field: "year",
                context: "counseling year".to_string(),
                value: f64::from(year),
                min: f64::from(MIN_COUNSELING_YEAR),
                max: f64::from(MAX_COUNSELING_YEAR),
            });
        }
        let state = state
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(Self {
            score,
            category,
            state,
            year,
        })
    }

    pub fn exam(&self) -> ExamType {
        self.score.exam()
    }
}

/// Normalized, rank-space view of a student's score. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedScore {
    pub exam: ExamType,
    pub original_score: f64,
    pub original_type: ScoreType,
    pub normalized_rank: u32,
    pub adjusted_rank: u32,
    pub difficulty_multiplier: f64,
    pub estimated_percentile: f64,
    pub confidence: f64,
}

pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

impl NormalizedScore {
    /// Indicative-only results; callers display the warning but never treat it as an error.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence <= LOW_CONFIDENCE_THRESHOLD
    }
}

/// Caller supplied income band used for financial feasibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeBand {
    Low,
    Middle,
    High,
}

impl FromStr for IncomeBand {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(IncomeBand::Low),
            "middle" | "medium" | "mid" => Ok(IncomeBand::Middle),
            "high" => Ok(IncomeBand::High),
            _ => Err(ValidationError::Unrecognized {
                field: "incomeBand",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub income_band: Option<IncomeBand>,
}

impl FinancialProfile {
    pub fn effective_band(&self) -> IncomeBand {
        self.income_band.unwrap_or(IncomeBand::Middle)
    }
}

/// Ranked admission estimate for one matching historical row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub college: College,
    pub exam_year: u16,
    pub admission_probability: f64,
    pub predicted_cutoff_rank: u32,
    pub rank_difference: i64,
    pub round: u8,
    pub state_quota: bool,
    pub overall_score: f64,
    pub financial_feasibility: f64,
    pub reasoning: String,
}

/// Input rejected before any computation; names the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} for {context} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        context: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a whole number for ranks, got {value}")]
    NotWholeNumber { field: &'static str, value: f64 },
    #[error("unrecognized {field} '{value}'")]
    Unrecognized { field: &'static str, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::NotWholeNumber { field, .. }
            | ValidationError::Unrecognized { field, .. } => field,
        }
    }
}
