use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::prediction::domain::{
    Category, College, CollegeId, CollegeType, ExamType, FeeRange, HistoricalCutoff,
};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid reference CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid reference data on row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

pub fn cutoffs_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<HistoricalCutoff>, ImportError> {
    let file = std::fs::File::open(path)?;
    cutoffs_from_reader(file)
}

/// Parse `college_id,exam,exam_year,category,round,opening_rank,closing_rank,state_quota` rows.
pub fn cutoffs_from_reader<R: Read>(reader: R) -> Result<Vec<HistoricalCutoff>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut cutoffs = Vec::new();

    for (index, record) in csv_reader.deserialize::<CutoffRow>().enumerate() {
        let row = record?;
        // Header is line 1, so data rows start at 2.
        cutoffs.push(row.into_cutoff(index + 2)?);
    }

    Ok(cutoffs)
}

pub fn colleges_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<College>, ImportError> {
    let file = std::fs::File::open(path)?;
    colleges_from_reader(file)
}

/// Parse college reference rows; `courses` is a `;`-separated list.
pub fn colleges_from_reader<R: Read>(reader: R) -> Result<Vec<College>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut colleges = Vec::new();

    for (index, record) in csv_reader.deserialize::<CollegeRow>().enumerate() {
        let row = record?;
        colleges.push(row.into_college(index + 2)?);
    }

    Ok(colleges)
}

#[derive(Debug, Deserialize)]
struct CutoffRow {
    college_id: String,
    exam: String,
    exam_year: u16,
    category: String,
    round: u8,
    opening_rank: u32,
    closing_rank: u32,
    #[serde(deserialize_with = "flexible_bool")]
    state_quota: bool,
}

impl CutoffRow {
    fn into_cutoff(self, row: usize) -> Result<HistoricalCutoff, ImportError> {
        let invalid = |reason: String| ImportError::InvalidRow { row, reason };

        if self.college_id.is_empty() {
            return Err(invalid("college_id is empty".to_string()));
        }
        let exam: ExamType = self.exam.parse().map_err(|err| invalid(format!("{err}")))?;
        let category: Category = self
            .category
            .parse()
            .map_err(|err| invalid(format!("{err}")))?;
        if self.closing_rank == 0 || self.opening_rank > self.closing_rank {
            return Err(invalid(format!(
                "opening rank {} must not exceed closing rank {}",
                self.opening_rank, self.closing_rank
            )));
        }

        Ok(HistoricalCutoff {
            college_id: CollegeId(self.college_id),
            exam,
            exam_year: self.exam_year,
            category,
            round_number: self.round,
            opening_rank: self.opening_rank,
            closing_rank: self.closing_rank,
            state_quota: self.state_quota,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CollegeRow {
    id: String,
    name: String,
    location: String,
    state: String,
    #[serde(rename = "type")]
    college_type: String,
    #[serde(default)]
    courses: String,
    fee_min: u32,
    fee_max: u32,
    safety_score: f64,
    placement_score: f64,
    #[serde(deserialize_with = "flexible_bool")]
    hostel_available: bool,
}

impl CollegeRow {
    fn into_college(self, row: usize) -> Result<College, ImportError> {
        let invalid = |reason: String| ImportError::InvalidRow { row, reason };

        if self.id.is_empty() {
            return Err(invalid("id is empty".to_string()));
        }
        let college_type: CollegeType = self.college_type.parse().map_err(invalid)?;
        if self.fee_min > self.fee_max {
            return Err(invalid(format!(
                "fee_min {} exceeds fee_max {}",
                self.fee_min, self.fee_max
            )));
        }
        for (field, value) in [
            ("safety_score", self.safety_score),
            ("placement_score", self.placement_score),
        ] {
            if !(0.0..=10.0).contains(&value) {
                return Err(invalid(format!("{field} {value} outside 0-10")));
            }
        }

        let courses = self
            .courses
            .split(';')
            .map(str::trim)
            .filter(|course| !course.is_empty())
            .map(str::to_string)
            .collect();

        Ok(College {
            id: CollegeId(self.id),
            name: self.name,
            location: self.location,
            state: self.state,
            college_type,
            courses,
            fee_range: FeeRange {
                min: self.fee_min,
                max: self.fee_max,
            },
            safety_score: self.safety_score,
            placement_score: self.placement_score,
            hostel_available: self.hostel_available,
        })
    }
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CUTOFFS: &str = "college_id,exam,exam_year,category,round,opening_rank,closing_rank,state_quota\n\
gmc-mumbai,NEET,2024,General,1,1200,4100,yes\n\
nit-trichy,JEE-MAIN,2024,OBC,2,800,2600,false\n";

    const COLLEGES: &str = "id,name,location,state,type,courses,fee_min,fee_max,safety_score,placement_score,hostel_available\n\
gmc-mumbai,Grant Medical College,Mumbai,Maharashtra,government,MBBS; BDS,90000,120000,7.5,8.0,true\n";

    #[test]
    fn parses_cutoff_rows() {
        let rows = cutoffs_from_reader(Cursor::new(CUTOFFS)).expect("parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].college_id, CollegeId("gmc-mumbai".to_string()));
        assert!(rows[0].state_quota);
        assert_eq!(rows[1].exam, ExamType::JeeMain);
        assert_eq!(rows[1].category, Category::Obc);
        assert_eq!(rows[1].round_number, 2);
    }

    #[test]
    fn rejects_inverted_rank_window_with_row_number() {
        let csv = "college_id,exam,exam_year,category,round,opening_rank,closing_rank,state_quota\n\
gmc-mumbai,NEET,2024,General,1,5000,4100,no\n";
        let error = cutoffs_from_reader(Cursor::new(csv)).expect_err("invalid window");
        match error {
            ImportError::InvalidRow { row, .. } => assert_eq!(row, 2),
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let csv = "college_id,exam,exam_year,category,round,opening_rank,closing_rank,state_quota\n\
gmc-mumbai,NEET,2024,NRI,1,100,4100,no\n";
        let error = cutoffs_from_reader(Cursor::new(csv)).expect_err("unknown category");
        assert!(error.to_string().contains("category"));
    }

    #[test]
    fn parses_college_rows_and_splits_courses() {
        let colleges = colleges_from_reader(Cursor::new(COLLEGES)).expect("parse");
        let college = &colleges[0];
        assert_eq!(college.college_type, CollegeType::Government);
        assert_eq!(college.courses, vec!["MBBS".to_string(), "BDS".to_string()]);
        assert_eq!(college.fee_range.max, 120_000);
        assert!(college.hostel_available);
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = cutoffs_from_path("./does-not-exist.csv").expect_err("expected io error");
        match error {
            ImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn errors_carry_row_context_and_underlying_source() {
        use std::error::Error as _;

        let row_error = ImportError::InvalidRow {
            row: 7,
            reason: "closing rank below opening rank".to_string(),
        };
        assert_eq!(
            row_error.to_string(),
            "invalid reference data on row 7: closing rank below opening rank"
        );
        assert!(row_error.source().is_none());

        let io_error = cutoffs_from_path("./does-not-exist.csv").expect_err("expected io error");
        assert!(io_error.to_string().starts_with("failed to read reference data: "));
        assert!(io_error.source().is_some());

        let malformed = "college_id,exam,exam_year,category,round,opening_rank,closing_rank,state_quota\n\
gmc-mumbai,NEET,not-a-year,General,1,100,4100,no\n";
        let csv_error = cutoffs_from_reader(Cursor::new(malformed)).expect_err("bad year");
        assert!(matches!(csv_error, ImportError::Csv(_)));
        assert!(csv_error.source().is_some());
    }
}
