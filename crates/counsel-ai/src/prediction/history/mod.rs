//! Read-only access to historical cutoffs and college reference data.

mod import;
mod memory;
mod sample;

pub use import::{
    colleges_from_path, colleges_from_reader, cutoffs_from_path, cutoffs_from_reader, ImportError,
};
pub use memory::{InMemoryCollegeDirectory, InMemoryPatternStore};
pub use sample::{sample_stores, SAMPLE_COLLEGES_CSV, SAMPLE_CUTOFFS_CSV};

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};

use super::domain::{Category, College, CollegeId, ExamType, HistoricalCutoff};

/// Filter for a historical cutoff lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CutoffQuery {
    pub exam: ExamType,
    pub category: Category,
    pub years: RangeInclusive<u16>,
    /// Stores stop and return [`StoreError::DeadlineExceeded`] once this passes.
    pub deadline: Option<DateTime<Utc>>,
}

impl CutoffQuery {
    pub fn new(exam: ExamType, category: Category, years: RangeInclusive<u16>) -> Self {
        Self {
            exam,
            category,
            years,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn matches(&self, row: &HistoricalCutoff) -> bool {
        row.exam == self.exam
            && row.category == self.category
            && self.years.contains(&row.exam_year)
    }

    pub(crate) fn expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.map(|deadline| now > deadline).unwrap_or(false)
    }
}

/// Source of historical cutoffs. Results are ordered by closing rank ascending;
/// no matching rows is an empty vector, not an error.
pub trait HistoricalPatternStore: Send + Sync {
    fn query(&self, query: &CutoffQuery) -> Result<Vec<HistoricalCutoff>, StoreError>;
}

/// Source of college reference records.
pub trait CollegeDirectory: Send + Sync {
    fn college(&self, id: &CollegeId) -> Result<Option<College>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("historical data unavailable: {0}")]
    Unavailable(String),
    #[error("historical data query exceeded its deadline")]
    DeadlineExceeded,
}
