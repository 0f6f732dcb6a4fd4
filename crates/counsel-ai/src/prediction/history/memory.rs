use std::collections::HashMap;

use chrono::Utc;

use super::{CollegeDirectory, CutoffQuery, HistoricalPatternStore, StoreError};
use crate::prediction::domain::{College, CollegeId, HistoricalCutoff};

/// Cutoff store backed by an immutable, pre-sorted vector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPatternStore {
    rows: Vec<HistoricalCutoff>,
}

impl InMemoryPatternStore {
    pub fn new(mut rows: Vec<HistoricalCutoff>) -> Self {
        rows.sort_by(|a, b| {
            a.closing_rank
                .cmp(&b.closing_rank)
                .then_with(|| a.college_id.cmp(&b.college_id))
                .then_with(|| b.exam_year.cmp(&a.exam_year))
                .then_with(|| a.round_number.cmp(&b.round_number))
        });
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl HistoricalPatternStore for InMemoryPatternStore {
    fn query(&self, query: &CutoffQuery) -> Result<Vec<HistoricalCutoff>, StoreError> {
        if query.expired(Utc::now()) {
            return Err(StoreError::DeadlineExceeded);
        }

        Ok(self
            .rows
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCollegeDirectory {
    colleges: HashMap<CollegeId, College>,
}

impl InMemoryCollegeDirectory {
    pub fn new(colleges: impl IntoIterator<Item = College>) -> Self {
        Self {
            colleges: colleges
                .into_iter()
                .map(|college| (college.id.clone(), college))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colleges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colleges.is_empty()
    }
}

impl CollegeDirectory for InMemoryCollegeDirectory {
    fn college(&self, id: &CollegeId) -> Result<Option<College>, StoreError> {
        Ok(self.colleges.get(id).cloned())
    }
}
