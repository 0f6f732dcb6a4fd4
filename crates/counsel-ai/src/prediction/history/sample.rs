//! Small bundled reference dataset for demos and local runs.

use std::io::Cursor;

use super::import::{colleges_from_reader, cutoffs_from_reader, ImportError};
use super::memory::{InMemoryCollegeDirectory, InMemoryPatternStore};

pub const SAMPLE_CUTOFFS_CSV: &str = include_str!("../../../data/cutoffs.csv");
pub const SAMPLE_COLLEGES_CSV: &str = include_str!("../../../data/colleges.csv");

/// Load the bundled cutoffs and colleges into in-memory stores.
pub fn sample_stores() -> Result<(InMemoryPatternStore, InMemoryCollegeDirectory), ImportError> {
    let cutoffs = cutoffs_from_reader(Cursor::new(SAMPLE_CUTOFFS_CSV))?;
    let colleges = colleges_from_reader(Cursor::new(SAMPLE_COLLEGES_CSV))?;
    Ok((
        InMemoryPatternStore::new(cutoffs),
        InMemoryCollegeDirectory::new(colleges),
    ))
}
