use counsel_ai::prediction::history::{
    colleges_from_path, colleges_from_reader, cutoffs_from_path, cutoffs_from_reader,
    SAMPLE_COLLEGES_CSV, SAMPLE_CUTOFFS_CSV,
};
use counsel_ai::prediction::{ImportError, InMemoryCollegeDirectory, InMemoryPatternStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataSource {
    Bundled,
    File,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Bundled => f.write_str("bundled sample"),
            DataSource::File => f.write_str("csv file"),
        }
    }
}

pub(crate) struct ReferenceData {
    pub(crate) store: InMemoryPatternStore,
    pub(crate) colleges: InMemoryCollegeDirectory,
    pub(crate) cutoffs_source: DataSource,
    pub(crate) colleges_source: DataSource,
}

/// Load cutoffs and colleges from CSV paths, falling back to the bundled sample for each.
pub(crate) fn load_reference_data(
    cutoffs: Option<&Path>,
    colleges: Option<&Path>,
) -> Result<ReferenceData, ImportError> {
    let (rows, cutoffs_source) = match cutoffs {
        Some(path) => (cutoffs_from_path(path)?, DataSource::File),
        None => (
            cutoffs_from_reader(Cursor::new(SAMPLE_CUTOFFS_CSV))?,
            DataSource::Bundled,
        ),
    };
    let (entries, colleges_source) = match colleges {
        Some(path) => (colleges_from_path(path)?, DataSource::File),
        None => (
            colleges_from_reader(Cursor::new(SAMPLE_COLLEGES_CSV))?,
            DataSource::Bundled,
        ),
    };

    Ok(ReferenceData {
        store: InMemoryPatternStore::new(rows),
        colleges: InMemoryCollegeDirectory::new(entries),
        cutoffs_source,
        colleges_source,
    })
}
