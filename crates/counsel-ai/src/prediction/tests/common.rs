use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::PredictionSettings;
use crate::prediction::cache::Clock;
use crate::prediction::calibration::ModelCalibration;
use crate::prediction::config::EngineConfig;
use crate::prediction::domain::{
    Category, College, CollegeId, CollegeType, ExamScore, ExamType, FeeRange, HistoricalCutoff,
    ScoreInput,
};
use crate::prediction::history::{
    CutoffQuery, HistoricalPatternStore, InMemoryCollegeDirectory, InMemoryPatternStore,
    StoreError,
};
use crate::prediction::service::PredictionService;

/// Small-pool constants so fixture ranks stay readable: NEET 650 marks is rank 700.
pub(super) fn calibration() -> ModelCalibration {
    ModelCalibration {
        version: "test".to_string(),
        k_neet: 10.0,
        pool_neet: 10_000,
        k_jee: 100.0,
        pool_jee: 10_000,
        k_jee_marks: 20.0,
        base_confidence: 0.8,
        unofficial_confidence: 0.6,
        difficulty: Vec::new(),
    }
}

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig {
        calibration: calibration(),
        ..EngineConfig::default()
    }
}

pub(super) fn settings() -> PredictionSettings {
    PredictionSettings {
        cache_ttl: Duration::minutes(5),
        lookback_years: 3,
        store_timeout: Duration::seconds(30),
        cutoffs_csv: None,
        colleges_csv: None,
    }
}

pub(super) fn college(id: &str, college_type: CollegeType) -> College {
    College {
        id: CollegeId(id.to_string()),
        name: format!("College {id}"),
        location: "Mumbai".to_string(),
        state: "Maharashtra".to_string(),
        college_type,
        courses: vec!["MBBS".to_string()],
        fee_range: FeeRange {
            min: 80_000,
            max: 120_000,
        },
        safety_score: 7.0,
        placement_score: 7.0,
        hostel_available: true,
    }
}

pub(super) fn cutoff(id: &str, exam: ExamType, closing_rank: u32) -> HistoricalCutoff {
    HistoricalCutoff {
        college_id: CollegeId(id.to_string()),
        exam,
        exam_year: 2024,
        category: Category::General,
        round_number: 1,
        opening_rank: closing_rank / 4,
        closing_rank,
        state_quota: false,
    }
}

pub(super) fn neet_input(marks: f64) -> ScoreInput {
    ScoreInput::new(
        ExamScore::NeetMarks(marks),
        Category::General,
        Some("Maharashtra".to_string()),
        2025,
    )
    .expect("valid input")
}

pub(super) fn jee_input(percentile: f64) -> ScoreInput {
    ScoreInput::new(
        ExamScore::JeePercentile(percentile),
        Category::General,
        Some("Maharashtra".to_string()),
        2025,
    )
    .expect("valid input")
}

pub(super) type TestService = PredictionService<CountingStore, InMemoryCollegeDirectory>;

pub(super) fn build_service(
    rows: Vec<HistoricalCutoff>,
    colleges: Vec<College>,
) -> (TestService, Arc<CountingStore>, Arc<ManualClock>) {
    let store = Arc::new(CountingStore::new(rows));
    let clock = Arc::new(ManualClock::default());
    let service = PredictionService::with_config(
        Arc::clone(&store),
        Arc::new(InMemoryCollegeDirectory::new(colleges)),
        engine_config(),
        &settings(),
        clock.clone(),
    )
    .expect("valid engine config");
    (service, store, clock)
}

#[derive(Debug)]
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap()),
        }
    }
}

impl ManualClock {
    pub(super) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// In-memory store that records how often it was queried.
pub(super) struct CountingStore {
    inner: InMemoryPatternStore,
    queries: AtomicUsize,
}

impl CountingStore {
    pub(super) fn new(rows: Vec<HistoricalCutoff>) -> Self {
        Self {
            inner: InMemoryPatternStore::new(rows),
            queries: AtomicUsize::new(0),
        }
    }

    pub(super) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl HistoricalPatternStore for CountingStore {
    fn query(&self, query: &CutoffQuery) -> Result<Vec<HistoricalCutoff>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(query)
    }
}

pub(super) struct UnavailableStore {
    pub(super) queries: AtomicUsize,
}

impl HistoricalPatternStore for UnavailableStore {
    fn query(&self, _query: &CutoffQuery) -> Result<Vec<HistoricalCutoff>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("replica offline".to_string()))
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
