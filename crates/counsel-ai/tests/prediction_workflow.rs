//! End-to-end scenarios through the public prediction facade using the bundled reference data
//! and the default calibration.

use std::io::Cursor;
use std::sync::Arc;

use counsel_ai::config::PredictionSettings;
use counsel_ai::prediction::history::{colleges_from_reader, cutoffs_from_reader, ImportError};
use counsel_ai::prediction::{
    sample_stores, InMemoryCollegeDirectory, InMemoryPatternStore, PredictionRequest,
    PredictionService,
};

type Service = PredictionService<InMemoryPatternStore, InMemoryCollegeDirectory>;

fn service() -> Service {
    let (store, colleges) = sample_stores().expect("bundled data parses");
    PredictionService::new(
        Arc::new(store),
        Arc::new(colleges),
        &PredictionSettings::default(),
    )
}

fn neet_request(state: Option<&str>, income_band: Option<&str>) -> PredictionRequest {
    PredictionRequest {
        exam_type: "NEET".to_string(),
        score_type: "marks".to_string(),
        score_value: 650.0,
        category: "General".to_string(),
        state: state.map(str::to_string),
        year: 2025,
        income_band: income_band.map(str::to_string),
    }
}

#[test]
fn home_state_student_sees_state_quota_seats_first() {
    let report = service()
        .predict(neet_request(Some("Maharashtra"), None))
        .expect("valid request");

    assert_eq!(report.normalized_score.normalized_rank, 196_000);
    assert_eq!(report.normalized_score.adjusted_rank, 196_000);
    assert!(report.data_available);
    assert!(!report.low_confidence);

    let ids: Vec<&str> = report
        .predictions
        .iter()
        .map(|prediction| prediction.college.id.0.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "gmc-mumbai",
            "bjmc-pune",
            "kmc-manipal",
            "kmc-manipal",
            "dypmc-pune"
        ]
    );
    assert!(report.predictions[0].state_quota);
    assert_eq!(report.predictions[2].exam_year, 2024);
    assert_eq!(report.predictions[3].exam_year, 2023);
    assert_eq!(report.confidence_intervals.high, 5);
    assert_eq!(report.confidence_intervals.total, 5);
}

#[test]
fn out_of_state_student_only_sees_open_seats() {
    let report = service()
        .predict(neet_request(Some("Karnataka"), None))
        .expect("valid request");

    assert_eq!(report.predictions.len(), 3);
    assert!(report
        .predictions
        .iter()
        .all(|prediction| !prediction.state_quota));
}

#[test]
fn higher_income_band_improves_private_college_scores() {
    let service = service();
    let middle = service
        .predict(neet_request(Some("Karnataka"), None))
        .expect("valid request");
    let high = service
        .predict(neet_request(Some("Karnataka"), Some("high")))
        .expect("valid request");

    let kmc = |report: &counsel_ai::prediction::PredictionReport| {
        report
            .predictions
            .iter()
            .find(|prediction| prediction.college.id.0 == "kmc-manipal")
            .map(|prediction| (prediction.financial_feasibility, prediction.overall_score))
            .expect("kmc present")
    };
    let (middle_feasibility, middle_score) = kmc(&middle);
    let (high_feasibility, high_score) = kmc(&high);

    assert!((middle_feasibility - 0.2).abs() < 1e-9);
    assert!((high_feasibility - 0.7).abs() < 1e-9);
    assert!(high_score > middle_score);
}

#[test]
fn jee_percentile_prediction_uses_engineering_rows_only() {
    let report = service()
        .predict(PredictionRequest {
            exam_type: "JEE-MAIN".to_string(),
            score_type: "percentile".to_string(),
            score_value: 99.0,
            category: "General".to_string(),
            state: Some("Maharashtra".to_string()),
            year: 2025,
            income_band: None,
        })
        .expect("valid request");

    assert_eq!(report.normalized_score.adjusted_rank, 12_000);
    assert!(!report.predictions.is_empty());
    assert!(report
        .predictions
        .iter()
        .all(|prediction| prediction.college.courses.iter().any(|c| c.starts_with("B.Tech"))));
    // Tamil Nadu state quota and an out-of-reach open seat at the same NIT.
    assert!(report
        .predictions
        .iter()
        .all(|prediction| prediction.college.id.0 != "nit-trichy"));
}

#[test]
fn invalid_requests_fail_fast() {
    let mut request = neet_request(None, None);
    request.score_type = "rank".to_string();
    request.score_value = 1200.5;

    let error = service().predict(request).expect_err("fractional rank");
    assert_eq!(error.field(), "scoreValue");
}

#[test]
fn malformed_reference_rows_name_the_line() {
    let csv = "college_id,exam,exam_year,category,round,opening_rank,closing_rank,state_quota\n\
gmc-mumbai,NEET,2024,General,1,2000,45000,false\n\
bjmc-pune,NEET,2024,General,1,90000,80000,false\n";

    let error = cutoffs_from_reader(Cursor::new(csv)).expect_err("opening above closing");
    match error {
        ImportError::InvalidRow { row, .. } => assert_eq!(row, 3),
        other => panic!("expected invalid row, got {other:?}"),
    }

    let colleges = "id,name,location,state,type,courses,fee_min,fee_max,safety_score,placement_score,hostel_available\n\
x,X College,Pune,Maharashtra,university,MBBS,1,2,5,5,true\n";
    assert!(colleges_from_reader(Cursor::new(colleges)).is_err());
}
