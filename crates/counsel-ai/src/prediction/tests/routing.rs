use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tower::ServiceExt;

use crate::prediction::domain::{CollegeType, ExamType};
use crate::prediction::history::InMemoryCollegeDirectory;
use crate::prediction::report::PredictionRequest;
use crate::prediction::{prediction_router, PredictionService};

fn neet_request() -> PredictionRequest {
    PredictionRequest {
        exam_type: "NEET".to_string(),
        score_type: "marks".to_string(),
        score_value: 650.0,
        category: "General".to_string(),
        state: Some("Maharashtra".to_string()),
        year: 2025,
        income_band: Some("middle".to_string()),
    }
}

fn seeded_service() -> Arc<TestService> {
    let (service, _, _) = build_service(
        vec![cutoff("gmc-mumbai", ExamType::Neet, 800)],
        vec![college("gmc-mumbai", CollegeType::Government)],
    );
    Arc::new(service)
}

fn post_json(body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post("/api/v1/predictions")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize"),
        ))
        .expect("request")
}

#[tokio::test]
async fn predict_route_returns_camel_case_report() {
    let router = prediction_router(seeded_service());

    let response = router
        .oneshot(post_json(json!({
            "examType": "NEET",
            "scoreType": "marks",
            "scoreValue": 650,
            "category": "General",
            "state": "Maharashtra",
            "year": 2025
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["normalizedScore"]["normalizedRank"], 700);
    assert_eq!(payload["dataAvailable"], true);
    assert_eq!(payload["lowConfidence"], false);
    assert_eq!(payload["confidenceIntervals"]["total"], 1);

    let prediction = &payload["predictions"][0];
    assert_eq!(prediction["college"]["id"], "gmc-mumbai");
    assert_eq!(prediction["college"]["type"], "government");
    assert_eq!(prediction["predictedCutoffRank"], 800);
    assert!(prediction["reasoning"]
        .as_str()
        .is_some_and(|text| text.contains("ranks ahead of")));
}

#[tokio::test]
async fn predict_route_accepts_underscore_exam_alias() {
    let router = prediction_router(seeded_service());

    let response = router
        .oneshot(post_json(json!({
            "examType": "JEE_MAIN",
            "scoreType": "percentile",
            "scoreValue": 99.5,
            "category": "OBC",
            "year": 2025,
            "incomeBand": "low"
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["normalizedScore"]["exam"], "JEE-MAIN");
    assert_eq!(payload["dataAvailable"], false);
}

#[tokio::test]
async fn predict_route_rejects_out_of_range_scores() {
    let router = prediction_router(seeded_service());

    let response = router
        .oneshot(post_json(json!({
            "examType": "NEET",
            "scoreType": "marks",
            "scoreValue": 800,
            "category": "General",
            "year": 2025
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "scoreValue");
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("720")));
}

#[tokio::test]
async fn predict_handler_reports_unrecognized_fields() {
    let mut request = neet_request();
    request.income_band = Some("billionaire".to_string());

    let response = crate::prediction::router::predict_handler::<
        CountingStore,
        InMemoryCollegeDirectory,
    >(State(seeded_service()), axum::Json(request))
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "incomeBand");
}

#[tokio::test]
async fn predict_handler_degrades_when_store_is_down() {
    let service = Arc::new(PredictionService::with_config(
        Arc::new(UnavailableStore {
            queries: AtomicUsize::new(0),
        }),
        Arc::new(InMemoryCollegeDirectory::new(vec![college(
            "gmc-mumbai",
            CollegeType::Government,
        )])),
        engine_config(),
        &settings(),
        Arc::new(ManualClock::default()),
    )
    .expect("valid engine config"));

    let response = crate::prediction::router::predict_handler::<
        UnavailableStore,
        InMemoryCollegeDirectory,
    >(State(service), axum::Json(neet_request()))
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["dataAvailable"], false);
    assert_eq!(payload["predictions"], json!([]));
}
