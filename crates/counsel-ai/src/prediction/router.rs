use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::history::{CollegeDirectory, HistoricalPatternStore};
use super::report::PredictionRequest;
use super::service::PredictionService;

/// Router builder exposing the prediction endpoint.
pub fn prediction_router<S, C>(service: Arc<PredictionService<S, C>>) -> Router
where
    S: HistoricalPatternStore + 'static,
    C: CollegeDirectory + 'static,
{
    Router::new()
        .route("/api/v1/predictions", post(predict_handler::<S, C>))
        .with_state(service)
}

pub(crate) async fn predict_handler<S, C>(
    State(service): State<Arc<PredictionService<S, C>>>,
    axum::Json(request): axum::Json<PredictionRequest>,
) -> Response
where
    S: HistoricalPatternStore + 'static,
    C: CollegeDirectory + 'static,
{
    match service.predict(request) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
