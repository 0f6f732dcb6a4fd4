use crate::cli::ServeArgs;
use crate::infra::{load_reference_data, AppState};
use crate::routes::with_prediction_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use counsel_ai::config::AppConfig;
use counsel_ai::error::AppError;
use counsel_ai::prediction::PredictionService;
use counsel_ai::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let data = load_reference_data(
        config.prediction.cutoffs_csv.as_deref(),
        config.prediction.colleges_csv.as_deref(),
    )?;
    info!(
        cutoffs = data.store.len(),
        cutoffs_source = %data.cutoffs_source,
        colleges = data.colleges.len(),
        colleges_source = %data.colleges_source,
        "reference data loaded"
    );

    let prediction_service = Arc::new(PredictionService::new(
        Arc::new(data.store),
        Arc::new(data.colleges),
        &config.prediction,
    ));

    let app = with_prediction_routes(prediction_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        cache_ttl_secs = config.prediction.cache_ttl.num_seconds(),
        "admission prediction service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
