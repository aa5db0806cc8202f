use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryResultSink, InMemorySessionRepository};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use needs_assessment::assessment::AssessmentService;
use needs_assessment::config::AppConfig;
use needs_assessment::error::AppError;
use needs_assessment::telemetry;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let questions = config.assessment.load_question_set()?;
    let question_count = questions.len();
    let sessions = Arc::new(InMemorySessionRepository::default());
    let results = Arc::new(InMemoryResultSink::new(config.assessment.result_retention()));
    let assessment_service = Arc::new(AssessmentService::new(
        questions,
        sessions,
        results,
        config.assessment.flow_timing(),
    ));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, questions = question_count, "needs assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
