use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentError, OptionId, QuestionId, SessionId};
use super::repository::{RepositoryError, ResultSink, SessionRepository};
use super::service::{AssessmentService, AssessmentServiceError, StepOutcome};

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub question_id: QuestionId,
    pub option_id: OptionId,
}

#[derive(Debug, Deserialize)]
pub struct AutoAdvanceRequest {
    pub from_step: usize,
}

/// Router builder exposing the assessment flow over HTTP.
pub fn assessment_router<R, S>(service: Arc<AssessmentService<R, S>>) -> Router
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    Router::new()
        .route("/api/v1/questions", get(questions_handler::<R, S>))
        .route("/api/v1/assessments", post(start_handler::<R, S>))
        .route(
            "/api/v1/assessments/:session_id",
            get(snapshot_handler::<R, S>).delete(abandon_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/selections",
            post(select_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/back",
            post(back_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/next",
            post(next_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/auto-advance",
            post(auto_advance_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/result",
            get(result_handler::<R, S>),
        )
        .with_state(service)
}

pub(crate) async fn questions_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    (StatusCode::OK, axum::Json(service.questions().clone())).into_response()
}

pub(crate) async fn start_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    match service.start() {
        Ok(snapshot) => (StatusCode::CREATED, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn snapshot_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    match service.snapshot(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn abandon_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    match service.abandon(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn select_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SelectionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    match service.select(
        &SessionId(session_id),
        request.question_id,
        &request.option_id,
    ) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn back_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    match service.back(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn next_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    let outcome = service.next(&SessionId(session_id));
    step_response(&service, outcome).await
}

pub(crate) async fn auto_advance_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<AutoAdvanceRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    let outcome = service.auto_advance(&SessionId(session_id), request.from_step);
    step_response(&service, outcome).await
}

pub(crate) async fn result_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    match service.claim_result(&SessionId(session_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn step_response<R, S>(
    service: &AssessmentService<R, S>,
    outcome: Result<StepOutcome, AssessmentServiceError>,
) -> Response
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    match outcome {
        Ok(outcome @ StepOutcome::Blocked(_)) => {
            (StatusCode::CONFLICT, axum::Json(outcome)).into_response()
        }
        Ok(outcome @ StepOutcome::Complete(_)) => {
            // The result is already with the sink; the pause only paces the display.
            let delay = service.timing().calculating_delay;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            (StatusCode::OK, axum::Json(outcome)).into_response()
        }
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Assessment(AssessmentError::InvalidReference(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentServiceError::Assessment(
            AssessmentError::NotReady { .. } | AssessmentError::SessionComplete,
        ) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
        | AssessmentServiceError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
