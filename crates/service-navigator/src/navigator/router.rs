use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog;
use super::domain::{FormAnswers, PolicyContext, QuestionField, ServiceId};
use super::service::{NavigatorError, NavigatorService};
use super::session::{SessionId, SessionRepository, SessionStoreError};
use super::summary::SummaryEmitter;

/// Router builder exposing the navigator workflow over HTTP.
pub fn navigator_router<R, E>(service: Arc<NavigatorService<R, E>>) -> Router
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    Router::new()
        .route("/api/v1/services", get(services_handler))
        .route(
            "/api/v1/services/:service/questions",
            get(questions_handler),
        )
        .route("/api/v1/intent", post(intent_handler::<R, E>))
        .route("/api/v1/eligibility", post(eligibility_handler::<R, E>))
        .route("/api/v1/sessions", post(create_session_handler::<R, E>))
        .route(
            "/api/v1/sessions/:session_id",
            get(session_handler::<R, E>).delete(reset_handler::<R, E>),
        )
        .route(
            "/api/v1/sessions/:session_id/analyze",
            post(analyze_handler::<R, E>),
        )
        .route(
            "/api/v1/sessions/:session_id/answers",
            post(answers_handler::<R, E>),
        )
        .route("/api/v1/artifacts/:file_name", get(artifact_handler::<R, E>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub service: String,
    #[serde(default)]
    pub answers: FormAnswers,
    #[serde(default)]
    pub policy_context: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    pub answers: FormAnswers,
}

#[derive(Debug, Serialize)]
struct ServiceView {
    id: ServiceId,
    label: &'static str,
    questions: usize,
}

#[derive(Debug, Serialize)]
struct QuestionsView {
    service: String,
    questions: Vec<QuestionField>,
}

/// Flattens typed JSON answers back into the raw form representation.
fn raw_answers(answers: &FormAnswers) -> BTreeMap<String, String> {
    answers
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

/// HTTP status for each navigator failure.
pub(crate) fn status_for(error: &NavigatorError) -> StatusCode {
    match error {
        NavigatorError::EmptyQuery
        | NavigatorError::ServiceNotRecognized
        | NavigatorError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
        NavigatorError::NotAnalyzed => StatusCode::CONFLICT,
        NavigatorError::UnknownSession(_) | NavigatorError::Store(SessionStoreError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        NavigatorError::Store(_) | NavigatorError::Summary(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: NavigatorError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

/// Malformed or mistyped bodies are input errors with the usual error payload.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": format!("invalid request body: {}", rejection.body_text()),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

pub(crate) async fn services_handler() -> Response {
    let services: Vec<ServiceView> = ServiceId::ordered()
        .into_iter()
        .map(|service| ServiceView {
            id: service,
            label: service.label(),
            questions: catalog::fields(service).len(),
        })
        .collect();
    (StatusCode::OK, axum::Json(services)).into_response()
}

pub(crate) async fn questions_handler(Path(service): Path<String>) -> Response {
    let view = QuestionsView {
        questions: catalog::questions_for(&service),
        service,
    };
    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn intent_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
    request: Result<axum::Json<TextRequest>, JsonRejection>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    let intent = service.classify(&request.text);
    (StatusCode::OK, axum::Json(intent)).into_response()
}

pub(crate) async fn eligibility_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
    request: Result<axum::Json<EligibilityRequest>, JsonRejection>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    let policy = PolicyContext::new(request.policy_context);
    match service.check_eligibility(&request.service, &raw_answers(&request.answers), &policy) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_session_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    match service.start_session() {
        Ok(session) => {
            let payload = json!({ "session_id": session.id });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analyze_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
    Path(session_id): Path<String>,
    request: Result<axum::Json<TextRequest>, JsonRejection>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.analyze_session(&SessionId(session_id), &request.text) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answers_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
    Path(session_id): Path<String>,
    request: Result<axum::Json<AnswersRequest>, JsonRejection>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    let raw = raw_answers(&request.answers);
    match service.submit_session(&SessionId(session_id), &raw).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    match service.reset_session(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn artifact_handler<R, E>(
    State(service): State<Arc<NavigatorService<R, E>>>,
    Path(file_name): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    match service.artifact(&file_name) {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::APPLICATION_PDF.as_ref())],
            bytes,
        )
            .into_response(),
        Ok(None) => {
            let payload = json!({
                "error": format!("artifact {file_name} not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
