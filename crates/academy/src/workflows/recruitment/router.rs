use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    ApplicationId, ClubId, ClubProfile, DecisionOutcome, SkillAttributes, SubmitterId, TraineeId,
    TraineeProfile,
};
use super::projection::Viewer;
use super::scoring::AttributeError;
use super::service::{RecruitmentError, RecruitmentService};
use super::store::{RecruitmentStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTestRequest {
    pub submitter_id: String,
    pub attributes: SkillAttributes,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubSelectionRequest {
    pub club_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub outcome: DecisionOutcome,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardQuery {
    pub role: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Router builder exposing the recruitment workflow over HTTP.
pub fn recruitment_router<S>(service: Arc<RecruitmentService<S>>) -> Router
where
    S: RecruitmentStore + 'static,
{
    Router::new()
        .route("/api/v1/trainees", post(register_trainee_handler::<S>))
        .route(
            "/api/v1/trainees/:trainee_id/status",
            get(status_handler::<S>),
        )
        .route(
            "/api/v1/trainees/:trainee_id/tests",
            post(submit_test_handler::<S>),
        )
        .route(
            "/api/v1/trainees/:trainee_id/scores",
            get(scores_handler::<S>),
        )
        .route(
            "/api/v1/trainees/:trainee_id/position-fit",
            get(position_fit_handler::<S>),
        )
        .route(
            "/api/v1/trainees/:trainee_id/report",
            get(report_handler::<S>),
        )
        .route(
            "/api/v1/trainees/:trainee_id/applications",
            post(apply_handler::<S>),
        )
        .route(
            "/api/v1/trainees/:trainee_id/final-club",
            post(finalize_handler::<S>),
        )
        .route("/api/v1/clubs", post(register_club_handler::<S>))
        .route(
            "/api/v1/clubs/:club_id/applications",
            get(club_applications_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/decision",
            post(decision_handler::<S>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .with_state(service)
}

/// Map a service error onto a status code and a `{error, code}` payload.
pub(crate) fn error_response(error: RecruitmentError) -> Response {
    let status = match &error {
        RecruitmentError::InvalidAttributeData(_) | RecruitmentError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RecruitmentError::AlreadyApplied { .. }
        | RecruitmentError::NotEligible(_)
        | RecruitmentError::InvalidTransition { .. } => StatusCode::CONFLICT,
        RecruitmentError::TraineeNotFound(_)
        | RecruitmentError::ClubNotFound(_)
        | RecruitmentError::ApplicationNotFound(_)
        | RecruitmentError::TestResultMissing(_) => StatusCode::NOT_FOUND,
        RecruitmentError::Store(StoreError::Unavailable(_) | StoreError::Timeout) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RecruitmentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
        "code": error.code(),
    });
    (status, axum::Json(payload)).into_response()
}

/// Body errors under `attributes` are bad attribute data; anything else is a malformed request.
fn submission_rejection(rejection: JsonRejection) -> RecruitmentError {
    let detail = rejection.body_text();
    match rejection {
        JsonRejection::JsonDataError(_) if detail.contains("attributes") => {
            AttributeError::MalformedSheet { detail }.into()
        }
        _ => RecruitmentError::Validation(detail),
    }
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, RecruitmentError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_trainee_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    axum::Json(profile): axum::Json<TraineeProfile>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(StatusCode::CREATED, service.register_trainee(profile))
}

pub(crate) async fn register_club_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    axum::Json(profile): axum::Json<ClubProfile>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(StatusCode::CREATED, service.register_club(profile))
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(trainee_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(StatusCode::OK, service.status(&TraineeId(trainee_id)))
}

pub(crate) async fn submit_test_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(trainee_id): Path<String>,
    payload: Result<axum::Json<SubmitTestRequest>, JsonRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return error_response(submission_rejection(rejection)),
    };
    let SubmitTestRequest {
        submitter_id,
        attributes,
        notes,
    } = request;
    respond(
        StatusCode::CREATED,
        service.submit_test(
            &TraineeId(trainee_id),
            SubmitterId(submitter_id),
            attributes,
            notes,
        ),
    )
}

pub(crate) async fn scores_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(trainee_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(
        StatusCode::OK,
        service.category_scores(&TraineeId(trainee_id)),
    )
}

pub(crate) async fn position_fit_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(trainee_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(StatusCode::OK, service.position_fit(&TraineeId(trainee_id)))
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(trainee_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(
        StatusCode::OK,
        service.trainee_report(&TraineeId(trainee_id)),
    )
}

pub(crate) async fn apply_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(trainee_id): Path<String>,
    axum::Json(request): axum::Json<ClubSelectionRequest>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let result = service
        .apply(&TraineeId(trainee_id), &ClubId(request.club_id))
        .map(|application| application.view(None));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn finalize_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(trainee_id): Path<String>,
    axum::Json(request): axum::Json<ClubSelectionRequest>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(
        StatusCode::OK,
        service.finalize(&TraineeId(trainee_id), &ClubId(request.club_id)),
    )
}

pub(crate) async fn club_applications_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(club_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    respond(
        StatusCode::OK,
        service.applications_for_club(&ClubId(club_id)),
    )
}

pub(crate) async fn decision_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let result = service
        .decide(
            &ApplicationId(application_id),
            request.outcome,
            request.feedback,
        )
        .map(|application| application.view(None));
    respond(StatusCode::OK, result)
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    match Viewer::from_parts(&query.role, query.id.as_deref()) {
        Some(viewer) => respond(StatusCode::OK, service.dashboard(&viewer)),
        None => error_response(RecruitmentError::Validation(format!(
            "unknown viewer role '{}' or missing id",
            query.role
        ))),
    }
}
