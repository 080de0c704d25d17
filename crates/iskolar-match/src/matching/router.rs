use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ScholarshipId, ScholarshipSnapshot};
use super::profile::RawStudentRecord;
use super::service::{MatchingService, MatchingServiceError};
use crate::model::{DecisionHistory, DecisionOutcome, ModelScope, ModelStore};

/// Router builder exposing the matching, prediction, and training surface.
pub fn matching_router<S, H>(service: Arc<MatchingService<S, H>>) -> Router
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    Router::new()
        .route("/api/v1/match", post(match_handler::<S, H>))
        .route("/api/v1/decisions", post(decision_handler::<S, H>))
        .route("/api/v1/models/train", post(train_handler::<S, H>))
        .route("/api/v1/models/status", get(status_handler::<S, H>))
        .route("/api/v1/models/log", get(log_handler::<S, H>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchRequest {
    pub(crate) student: RawStudentRecord,
    pub(crate) scholarship: ScholarshipSnapshot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    pub(crate) application_id: String,
    pub(crate) scholarship_id: String,
    pub(crate) status: DecisionOutcome,
    pub(crate) actor: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TrainRequest {
    /// Train this scholarship's scope; omit for the global scope.
    pub(crate) scholarship_id: Option<String>,
}

pub(crate) async fn match_handler<S, H>(
    State(service): State<Arc<MatchingService<S, H>>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    match service.assess(request.student, &request.scholarship) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(MatchingServiceError::Criteria(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

/// Accepts a decision event and returns immediately; retraining happens on
/// a background task.
pub(crate) async fn decision_handler<S, H>(
    State(service): State<Arc<MatchingService<S, H>>>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    let scholarship_id = ScholarshipId(request.scholarship_id);
    service.record_decision(
        &request.application_id,
        &scholarship_id,
        request.status,
        &request.actor,
    );

    let payload = json!({
        "status": "accepted",
        "application_id": request.application_id,
        "scholarship_id": scholarship_id.0,
    });
    (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
}

pub(crate) async fn train_handler<S, H>(
    State(service): State<Arc<MatchingService<S, H>>>,
    axum::Json(request): axum::Json<TrainRequest>,
) -> Response
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    let scope = match request.scholarship_id {
        Some(id) if !id.trim().is_empty() => ModelScope::Scholarship(ScholarshipId(id)),
        _ => ModelScope::Global,
    };

    let entry = service.train(scope);
    (StatusCode::OK, axum::Json(entry)).into_response()
}

pub(crate) async fn status_handler<S, H>(
    State(service): State<Arc<MatchingService<S, H>>>,
) -> Response
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    (StatusCode::OK, axum::Json(service.training_status())).into_response()
}

pub(crate) async fn log_handler<S, H>(
    State(service): State<Arc<MatchingService<S, H>>>,
) -> Response
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    (StatusCode::OK, axum::Json(service.training_log())).into_response()
}
