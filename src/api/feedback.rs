use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use feedback_core::models::{CreateFeedbackInput, FeedbackId, UpdateFeedbackInput};
use feedback_core::Tracker;

use super::auth::CurrentUser;
use super::error::ApiResult;
use super::json::ApiJson;

pub async fn list_feedback(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<Value>> {
    let feedback = tracker.list_feedback(&actor)?;
    Ok(Json(json!({ "feedback": feedback })))
}

pub async fn create_feedback(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    ApiJson(input): ApiJson<CreateFeedbackInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let feedback = tracker.create_feedback(&actor, input)?;
    Ok((StatusCode::CREATED, Json(json!({ "feedback": feedback }))))
}

pub async fn update_feedback(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<FeedbackId>,
    ApiJson(input): ApiJson<UpdateFeedbackInput>,
) -> ApiResult<Json<Value>> {
    let feedback = tracker.update_feedback(&actor, id, input)?;
    Ok(Json(json!({ "feedback": feedback })))
}

pub async fn acknowledge_feedback(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<FeedbackId>,
) -> ApiResult<Json<Value>> {
    let feedback = tracker.acknowledge_feedback(&actor, id)?;
    Ok(Json(json!({ "feedback": feedback })))
}

pub async fn dashboard(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<Value>> {
    let dashboard = tracker.dashboard(&actor)?;
    Ok(Json(json!({ "dashboard": dashboard })))
}

/// GET /api/feedback/{id}/export
///
/// Sends the rendered report as a download.
pub async fn export_feedback(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<FeedbackId>,
) -> ApiResult<Response> {
    let report = tracker.export_feedback(&actor, id)?;
    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    Ok((
        [
            (header::CONTENT_TYPE, report.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}
