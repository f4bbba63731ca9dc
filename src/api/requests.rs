use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use feedback_core::models::{CreateRequestInput, RequestId, UpdateRequestStatusInput};
use feedback_core::Tracker;

use super::auth::CurrentUser;
use super::error::ApiResult;
use super::json::ApiJson;

pub async fn list_requests(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<Value>> {
    let requests = tracker.list_requests(&actor)?;
    Ok(Json(json!({ "requests": requests })))
}

pub async fn create_request(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    ApiJson(input): ApiJson<CreateRequestInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request = tracker.create_request(&actor, input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Feedback request sent successfully",
            "request": request,
        })),
    ))
}

pub async fn update_request_status(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path(request_id): Path<RequestId>,
    ApiJson(input): ApiJson<UpdateRequestStatusInput>,
) -> ApiResult<Json<Value>> {
    let request = tracker.update_request_status(&actor, request_id, input)?;
    Ok(Json(json!({
        "message": format!("Feedback request {}", request.request.status.as_str()),
        "request": request,
    })))
}
