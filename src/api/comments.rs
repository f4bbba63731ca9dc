use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use feedback_core::models::{CommentId, CreateCommentInput, FeedbackId, UpdateCommentInput};
use feedback_core::Tracker;

use super::auth::CurrentUser;
use super::error::ApiResult;
use super::json::ApiJson;

pub async fn list_comments(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path(feedback_id): Path<FeedbackId>,
) -> ApiResult<Json<Value>> {
    let comments = tracker.list_comments(&actor, feedback_id)?;
    Ok(Json(json!({ "comments": comments })))
}

pub async fn create_comment(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path(feedback_id): Path<FeedbackId>,
    ApiJson(input): ApiJson<CreateCommentInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let comment = tracker.create_comment(&actor, feedback_id, input)?;
    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}

pub async fn update_comment(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path((feedback_id, comment_id)): Path<(FeedbackId, CommentId)>,
    ApiJson(input): ApiJson<UpdateCommentInput>,
) -> ApiResult<Json<Value>> {
    let comment = tracker.update_comment(&actor, feedback_id, comment_id, input)?;
    Ok(Json(json!({ "comment": comment })))
}

pub async fn delete_comment(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path((feedback_id, comment_id)): Path<(FeedbackId, CommentId)>,
) -> ApiResult<Json<Value>> {
    let removed = tracker.delete_comment(&actor, feedback_id, comment_id)?;
    Ok(Json(json!({
        "message": "Comment deleted successfully",
        "deleted": removed,
    })))
}

pub async fn toggle_like(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
    Path((feedback_id, comment_id)): Path<(FeedbackId, CommentId)>,
) -> ApiResult<Json<Value>> {
    let result = tracker.toggle_like(&actor, feedback_id, comment_id)?;
    Ok(Json(json!({
        "comment": result.comment,
        "action": result.action,
    })))
}
