use axum::{extract::State, Json};
use serde_json::{json, Value};

use feedback_core::Tracker;

use super::auth::CurrentUser;
use super::error::ApiResult;

pub async fn team_members(
    State(tracker): State<Tracker>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<Value>> {
    let team = tracker.team_members(&actor)?;
    Ok(Json(json!({ "team_members": team })))
}

pub async fn managers(State(tracker): State<Tracker>) -> Json<Value> {
    Json(json!({ "managers": tracker.managers() }))
}
