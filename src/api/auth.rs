use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use feedback_core::models::{User, UserId};
use feedback_core::{Error, Tracker};

use super::error::ApiResult;
use super::json::ApiJson;
use super::ApiError;

/// Header carrying the caller's directory id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, resolved from `X-User-ID`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Tracker> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, tracker: &Tracker) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .ok_or_else(|| Error::unauthorized("Authentication required"))?;
        Ok(Self(tracker.resolve_actor(id)?))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /api/auth/login
///
/// Demo login: identifies the caller by email only.
pub async fn login(
    State(tracker): State<Tracker>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let user = tracker.login(&body.email)?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(json!({ "user": user })))
}
