//! HTTP API.
//!
//! Every route except health, login and the manager listing resolves the
//! caller from the `X-User-ID` header before touching the tracker.

mod auth;
mod comments;
mod error;
mod feedback;
mod json;
mod requests;
mod users;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use feedback_core::Tracker;

pub use auth::{CurrentUser, USER_ID_HEADER};
pub use error::{ApiError, ApiResult};
pub use json::ApiJson;

pub fn create_router(tracker: Tracker) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(auth::login))
        // Users
        .route("/api/users/team", get(users::team_members))
        .route("/api/users/managers", get(users::managers))
        // Feedback
        .route(
            "/api/feedback",
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route("/api/feedback/dashboard", get(feedback::dashboard))
        .route("/api/feedback/{id}", put(feedback::update_feedback))
        .route(
            "/api/feedback/{id}/acknowledge",
            post(feedback::acknowledge_feedback),
        )
        .route("/api/feedback/{id}/export", get(feedback::export_feedback))
        // Comments
        .route(
            "/api/feedback/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/feedback/{id}/comments/{cid}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route(
            "/api/feedback/{id}/comments/{cid}/like",
            post(comments::toggle_like),
        )
        // Feedback requests
        .route(
            "/api/feedback/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route(
            "/api/feedback/requests/{rid}",
            put(requests::update_request_status),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(tracker)
}

/// GET /api/health
async fn health(State(tracker): State<Tracker>) -> (StatusCode, Json<Value>) {
    match tracker.database().ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "connected" })),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "disconnected" })),
            )
        }
    }
}
