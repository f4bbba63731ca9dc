use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use feedback_core::Error;

use super::ApiError;

/// `Json` whose rejections answer 400 with the `{"error": ..}` body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(ApiError(Error::validation(rejection.body_text())))
            }
        }
    }
}
