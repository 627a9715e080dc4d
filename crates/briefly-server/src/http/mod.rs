pub mod auth;
mod routes;

pub use routes::create_router;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use briefly_core::{BriefingError, BriefingService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BriefingService>,
    pub start_time: Instant,
}

/// JSON response wrapper
#[derive(Debug, Serialize)]
pub struct JsonResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// 400 with the standard error shape.
pub fn bad_request(msg: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(JsonResponse::<()>::err(msg)),
    )
        .into_response()
}

/// Custom error type for HTTP handlers.
///
/// Pipeline error kinds map onto meaningful statuses; anything else is a
/// plain 500.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.downcast_ref::<BriefingError>() {
            Some(BriefingError::NotFound) => (StatusCode::NOT_FOUND, self.0.to_string()),
            Some(BriefingError::CompletionRateLimit(_)) => {
                (StatusCode::TOO_MANY_REQUESTS, self.0.to_string())
            }
            Some(BriefingError::MalformedCompletion { raw }) => {
                // The raw model output stays in the server log; callers get
                // a generic failure.
                tracing::warn!("Discarding malformed completion output: {}", raw);
                (
                    StatusCode::BAD_GATEWAY,
                    "Completion output could not be parsed".to_string(),
                )
            }
            Some(
                BriefingError::CompletionAuth(_)
                | BriefingError::CompletionNetwork(_)
                | BriefingError::CompletionUpstream { .. }
                | BriefingError::CompletionTimeout(_),
            ) => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        };

        (status, Json(JsonResponse::<()>::err(message))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
