use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No route for {0}")]
    RouteNotFound(String),
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::RouteNotFound(path) => {
                tracing::debug!(path = %path, "No matching route");
                (StatusCode::NOT_FOUND, "not_found")
            }
        };

        let body = ErrorResponse {
            error,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
