//! Handler for requests that match no route.

use axum::http::Uri;

use crate::error::AppError;

/// Answers 404 with a JSON error body.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}
