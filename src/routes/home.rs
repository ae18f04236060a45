//! Root endpoint describing the service.

use axum::Json;
use serde::Serialize;

use crate::config::{INFO_DOCS, INFO_MESSAGE};

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub docs: &'static str,
}

impl InfoResponse {
    pub const fn new() -> Self {
        Self {
            message: INFO_MESSAGE,
            docs: INFO_DOCS,
        }
    }
}

impl Default for InfoResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Service info handler. Always succeeds.
pub async fn index() -> Json<InfoResponse> {
    Json(InfoResponse::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_payload() {
        let Json(body) = index().await;
        assert!(body.message.contains("DevOps demo application"));
        assert!(!body.docs.is_empty());
    }
}
