//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::engine::EngineError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Admin token required")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Knowledge rejected: {0}")]
    CompileFailed(String),
    #[error("Engine has no published knowledge")]
    Uninitialized,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Admin token required".to_string(),
            ),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::CompileFailed(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "COMPILE_FAILED",
                detail.clone(),
            ),
            ApiError::Uninitialized => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ENGINE_UNINITIALIZED",
                "No knowledge base has been loaded".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Compile(e) => ApiError::CompileFailed(e.to_string()),
            EngineError::Uninitialized => ApiError::Uninitialized,
            EngineError::LockFailed => ApiError::Internal("engine lock poisoned".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::engine::CompileError;

    async fn json_of(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_of(response).await["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn compile_error_maps_to_422() {
        let api_err: ApiError = EngineError::Compile(CompileError::DuplicateCondition(
            "influenza".into(),
        ))
        .into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "COMPILE_FAILED");
        assert_eq!(
            json["error"]["message"],
            "Condition declared more than once: influenza"
        );
    }

    #[tokio::test]
    async fn uninitialized_maps_to_503() {
        let api_err: ApiError = EngineError::Uninitialized.into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_of(response).await["error"]["code"], "ENGINE_UNINITIALIZED");
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("missing field".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let api_err: ApiError = EngineError::LockFailed.into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Internal errors hide details from client
        assert_eq!(
            json_of(response).await["error"]["message"],
            "An internal error occurred"
        );
    }
}
