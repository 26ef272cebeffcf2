//! Application error type mapping to HTTP status codes (§4.5: "promote any
//! unhandled exception to a 500 without leaking internals").

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modbridge_infra::http::oauth::OAuthError;
use modbridge_types::error::RepositoryError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFound,
    Conflict(String),
    UpstreamAuth(String),
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound,
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            RepositoryError::Query(msg) => AppError::Internal(msg),
        }
    }
}

impl From<OAuthError> for AppError {
    fn from(e: OAuthError) -> Self {
        AppError::UpstreamAuth(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "not found".to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::UpstreamAuth(msg) => {
                tracing::warn!(%msg, "upstream oauth refresh failed");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_AUTH_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!(%msg, "internal data-plane error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "internal error".to_string())
            }
        };

        let body = json!({ "error": { "code": code, "message": message } });
        (status, Json(body)).into_response()
    }
}
