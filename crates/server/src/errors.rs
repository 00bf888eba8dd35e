use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// JSON error body: `{ "error": <title>, "detail": <detail> }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.title,
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match &e {
            ServiceError::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg.clone()))
            }
            ServiceError::Model(inner) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(inner.to_string()))
            }
            ServiceError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string()))
            }
            ServiceError::Forbidden(_) => {
                Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(e.to_string()))
            }
            ServiceError::Mail(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "Upstream Error", Some(e.to_string()))
            }
            ServiceError::Db(_) | ServiceError::Upload(_) => {
                error!(error = %e, "internal service error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl From<service::auth::errors::AuthError> for JsonApiError {
    fn from(e: service::auth::errors::AuthError) -> Self {
        use service::auth::errors::AuthError;
        match &e {
            AuthError::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg.clone()))
            }
            AuthError::Conflict => {
                Self::new(StatusCode::CONFLICT, "Conflict", Some(e.to_string()))
            }
            AuthError::Unauthorized => {
                Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(e.to_string()))
            }
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Db(_) => {
                error!(error = %e, "internal auth error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
