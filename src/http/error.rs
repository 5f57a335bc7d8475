//! Error bodies and the mapping from domain errors to status codes.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::controller::ControllerError;
use crate::repository::RepositoryError;
use crate::uploads::UploadError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge(String),
    /// Logged, never sent to the client.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized(detail) => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHORIZED", "Authentication required").with_details(detail),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_ERROR", "Validation failed").with_details(detail),
            ),
            AppError::PayloadTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiError::new("PAYLOAD_TOO_LARGE", "Request body too large").with_details(detail),
            ),
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", "Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => AppError::NotFound("Tour not found".to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::IoError(e) => AppError::Internal(e.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl From<ControllerError> for AppError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Validation(e) => AppError::BadRequest(e.to_string()),
            ControllerError::Repository(e) => e.into(),
            ControllerError::Upload(e) => e.into(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        multipart_failure(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        multipart_failure(rejection.status(), rejection.body_text())
    }
}

// The body limit surfaces as a 413 inside multipart errors
fn multipart_failure(status: StatusCode, detail: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(detail)
    } else {
        AppError::BadRequest(format!("Malformed multipart body: {}", detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (AppError::Unauthorized("no token".into()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("Tour not found".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::PayloadTooLarge("2MB".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::Internal("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_multipart_status_is_kept() {
        assert!(matches!(
            multipart_failure(StatusCode::PAYLOAD_TOO_LARGE, "limit".into()),
            AppError::PayloadTooLarge(_)
        ));
        assert!(matches!(
            multipart_failure(StatusCode::BAD_REQUEST, "no boundary".into()),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn test_controller_errors() {
        let missing: AppError =
            ControllerError::from(ValidationError::MissingField("title".into())).into();
        assert!(matches!(missing, AppError::BadRequest(ref d) if d.contains("title")));

        let gone: AppError = ControllerError::from(RepositoryError::NotFound(3)).into();
        assert!(matches!(gone, AppError::NotFound(_)));
    }
}
