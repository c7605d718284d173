use crate::utils::error::{AppError, ErrorCategory, FieldError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFoundError { .. } => StatusCode::NOT_FOUND,
            AppError::VersionConflictError { .. } => StatusCode::CONFLICT,
            AppError::PayloadTooLargeError { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaTypeError { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::NotFoundError { .. } => "NOT_FOUND",
            AppError::VersionConflictError { .. } => "VERSION_CONFLICT",
            AppError::PayloadTooLargeError { .. } => "PAYLOAD_TOO_LARGE",
            AppError::UnsupportedMediaTypeError { .. } => "UNSUPPORTED_MEDIA_TYPE",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 伺服器端錯誤只記錄在日誌，不回傳內部細節
        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else if self.category() != ErrorCategory::Authorization {
            tracing::debug!("Request rejected: {}", self);
        }

        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.user_friendly_message()
        };
        let code = self.error_code();
        let fields = match self {
            AppError::ValidationError { errors } => errors,
            _ => Vec::new(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                fields,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("name", "is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::StorageError {
                message: "bucket gone".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::VersionConflictError {
                collection: "projects".to_string(),
                expected: 1,
                actual: 2
            }
            .status_code(),
            StatusCode::CONFLICT
        );
    }
}
