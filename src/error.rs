use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::constants::API_NAME;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Detection failed: {0}")]
    DetectionFailed(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Detection service error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|k| &**k).collect();
        fields.sort_unstable();
        AppError::Validation(format!("Missing or invalid fields: {}", fields.join(", ")))
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DetectionFailed(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Network(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Driver and transport details go to the log, not to the kiosk.
        let error_message = match self {
            AppError::Validation(msg) => {
                tracing::warn!("{} Validation error: {}", API_NAME, msg);
                msg
            }
            AppError::NotFound(msg) => {
                tracing::warn!("{} Not found: {}", API_NAME, msg);
                msg
            }
            AppError::DetectionFailed(msg) => {
                tracing::warn!("{} Detection failed: {}", API_NAME, msg);
                msg
            }
            AppError::Store(e) => {
                tracing::error!("{} Database error: {}", API_NAME, e);
                "Database error".to_string()
            }
            AppError::Network(e) => {
                tracing::error!("{} Detection service error: {}", API_NAME, e);
                "Failed to process image".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("{} Internal error: {:#}", API_NAME, e);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DetectionFailed("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Store(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    #[traced_test]
    fn store_errors_are_logged_at_the_boundary() {
        let response = AppError::Store(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs_contain("Database error"));
    }

    #[test]
    fn validation_errors_name_the_offending_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("spot", validator::ValidationError::new("required"));
        errors.add("plate", validator::ValidationError::new("length"));

        let err = AppError::from(errors);
        assert_eq!(
            err.to_string(),
            "Validation error: Missing or invalid fields: plate, spot"
        );
    }
}
