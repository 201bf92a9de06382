//! Error types for the HTTP surface

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Source file not found. Please upload again.")]
    SourceNotFound,

    #[error("Failed to convert Word document to PDF")]
    ConversionFailed,

    #[error("Error reading PDF: {0}")]
    PdfRead(String),

    #[error("Upload failed: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("Unexpected error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::SourceNotFound => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::ConversionFailed | ApiError::PdfRead(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
