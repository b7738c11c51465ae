use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned when a request carries no image.
pub const NO_IMAGE_DATA: &str = "No image data provided";

#[derive(Error, Debug)]
pub enum OcrError {
    /// Caller-supplied data is missing, empty, or not readable as a request.
    #[error("{0}")]
    InvalidInput(String),

    /// Request body exceeded the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Invalid base64 data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("OCR engine error: {0}")]
    Engine(String),

    #[error("{0}")]
    Internal(String),
}

impl OcrError {
    pub fn status(&self) -> StatusCode {
        match self {
            OcrError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            OcrError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            // Undecodable payloads share the processing-failure path with engine errors.
            OcrError::InvalidBase64(_)
            | OcrError::Decode(_)
            | OcrError::Engine(_)
            | OcrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable text for the response `detail` field.
    pub fn detail(&self) -> String {
        match self {
            OcrError::InvalidInput(msg) | OcrError::PayloadTooLarge(msg) => msg.clone(),
            OcrError::InvalidBase64(_) | OcrError::Decode(_) | OcrError::Engine(_) => {
                format!("Error processing image: {self}")
            }
            OcrError::Internal(msg) => format!("Server error: {msg}"),
        }
    }
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorDetail {
            detail: self.detail(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
