use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::extractors::AppJson;
use crate::api::state::AppState;
use crate::error::{OcrError, Result};
use crate::ocr::{payload, ImagePayload, OcrResponse};

/// Body of `POST /ocr/base64`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Base64ImageRequest {
    /// Plain base64 or a data URL such as `data:image/png;base64,<data>`.
    #[serde(default)]
    pub image: Option<String>,
}

/// `POST /ocr`
#[utoipa::path(
    post,
    path = "/ocr",
    tag = "ocr",
    request_body(
        content = String,
        content_type = "application/octet-stream",
        description = "Raw image bytes (PNG, JPEG, BMP, ...)"
    ),
    responses(
        (status = 200, description = "Extracted text", body = OcrResponse),
        (status = 400, description = "Empty body", body = crate::error::ErrorDetail),
        (status = 500, description = "Image could not be decoded or recognized", body = crate::error::ErrorDetail),
    )
)]
pub async fn extract_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OcrResponse>> {
    respond(&state, payload::from_raw_body(body)).await
}

/// `POST /ocr/base64`
#[utoipa::path(
    post,
    path = "/ocr/base64",
    tag = "ocr",
    request_body = Base64ImageRequest,
    responses(
        (status = 200, description = "Extracted text", body = OcrResponse),
        (status = 400, description = "Missing or empty `image` field", body = crate::error::ErrorDetail),
        (status = 413, description = "Body exceeds the configured size limit", body = crate::error::ErrorDetail),
        (status = 500, description = "Invalid base64 or undecodable image", body = crate::error::ErrorDetail),
    )
)]
pub async fn extract_text_base64(
    State(state): State<AppState>,
    AppJson(request): AppJson<Base64ImageRequest>,
) -> Result<Json<OcrResponse>> {
    respond(&state, payload::from_base64(request.image.as_deref())).await
}

/// Shared tail of both endpoints: run the pipeline and log the outcome.
async fn respond(
    state: &AppState,
    payload: Result<ImagePayload>,
) -> Result<Json<OcrResponse>> {
    let started = Instant::now();
    let size_bytes = payload.as_ref().map(ImagePayload::len).unwrap_or(0);

    let outcome = match payload {
        Ok(payload) => state.pipeline.run(payload).await,
        Err(e) => Err(e),
    };
    let elapsed_secs = started.elapsed().as_secs_f64();

    match outcome {
        Ok(response) => {
            info!(size_bytes, elapsed_secs, "OCR request succeeded");
            Ok(Json(response))
        }
        Err(e @ OcrError::InvalidInput(_)) => {
            warn!(error = %e, "Rejected OCR request");
            Err(e)
        }
        Err(e) => {
            error!(size_bytes, elapsed_secs, error = %e, "Error in OCR endpoint");
            Err(e)
        }
    }
}
