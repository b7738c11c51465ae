use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OCR API",
        version = "1.0.0",
        description = "Extract text from images with a shared Tesseract engine.",
    ),
    paths(
        handlers::health::root,
        handlers::ocr::extract_text,
        handlers::ocr::extract_text_base64,
    ),
    components(schemas(
        crate::error::ErrorDetail,
        crate::ocr::OcrResponse,
        handlers::health::ServiceStatus,
        handlers::ocr::Base64ImageRequest,
    )),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "ocr", description = "Text extraction from raw or base64 images"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
