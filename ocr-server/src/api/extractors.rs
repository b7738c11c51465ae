use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, JsonRejection};
use axum::extract::{FromRequest, Request};
use axum::http::{header, StatusCode};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::OcrError;

/// JSON extractor whose rejections use the service's `{ "detail": ... }` body.
///
/// A request without any `Content-Type` is still parsed as JSON. A request
/// that names some other content type is rejected.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = OcrError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.headers().contains_key(header::CONTENT_TYPE) {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            return Ok(AppJson(value));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(map_bytes_rejection)?;
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(AppJson(value))
    }
}

impl From<JsonRejection> for OcrError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> OcrError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            OcrError::InvalidInput(format!("Invalid JSON: {}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            OcrError::InvalidInput(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => OcrError::InvalidInput(
            "Expected `Content-Type: application/json`".to_string(),
        ),
        JsonRejection::BytesRejection(err) => map_bytes_rejection(err),
        _ => OcrError::InvalidInput(rejection.body_text()),
    }
}

/// Body-limit overruns keep their 413; other read failures are the caller's.
fn map_bytes_rejection(rejection: BytesRejection) -> OcrError {
    let message = format!("Failed to read request body: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        OcrError::PayloadTooLarge(message)
    } else {
        OcrError::InvalidInput(message)
    }
}
