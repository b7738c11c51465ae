use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use crate::error::{OcrError, Result, NO_IMAGE_DATA};

/// Prefix that marks a data URL carrying an image.
const DATA_URL_PREFIX: &str = "data:image";

/// Encoded image bytes accepted from either input channel.
///
/// Never empty: both constructors reject zero-length input.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    bytes: Bytes,
}

impl ImagePayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Accept a raw request body as an image payload.
pub fn from_raw_body(body: Bytes) -> Result<ImagePayload> {
    if body.is_empty() {
        return Err(OcrError::InvalidInput(NO_IMAGE_DATA.to_string()));
    }

    info!(size_bytes = body.len(), "Received image");
    Ok(ImagePayload { bytes: body })
}

/// Accept a base64 string, optionally wrapped in a `data:image/...;base64,` URL.
pub fn from_base64(image: Option<&str>) -> Result<ImagePayload> {
    let encoded = match image {
        Some(value) if !value.is_empty() => strip_data_url(value),
        _ => return Err(OcrError::InvalidInput(NO_IMAGE_DATA.to_string())),
    };

    info!(size_chars = encoded.chars().count(), "Received base64 image");

    let bytes = decode_base64(encoded)?;
    Ok(ImagePayload {
        bytes: Bytes::from(bytes),
    })
}

/// Drop everything up to and including the first comma of a data URL.
///
/// A `data:image` string without a comma is returned unchanged.
fn strip_data_url(value: &str) -> &str {
    if !value.starts_with(DATA_URL_PREFIX) {
        return value;
    }
    match value.split_once(',') {
        Some((_, data)) => data,
        None => value,
    }
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        return Ok(STANDARD.decode(compact)?);
    }
    Ok(STANDARD.decode(encoded)?)
}
