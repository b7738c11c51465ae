use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{OcrError, Result};

use super::assembler::assemble;
use super::decode::decode_image;
use super::engine::OcrEngine;
use super::payload::ImagePayload;

/// Body of a successful OCR response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OcrResponse {
    /// Recognized lines joined by newlines, trimmed.
    pub text: String,
    /// Wall-clock seconds spent in recognition and assembly.
    pub processing_time_seconds: f64,
}

/// Decode, recognize and assemble one payload with the shared engine.
#[derive(Clone)]
pub struct OcrPipeline {
    engine: Arc<dyn OcrEngine>,
    classify_angle: bool,
}

impl OcrPipeline {
    pub fn new(engine: Arc<dyn OcrEngine>, classify_angle: bool) -> Self {
        Self {
            engine,
            classify_angle,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub async fn run(&self, payload: ImagePayload) -> Result<OcrResponse> {
        let size_bytes = payload.len();

        self.process(payload).await.map_err(|e| {
            error!(size_bytes, error = %e, "Error processing image");
            e
        })
    }

    async fn process(&self, payload: ImagePayload) -> Result<OcrResponse> {
        let image = tokio::task::spawn_blocking(move || decode_image(payload.as_bytes()))
            .await
            .map_err(|e| OcrError::Internal(format!("Image decode task panicked: {e}")))??;

        let started = Instant::now();
        let result = self.engine.recognize(image, self.classify_angle).await?;
        let text = assemble(&result);
        let processing_time_seconds = started.elapsed().as_secs_f64();

        debug!(
            engine = self.engine.name(),
            lines = result.lines().count(),
            mean_confidence = result.mean_confidence(),
            "Recognition finished"
        );
        info!(
            elapsed_secs = format_args!("{processing_time_seconds:.2}"),
            chars = text.chars().count(),
            "OCR completed"
        );

        Ok(OcrResponse {
            text,
            processing_time_seconds,
        })
    }
}
