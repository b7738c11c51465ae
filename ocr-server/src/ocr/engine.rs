use async_trait::async_trait;

use crate::error::Result;

use super::decode::DecodedImage;

/// Axis-aligned box in pixel coordinates of the submitted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// One recognized text line.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionLine {
    pub bbox: BoundingBox,
    pub text: String,
    /// In `[0, 1]`.
    pub confidence: f32,
}

/// A single engine record after shape validation at the adapter boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Line(RecognitionLine),
    /// A record the adapter could not interpret; carried so callers can skip it.
    Malformed { reason: String },
}

/// Engine output: one entry per submitted image, each an optional list of
/// detections in the engine's reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    pub images: Vec<Option<Vec<Detection>>>,
}

impl RecognitionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Result for a single image.
    pub fn single(detections: Vec<Detection>) -> Self {
        Self {
            images: vec![Some(detections)],
        }
    }

    /// Detections of the first image; absent entries read as no detections.
    pub fn detections(&self) -> &[Detection] {
        self.images
            .first()
            .and_then(|image| image.as_deref())
            .unwrap_or(&[])
    }

    /// Well-formed lines of the first image.
    pub fn lines(&self) -> impl Iterator<Item = &RecognitionLine> {
        self.detections().iter().filter_map(|d| match d {
            Detection::Line(line) => Some(line),
            Detection::Malformed { .. } => None,
        })
    }

    pub fn mean_confidence(&self) -> Option<f32> {
        let (sum, count) = self
            .lines()
            .fold((0.0f32, 0usize), |(sum, n), line| (sum + line.confidence, n + 1));
        (count > 0).then(|| sum / count as f32)
    }
}

/// Text recognition capability backing the OCR endpoints.
///
/// Implementations are created once at startup and shared by all requests, so
/// they must tolerate concurrent calls (serializing internally if needed).
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Detect and recognize text lines, optionally classifying text
    /// orientation first.
    async fn recognize(
        &self,
        image: DecodedImage,
        classify_angle: bool,
    ) -> Result<RecognitionResult>;
}
