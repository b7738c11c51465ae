#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use image::{DynamicImage, ImageFormat, Rgb};

use ocr_server::api::{create_router, AppState};
use ocr_server::config::{Config, LogFormat, LoggingConfig, OcrConfig, ServerConfig};
use ocr_server::error::{OcrError, Result};
use ocr_server::ocr::{
    BoundingBox, DecodedImage, Detection, OcrEngine, RecognitionLine, RecognitionResult,
};

/// Deterministic engine: reports the decoded shape as its first line, then
/// any configured lines. Optionally sleeps to simulate recognition time.
pub struct ScriptedEngine {
    pub lines: Vec<String>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn line(text: String) -> Detection {
    Detection::Line(RecognitionLine {
        bbox: BoundingBox::default(),
        text,
        confidence: 0.95,
    })
}

#[async_trait]
impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn recognize(
        &self,
        image: DecodedImage,
        _classify_angle: bool,
    ) -> Result<RecognitionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let (height, width, channels) = image.shape();
        let mut detections = vec![line(format!("{width}x{height}x{channels}"))];
        detections.extend(self.lines.iter().cloned().map(line));
        Ok(RecognitionResult::single(detections))
    }
}

/// Engine that finds nothing.
pub struct BlankEngine;

#[async_trait]
impl OcrEngine for BlankEngine {
    fn name(&self) -> &str {
        "blank"
    }

    async fn recognize(&self, _: DecodedImage, _: bool) -> Result<RecognitionResult> {
        Ok(RecognitionResult { images: vec![None] })
    }
}

/// Engine that always fails.
pub struct BrokenEngine;

#[async_trait]
impl OcrEngine for BrokenEngine {
    fn name(&self) -> &str {
        "broken"
    }

    async fn recognize(&self, _: DecodedImage, _: bool) -> Result<RecognitionResult> {
        Err(OcrError::Engine("inference backend crashed".to_string()))
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            service_name: "OCR API".to_string(),
            max_body_bytes: 5 * 1024 * 1024,
        },
        ocr: OcrConfig::default(),
        logging: LoggingConfig {
            format: LogFormat::Pretty,
        },
    }
}

pub fn app_with(engine: Arc<dyn OcrEngine>) -> axum::Router {
    create_router(AppState::new(test_config(), engine))
}

pub fn app_with_body_limit(engine: Arc<dyn OcrEngine>, max_body_bytes: usize) -> axum::Router {
    let mut config = test_config();
    config.server.max_body_bytes = max_body_bytes;
    create_router(AppState::new(config, engine))
}

pub fn sample_png() -> Vec<u8> {
    encode_sample(ImageFormat::Png)
}

pub fn sample_jpeg() -> Vec<u8> {
    encode_sample(ImageFormat::Jpeg)
}

fn encode_sample(format: ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(32, 16, |x, _| {
        if x % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode sample image");
    buf
}

pub fn raw_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ocr")
        .header("content-type", "application/octet-stream")
        .body(Body::from(body))
        .unwrap()
}

pub fn base64_request(json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ocr/base64")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
