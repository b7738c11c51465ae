//! Image ingestion and text recognition.
//!
//! A request flows through four stages:
//! - `payload` turns a raw body or a base64 / data-URL string into image bytes
//! - `decode` turns those bytes into an 8-bit pixel grid
//! - an [`OcrEngine`] (Tesseract in production) detects and recognizes lines
//! - `assembler` joins the recognized lines into one text block
//!
//! [`OcrPipeline`] runs the last three stages for both HTTP input channels.

mod assembler;
mod decode;
mod engine;
pub mod payload;
mod pipeline;
mod tesseract;

pub use assembler::assemble;
pub use decode::{decode_image, ColorMode, DecodedImage};
pub use engine::{BoundingBox, Detection, OcrEngine, RecognitionLine, RecognitionResult};
pub use payload::ImagePayload;
pub use pipeline::{OcrPipeline, OcrResponse};
pub use tesseract::TesseractEngine;
