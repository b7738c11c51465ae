//! HTTP service that extracts text from images.
//!
//! Images arrive either as a raw request body (`POST /ocr`) or as base64 /
//! data-URL JSON (`POST /ocr/base64`). Both run through the same
//! [`ocr::OcrPipeline`] backed by one engine created at startup.

pub mod api;
pub mod config;
pub mod error;
pub mod ocr;
