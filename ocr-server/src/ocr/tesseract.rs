use std::sync::Arc;

use async_trait::async_trait;
use leptess::{LepTess, Variable};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::error::{OcrError, Result};

use super::decode::DecodedImage;
use super::engine::{BoundingBox, Detection, OcrEngine, RecognitionLine, RecognitionResult};

/// Automatic page segmentation with orientation and script detection.
const PSM_AUTO_OSD: &str = "1";
/// Fully automatic page segmentation, no orientation detection.
const PSM_AUTO: &str = "3";

const LINE_LEVEL: u8 = 4;
const WORD_LEVEL: u8 = 5;
const TSV_MIN_FIELDS: usize = 11;
const TSV_FIELDS: usize = 12;

/// Local Tesseract engine through leptess.
///
/// The underlying handle is not reentrant, so calls are serialized behind a
/// mutex and executed on the blocking pool.
pub struct TesseractEngine {
    tesseract: Arc<Mutex<LepTess>>,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let lt = LepTess::new(config.tessdata_path.as_deref(), &config.languages)
            .map_err(|e| OcrError::Engine(format!("Failed to initialize Tesseract: {e}")))?;

        if config.use_gpu {
            warn!("Hardware acceleration requested but Tesseract runs on CPU only; ignoring");
        }

        info!(
            languages = %config.languages,
            angle_classification = config.angle_classification,
            "Tesseract OCR initialized"
        );

        Ok(Self {
            tesseract: Arc::new(Mutex::new(lt)),
        })
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(
        &self,
        image: DecodedImage,
        classify_angle: bool,
    ) -> Result<RecognitionResult> {
        let tesseract = Arc::clone(&self.tesseract);

        let tsv = tokio::task::spawn_blocking(move || {
            let png = image.encode_png()?;
            let psm = if classify_angle { PSM_AUTO_OSD } else { PSM_AUTO };

            let mut lt = tesseract.blocking_lock();
            lt.set_variable(Variable::TesseditPagesegMode, psm)
                .map_err(|e| OcrError::Engine(format!("Failed to set page segmentation: {e:?}")))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::Engine(format!("Failed to set image: {e}")))?;
            lt.get_tsv_text(0)
                .map_err(|e| OcrError::Engine(format!("Failed to extract text: {e}")))
        })
        .await
        .map_err(|e| OcrError::Internal(format!("OCR task panicked: {e}")))??;

        Ok(RecognitionResult::single(parse_tsv(&tsv)))
    }
}

/// Row identity shared by a line and its words: (page, block, paragraph, line).
type LineKey = (u32, u32, u32, u32);

struct TsvRow<'a> {
    level: u8,
    key: LineKey,
    bbox: BoundingBox,
    conf: f32,
    text: &'a str,
}

fn parse_row(row: &str) -> std::result::Result<TsvRow<'_>, String> {
    let fields: Vec<&str> = row.splitn(TSV_FIELDS, '\t').collect();
    if fields.len() < TSV_MIN_FIELDS {
        return Err(format!(
            "expected {TSV_FIELDS} columns, found {}",
            fields.len()
        ));
    }

    let int = |idx: usize| -> std::result::Result<u32, String> {
        fields[idx]
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("column {idx} ('{}'): {e}", fields[idx]))
    };

    let level = int(0)?;
    let level = u8::try_from(level).map_err(|_| format!("level out of range: {level}"))?;
    let conf = fields[10]
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("confidence ('{}'): {e}", fields[10]))?;

    Ok(TsvRow {
        level,
        key: (int(1)?, int(2)?, int(3)?, int(4)?),
        bbox: BoundingBox {
            left: int(6)?,
            top: int(7)?,
            width: int(8)?,
            height: int(9)?,
        },
        conf,
        text: fields.get(11).copied().unwrap_or(""),
    })
}

struct LineBuilder {
    key: LineKey,
    bbox: BoundingBox,
    words: Vec<String>,
    confidences: Vec<f32>,
}

impl LineBuilder {
    fn new(key: LineKey, bbox: BoundingBox) -> Self {
        Self {
            key,
            bbox,
            words: Vec::new(),
            confidences: Vec::new(),
        }
    }

    fn push_word(&mut self, text: &str, conf: f32) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.words.push(text.to_string());
        if conf >= 0.0 {
            self.confidences.push(conf);
        }
    }

    fn finish(self) -> Option<Detection> {
        if self.words.is_empty() {
            return None;
        }

        let confidence = if self.confidences.is_empty() {
            0.0
        } else {
            let mean = self.confidences.iter().sum::<f32>() / self.confidences.len() as f32;
            (mean / 100.0).clamp(0.0, 1.0)
        };

        Some(Detection::Line(RecognitionLine {
            bbox: self.bbox,
            text: self.words.join(" "),
            confidence,
        }))
    }
}

fn flush(current: &mut Option<LineBuilder>, detections: &mut Vec<Detection>) {
    if let Some(detection) = current.take().and_then(LineBuilder::finish) {
        detections.push(detection);
    }
}

/// Group Tesseract TSV word rows into line detections, in output order.
pub(crate) fn parse_tsv(tsv: &str) -> Vec<Detection> {
    let mut detections = Vec::new();
    let mut current: Option<LineBuilder> = None;

    for row in tsv.lines() {
        if row.trim().is_empty() || row.starts_with("level") {
            continue;
        }

        let row = match parse_row(row) {
            Ok(row) => row,
            Err(reason) => {
                flush(&mut current, &mut detections);
                detections.push(Detection::Malformed { reason });
                continue;
            }
        };

        match row.level {
            LINE_LEVEL => {
                flush(&mut current, &mut detections);
                current = Some(LineBuilder::new(row.key, row.bbox));
            }
            WORD_LEVEL => {
                if current.as_ref().map_or(true, |line| line.key != row.key) {
                    flush(&mut current, &mut detections);
                    current = Some(LineBuilder::new(row.key, row.bbox));
                }
                if let Some(line) = current.as_mut() {
                    line.push_word(row.text, row.conf);
                }
            }
            _ => flush(&mut current, &mut detections),
        }
    }

    flush(&mut current, &mut detections);
    detections
}
