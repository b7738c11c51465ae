use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{OcrEngine, OcrPipeline};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: OcrPipeline,
}

impl AppState {
    /// Build request state around the single engine created at startup.
    pub fn new(config: Config, engine: Arc<dyn OcrEngine>) -> Self {
        let pipeline = OcrPipeline::new(engine, config.ocr.angle_classification);

        Self {
            config: Arc::new(config),
            pipeline,
        }
    }
}
