use std::path::PathBuf;

use crate::config::{AppConfig, ExtractionConfig, HarvestConfig, OcrConfig};

pub struct PipelineConfig {
    pub cache_directory: PathBuf,
    pub review_directory: PathBuf,
    pub custom_patterns_path: PathBuf,
    pub ocr: OcrConfig,
    pub extraction: ExtractionConfig,
    pub harvest: HarvestConfig,
}

impl PipelineConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cache_directory: config.directories.cache.clone(),
            review_directory: config.directories.review.clone(),
            custom_patterns_path: config.directories.custom_patterns.clone(),
            ocr: config.ocr.clone(),
            extraction: config.extraction.clone(),
            harvest: config.harvest.clone(),
        }
    }
}
