//! Text extraction stage: protection probe, direct text layer, OCR fallback.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::config::{ExtractionConfig, OcrConfig};
use crate::document::ProcessingStatus;
use crate::error::{panic_message, ProcessError};
use crate::pipeline::progress::{Phase, ProgressEvent, ProgressReporter};
use crate::processor::pdf::is_usable_direct_text;
use crate::processor::preprocess::preprocess_page;
use crate::processor::probe::{classify_load_error, ProbeError, ProtectionProber};
use crate::processor::{OcrBackend, PageRenderer, TextBackend};
use crate::sanitize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    Success,
    Protected,
    Corrupted,
    OcrFailed,
    NoText,
    Error,
}

impl ExtractionStatus {
    /// Document status this outcome maps to when it ends processing.
    pub fn document_status(&self) -> ProcessingStatus {
        match self {
            ExtractionStatus::Success => ProcessingStatus::Success,
            ExtractionStatus::Protected => ProcessingStatus::Protected,
            ExtractionStatus::Corrupted => ProcessingStatus::Corrupted,
            ExtractionStatus::OcrFailed => ProcessingStatus::OcrFailed,
            ExtractionStatus::NoText => ProcessingStatus::NoTextFound,
            ExtractionStatus::Error => ProcessingStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub status: ExtractionStatus,
    pub failure_reason: String,
    pub text: String,
    pub ocr_used: bool,
}

impl Extraction {
    fn success(text: String, ocr_used: bool) -> Self {
        Self {
            status: ExtractionStatus::Success,
            failure_reason: String::new(),
            text,
            ocr_used,
        }
    }

    fn failed(status: ExtractionStatus, reason: impl Into<String>, ocr_used: bool) -> Self {
        Self {
            status,
            failure_reason: reason.into(),
            text: String::new(),
            ocr_used,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }
}

impl From<ProbeError> for Extraction {
    fn from(err: ProbeError) -> Self {
        let status = match err {
            ProbeError::Protected(_) => ExtractionStatus::Protected,
            ProbeError::Corrupted(_) => ExtractionStatus::Corrupted,
        };
        Extraction::failed(status, err.to_string(), false)
    }
}

pub struct TextExtractor {
    ocr_config: OcrConfig,
    thresholds: ExtractionConfig,
    prober: ProtectionProber,
    text: Box<dyn TextBackend>,
    renderer: Box<dyn PageRenderer>,
    ocr: Box<dyn OcrBackend>,
}

impl TextExtractor {
    pub fn new(
        ocr_config: OcrConfig,
        thresholds: ExtractionConfig,
        text: Box<dyn TextBackend>,
        renderer: Box<dyn PageRenderer>,
        ocr: Box<dyn OcrBackend>,
    ) -> Self {
        Self {
            ocr_config,
            thresholds,
            prober: ProtectionProber,
            text,
            renderer,
            ocr,
        }
    }

    /// Runs the whole stage. Never fails and never panics: every outcome,
    /// including a panic inside a backend, is reported through the returned
    /// [`Extraction`].
    pub fn extract(&self, path: &Path, progress: &dyn ProgressReporter) -> Extraction {
        let filename = sanitize::redact_path(path);
        let _span = tracing::info_span!("extract", filename = %filename).entered();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.extract_inner(path, &filename, progress)
        }));
        match outcome {
            Ok(extraction) => extraction,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(error = %message, "Extraction panicked");
                Extraction::failed(
                    ExtractionStatus::Error,
                    format!("Unexpected processing error: {}", message),
                    false,
                )
            }
        }
    }

    fn extract_inner(
        &self,
        path: &Path,
        filename: &str,
        progress: &dyn ProgressReporter,
    ) -> Extraction {
        if let Err(verdict) = self.prober.probe(path) {
            tracing::warn!(verdict = %verdict, "Document rejected by probe");
            return verdict.into();
        }

        match self.text.page_texts(path) {
            Ok(pages) => {
                let text = pages.join("\n");
                if is_usable_direct_text(&text, self.thresholds.min_direct_text_chars) {
                    tracing::info!(
                        chars = text.chars().count(),
                        "Direct text extraction succeeded"
                    );
                    return Extraction::success(text, false);
                }
                tracing::debug!("Direct text too short, falling back to OCR");
            }
            Err(e @ ProcessError::ReadDocument { .. }) => {
                return Extraction::failed(ExtractionStatus::Error, e.to_string(), false);
            }
            Err(e) => {
                if let Some(verdict) = classify_load_error(&e.to_string()) {
                    return verdict.into();
                }
                tracing::warn!(error = %e, "Direct text extraction failed");
            }
        }

        if !self.ocr_config.enabled {
            return Extraction::failed(
                ExtractionStatus::OcrFailed,
                "No text found in PDF and OCR is disabled",
                false,
            );
        }
        if !self.ocr.is_available() {
            return Extraction::failed(
                ExtractionStatus::OcrFailed,
                "No text found in PDF and Tesseract OCR is not available",
                false,
            );
        }

        progress.report(ProgressEvent::status(Phase::Ocr, format!("OCR: {}", filename)));
        progress.report(ProgressEvent::OcrUsed);
        self.ocr_document(path)
    }

    fn ocr_document(&self, path: &Path) -> Extraction {
        let _span = tracing::info_span!("ocr_fallback").entered();

        let page_count = match self.renderer.page_count(path) {
            Ok(count) => count,
            Err(e) => {
                return Extraction::failed(
                    ExtractionStatus::OcrFailed,
                    format!("OCR processing failed: {}", e),
                    true,
                )
            }
        };

        let mut texts = Vec::new();
        let mut failed_pages = 0u32;
        for page in 1..=page_count {
            match self.ocr_page(path, page) {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        texts.push(text.to_string());
                    }
                }
                Err(e) => {
                    failed_pages += 1;
                    tracing::warn!(page, error = %e, "OCR failed for page");
                }
            }
        }

        if page_count == 0 || failed_pages == page_count {
            return Extraction::failed(
                ExtractionStatus::OcrFailed,
                format!("OCR failed on all {} page(s)", page_count),
                true,
            );
        }

        let text = texts.join("\n\n");
        if text.trim().chars().count() < self.thresholds.min_ocr_text_chars {
            return Extraction::failed(
                ExtractionStatus::NoText,
                "OCR completed but no readable text was found",
                true,
            );
        }

        tracing::info!(
            pages = page_count,
            chars = text.chars().count(),
            "OCR extraction succeeded"
        );
        Extraction::success(text, true)
    }

    fn ocr_page(&self, path: &Path, page: u32) -> Result<String, ProcessError> {
        let rendered = self.renderer.render_page(path, page, self.ocr_config.dpi)?;
        let cleaned = preprocess_page(&rendered, &self.ocr_config)?;
        self.ocr.recognize(&cleaned)
    }
}
