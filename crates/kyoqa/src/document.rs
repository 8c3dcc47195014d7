//! The per-document result record shared by the pipeline, cache, batch
//! runner and spreadsheet merger.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Sentinel written to the models field when no identifier was harvested.
pub const NOT_FOUND: &str = "Not Found";

/// Final classification of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingStatus {
    #[serde(rename = "Success")]
    Success,
    #[serde(rename = "Needs Review")]
    NeedsReview,
    #[serde(rename = "Protected")]
    Protected,
    #[serde(rename = "Corrupted")]
    Corrupted,
    #[serde(rename = "OCR Failed")]
    OcrFailed,
    #[serde(rename = "No Text Found")]
    NoTextFound,
    #[serde(rename = "Failed")]
    Failed,
}

impl ProcessingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingStatus::Success => "Success",
            ProcessingStatus::NeedsReview => "Needs Review",
            ProcessingStatus::Protected => "Protected",
            ProcessingStatus::Corrupted => "Corrupted",
            ProcessingStatus::OcrFailed => "OCR Failed",
            ProcessingStatus::NoTextFound => "No Text Found",
            ProcessingStatus::Failed => "Failed",
        }
    }

    /// Hard failures, as opposed to `Success` and the soft `NeedsReview`.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            ProcessingStatus::Success | ProcessingStatus::NeedsReview
        )
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a reviewer needs to inspect a low-confidence document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInfo {
    pub file_name: String,
    pub reason: String,
    pub extracted_text_path: PathBuf,
    pub source_pdf_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub file_name: String,
    pub models: String,
    pub author: String,
    pub tracking_numbers: String,
    pub status: ProcessingStatus,
    pub failure_reason: String,
    pub ocr_used: bool,
    pub review_info: Option<ReviewInfo>,
    pub processing_time_seconds: f64,
}

impl DocumentResult {
    pub fn success(
        file_name: &str,
        models: String,
        author: String,
        tracking_numbers: String,
        ocr_used: bool,
    ) -> Self {
        Self {
            file_name: file_name.to_string(),
            models,
            author,
            tracking_numbers,
            status: ProcessingStatus::Success,
            failure_reason: String::new(),
            ocr_used,
            review_info: None,
            processing_time_seconds: 0.0,
        }
    }

    pub fn needs_review(
        file_name: &str,
        author: String,
        tracking_numbers: String,
        ocr_used: bool,
        review: ReviewInfo,
    ) -> Self {
        Self {
            file_name: file_name.to_string(),
            models: NOT_FOUND.to_string(),
            author,
            tracking_numbers,
            status: ProcessingStatus::NeedsReview,
            failure_reason: review.reason.clone(),
            ocr_used,
            review_info: Some(review),
            processing_time_seconds: 0.0,
        }
    }

    /// Builds a terminal failure record. An empty reason is replaced with the
    /// status label so that a failure never carries a blank explanation.
    pub fn failure(
        file_name: &str,
        status: ProcessingStatus,
        reason: impl Into<String>,
        ocr_used: bool,
    ) -> Self {
        debug_assert!(status.is_failure());
        let mut reason = reason.into();
        if reason.trim().is_empty() {
            reason = format!("{} (no further detail available)", status.label());
        }
        Self {
            file_name: file_name.to_string(),
            models: format!("Error: {}", status.label()),
            author: String::new(),
            tracking_numbers: String::new(),
            status,
            failure_reason: reason,
            ocr_used,
            review_info: None,
            processing_time_seconds: 0.0,
        }
    }

    /// File name without its extension, used as the merge key.
    pub fn file_stem(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_name.clone())
    }

    /// Checks the record invariants: success iff models were found and no
    /// failure reason is set, and review info present iff `NeedsReview`.
    pub fn is_consistent(&self) -> bool {
        let success_ok = (self.status == ProcessingStatus::Success)
            == (self.models != NOT_FOUND && self.failure_reason.is_empty());
        let review_ok =
            self.review_info.is_some() == (self.status == ProcessingStatus::NeedsReview);
        success_ok && review_ok
    }
}
