use std::time::Instant;

use serde::Serialize;

use crate::document::{DocumentResult, ProcessingStatus, ReviewInfo};

/// Counters reported with every terminal batch event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub pass: usize,
    pub fail: usize,
    pub review: usize,
    pub ocr: usize,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn message(&self) -> String {
        format!(
            "Pass: {}\nFail: {}\nReview: {}",
            self.pass, self.fail, self.review
        )
    }
}

/// Transient bookkeeping for one batch run.
#[derive(Debug)]
pub struct BatchRunState {
    pub total_files: usize,
    started: Instant,
    results: Vec<DocumentResult>,
    review_items: Vec<ReviewInfo>,
    summary: RunSummary,
}

impl BatchRunState {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            started: Instant::now(),
            results: Vec::with_capacity(total_files),
            review_items: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn processed_count(&self) -> usize {
        self.results.len()
    }

    pub fn record(&mut self, result: DocumentResult) {
        match result.status {
            ProcessingStatus::Success => self.summary.pass += 1,
            ProcessingStatus::NeedsReview => self.summary.review += 1,
            _ => self.summary.fail += 1,
        }
        if result.ocr_used {
            self.summary.ocr += 1;
        }
        if let Some(review) = &result.review_info {
            self.review_items.push(review.clone());
        }
        self.results.push(result);
    }

    pub fn results(&self) -> &[DocumentResult] {
        &self.results
    }

    pub fn review_items(&self) -> &[ReviewInfo] {
        &self.review_items
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
            ..self.summary.clone()
        }
    }

    pub fn into_results(self) -> (Vec<DocumentResult>, RunSummary) {
        let summary = self.summary();
        (self.results, summary)
    }
}
