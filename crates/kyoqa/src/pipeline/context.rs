use std::time::Instant;

use crate::document::ReviewInfo;
use crate::harvest::HarvestedFields;
use crate::processor::Extraction;
use crate::worker::job::DocumentJob;

pub struct PipelineContext {
    // Input
    pub job: DocumentJob,
    pub started: Instant,

    // Extraction stage result
    pub extraction: Option<Extraction>,

    // Harvest stage result, only when extraction succeeded
    pub harvested: Option<HarvestedFields>,

    // Set when the document is flagged for review
    pub review: Option<ReviewInfo>,
}

impl PipelineContext {
    pub fn new(job: DocumentJob) -> Self {
        Self {
            job,
            started: Instant::now(),
            extraction: None,
            harvested: None,
            review: None,
        }
    }

    pub fn ocr_used(&self) -> bool {
        self.extraction.as_ref().map(|e| e.ocr_used).unwrap_or(false)
    }
}
