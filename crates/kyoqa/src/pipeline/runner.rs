use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info_span, warn};

use crate::cache::ResultCache;
use crate::document::{DocumentResult, ProcessingStatus, ReviewInfo};
use crate::error::panic_message;
use crate::harvest::Harvester;
use crate::patterns::PatternStore;
use crate::processor::{LopdfText, PopplerRenderer, TesseractOcr, TextExtractor};
use crate::sanitize;
use crate::worker::job::DocumentJob;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::progress::{Phase, ProgressEvent, ProgressReporter};

/// Reason recorded on documents whose text yielded no model identifiers.
pub const NO_MODELS_REASON: &str = "No model patterns were found in the document.";

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    extractor: TextExtractor,
    harvester: Harvester,
    cache: ResultCache,
}

impl Pipeline {
    /// Production constructor: lopdf text layer, poppler rendering and
    /// Tesseract OCR.
    pub fn from_config(config: Arc<PipelineConfig>) -> Self {
        let ocr = TesseractOcr::new(&config.ocr.languages, config.ocr.page_segmentation_mode);
        let extractor = TextExtractor::new(
            config.ocr.clone(),
            config.extraction.clone(),
            Box::new(LopdfText),
            Box::new(PopplerRenderer::new()),
            Box::new(ocr),
        );
        let harvester = Harvester::new(
            config.harvest.clone(),
            PatternStore::new(&config.custom_patterns_path),
        );
        let cache = ResultCache::new(&config.cache_directory);

        Self {
            config,
            extractor,
            harvester,
            cache,
        }
    }

    /// Injects specific stages, used to swap in fake backends.
    pub fn new(
        config: Arc<PipelineConfig>,
        extractor: TextExtractor,
        harvester: Harvester,
        cache: ResultCache,
    ) -> Self {
        Self {
            config,
            extractor,
            harvester,
            cache,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Processes one document to a final result. Never fails: every error and
    /// panic is folded into the returned record. The result is always cached
    /// and a `FileComplete` event is always the last event emitted.
    pub fn process(&self, job: &DocumentJob, progress: &dyn ProgressReporter) -> DocumentResult {
        let filename = job.file_name();
        let _pipeline_span = info_span!("pipeline",
            job_id = %job.id,
            rerun = job.is_rerun,
            filename = %sanitize::redact_path(&job.source_path),
        )
        .entered();

        progress.report(ProgressEvent::info(format!("Starting: {}", filename)));

        let fingerprint = ResultCache::fingerprint(&job.source_path);
        if !job.ignore_cache {
            if let Some(cached) = self.cache.get(&fingerprint) {
                debug!(fingerprint = %fingerprint, "Cache hit");
                progress.report(ProgressEvent::info(format!("Cache hit for: {}", filename)));
                if let Some(review) = &cached.review_info {
                    progress.report(ProgressEvent::ReviewItem(review.clone()));
                }
                if cached.ocr_used {
                    progress.report(ProgressEvent::OcrUsed);
                }
                progress.report(ProgressEvent::FileComplete {
                    status: cached.status,
                });
                return cached;
            }
        }

        let mut ctx = PipelineContext::new(job.clone());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_stages(&mut ctx, &filename, progress)
        }));
        let mut result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(error = %message, "Pipeline panicked");
                progress.report(ProgressEvent::error(format!(
                    "CRITICAL ERROR on {}: {}",
                    filename, message
                )));
                DocumentResult::failure(
                    &filename,
                    ProcessingStatus::Failed,
                    format!("A critical error occurred: {}", message),
                    ctx.ocr_used(),
                )
            }
        };
        result.processing_time_seconds = ctx.started.elapsed().as_secs_f64();
        debug!(
            status = %result.status,
            models = ctx.harvested.as_ref().map(|h| h.models.len()).unwrap_or(0),
            flagged = ctx.review.is_some(),
            elapsed = result.processing_time_seconds,
            "Document processed"
        );

        if let Err(e) = self.cache.put(&fingerprint, &result) {
            warn!(error = %e, "Failed to write cache entry");
            progress.report(ProgressEvent::warning(format!(
                "Failed to write cache for {}: {}",
                filename, e
            )));
        }

        progress.report(ProgressEvent::FileComplete {
            status: result.status,
        });
        result
    }

    fn run_stages(
        &self,
        ctx: &mut PipelineContext,
        filename: &str,
        progress: &dyn ProgressReporter,
    ) -> DocumentResult {
        // Step 1: Probe and extract text
        {
            let _step = info_span!("extract_text").entered();
            progress.report(ProgressEvent::status(
                Phase::Processing,
                format!("Processing: {}", filename),
            ));
            ctx.extraction = Some(self.extractor.extract(&ctx.job.source_path, progress));
        }

        let Some(extraction) = ctx.extraction.as_ref() else {
            return DocumentResult::failure(
                filename,
                ProcessingStatus::Failed,
                "Extraction produced no outcome",
                false,
            );
        };
        if !extraction.is_success() {
            let status = extraction.status.document_status();
            progress.report(ProgressEvent::warning(format!(
                "{}: {} - {}",
                filename, status, extraction.failure_reason
            )));
            return DocumentResult::failure(
                filename,
                status,
                extraction.failure_reason.clone(),
                extraction.ocr_used,
            );
        }

        // Step 2: Harvest fields
        let fields = {
            let _step = info_span!("harvest").entered();
            progress.report(ProgressEvent::status(
                Phase::Harvesting,
                format!("Extracting data: {}", filename),
            ));
            self.harvester.harvest(&extraction.text, filename)
        };
        ctx.harvested = Some(fields.clone());

        let tracking = fields.tracking_display();
        if fields.has_models() {
            return DocumentResult::success(
                filename,
                fields.models_display(),
                fields.author,
                tracking,
                extraction.ocr_used,
            );
        }

        // Step 3: Flag for review
        let _step = info_span!("flag_for_review").entered();
        let text_path = match self.write_review_text(&ctx.job, &extraction.text) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Failed to write review text");
                return DocumentResult::failure(
                    filename,
                    ProcessingStatus::Failed,
                    format!("Failed to write review text: {}", e),
                    extraction.ocr_used,
                );
            }
        };
        let review = ReviewInfo {
            file_name: filename.to_string(),
            reason: NO_MODELS_REASON.to_string(),
            extracted_text_path: text_path,
            source_pdf_path: absolute(&ctx.job.source_path),
        };
        progress.report(ProgressEvent::ReviewItem(review.clone()));
        let ocr_used = extraction.ocr_used;
        ctx.review = Some(review.clone());

        DocumentResult::needs_review(
            filename,
            fields.author,
            tracking,
            ocr_used,
            review,
        )
    }

    fn write_review_text(&self, job: &DocumentJob, text: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.config.review_directory)?;
        let path = self
            .config
            .review_directory
            .join(format!("{}.txt", job.file_stem()));
        std::fs::write(&path, text)?;
        Ok(absolute(&path))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
