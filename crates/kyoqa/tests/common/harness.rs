//! Isolated environment for pipeline and batch tests.
//!
//! The real lopdf text backend is used; page rendering and OCR are fakes so
//! the tests never need poppler or Tesseract installed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use kyoqa::config::AppConfig;
use kyoqa::error::ProcessError;
use kyoqa::pipeline::{Pipeline, PipelineConfig, ProgressEvent, ProgressReporter};
use kyoqa::processor::{LopdfText, OcrBackend, PageRenderer, TextBackend, TextExtractor};
use kyoqa::worker::{BatchControl, BatchEvent, BatchRunner, EventSink};
use kyoqa::{Harvester, PatternStore, ResultCache};

use super::builders::white_png;

/// Counts calls into the real lopdf backend.
pub struct CountingText {
    inner: LopdfText,
    calls: Arc<AtomicUsize>,
}

impl TextBackend for CountingText {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ProcessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.page_texts(path)
    }
}

/// Renders every page as a white square.
pub struct WhitePages;

impl PageRenderer for WhitePages {
    fn page_count(&self, path: &Path) -> Result<u32, ProcessError> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| ProcessError::PdfProcessing(e.to_string()))?;
        Ok(doc.get_pages().len() as u32)
    }

    fn render_page(&self, _path: &Path, _page: u32, _dpi: u32) -> Result<Vec<u8>, ProcessError> {
        Ok(white_png())
    }
}

/// OCR stand-in: either unavailable, or returns fixed text for every page.
pub struct FakeOcr {
    text: Option<String>,
}

impl OcrBackend for FakeOcr {
    fn is_available(&self) -> bool {
        self.text.is_some()
    }

    fn recognize(&self, _png: &[u8]) -> Result<String, ProcessError> {
        self.text
            .clone()
            .ok_or_else(|| ProcessError::OcrUnavailable("not installed".to_string()))
    }
}

pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub config: AppConfig,
    pub text_calls: Arc<AtomicUsize>,
    ocr_text: Option<String>,
}

impl TestHarness {
    /// OCR unavailable.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// OCR available and reading `text` from every page.
    pub fn with_ocr_text(text: &str) -> Self {
        Self::build(Some(text.to_string()))
    }

    fn build(ocr_text: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let input_dir = base.join("input");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");

        let mut config = AppConfig::default();
        config.directories.output = base.join("output");
        config.directories.cache = base.join("cache");
        config.directories.review = base.join("review");
        config.directories.custom_patterns = base.join("custom_patterns.json");

        Self {
            temp_dir,
            input_dir,
            config,
            text_calls: Arc::new(AtomicUsize::new(0)),
            ocr_text,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input(&self, name: &str) -> PathBuf {
        self.input_dir.join(name)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn pattern_store(&self) -> PatternStore {
        PatternStore::new(&self.config.directories.custom_patterns)
    }

    pub fn cache(&self) -> ResultCache {
        ResultCache::new(&self.config.directories.cache)
    }

    pub fn pipeline(&self) -> Pipeline {
        let config = Arc::new(PipelineConfig::from_config(&self.config));
        let extractor = TextExtractor::new(
            config.ocr.clone(),
            config.extraction.clone(),
            Box::new(CountingText {
                inner: LopdfText,
                calls: Arc::clone(&self.text_calls),
            }),
            Box::new(WhitePages),
            Box::new(FakeOcr {
                text: self.ocr_text.clone(),
            }),
        );
        let harvester = Harvester::new(config.harvest.clone(), self.pattern_store());
        let cache = ResultCache::new(&config.cache_directory);
        Pipeline::new(config, extractor, harvester, cache)
    }

    pub fn runner(&self) -> BatchRunner {
        BatchRunner::new(self.config.clone(), self.pipeline())
    }
}

/// Collects per-document progress events.
#[derive(Default)]
pub struct RecordingProgress(Mutex<Vec<ProgressEvent>>);

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.0.lock().unwrap().push(event);
    }
}

/// Collects batch events, optionally cancelling after N completed files.
pub struct RecordingSink {
    events: Mutex<Vec<BatchEvent>>,
    completed: AtomicUsize,
    cancel_after: Option<(usize, Arc<BatchControl>)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    pub fn cancelling_after(files: usize, control: Arc<BatchControl>) -> Self {
        Self {
            cancel_after: Some((files, control)),
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn terminal(&self) -> BatchEvent {
        let events = self.events();
        let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminals.len(), 1, "expected exactly one terminal event");
        assert!(events.last().unwrap().is_terminal(), "terminal event must be last");
        terminals[0].clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: BatchEvent) {
        if matches!(event, BatchEvent::FileComplete { .. }) {
            let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((after, control)) = &self.cancel_after {
                if done == *after {
                    control.cancel();
                }
            }
        }
        self.events.lock().unwrap().push(event);
    }
}
