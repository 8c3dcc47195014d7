use std::path::PathBuf;

use crossbeam_channel::Sender;
use serde::Serialize;

use crate::document::{DocumentResult, ProcessingStatus, ReviewInfo};
use crate::pipeline::{LogLevel, Phase, ProgressEvent, ProgressReporter};

use super::state::RunSummary;

/// Everything a batch reports to its consumer, in production order.
/// Exactly one terminal event (`Complete`, `Cancelled` or `Error`) ends
/// every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BatchEvent {
    Log {
        level: LogLevel,
        message: String,
    },
    Status {
        phase: Phase,
        message: String,
    },
    Progress {
        current: usize,
        total: usize,
    },
    ReviewItem(ReviewInfo),
    OcrUsed,
    FileComplete {
        status: ProcessingStatus,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        output_path: PathBuf,
        results: Vec<DocumentResult>,
        summary: RunSummary,
    },
    Cancelled {
        results: Vec<DocumentResult>,
        summary: RunSummary,
    },
    Error {
        message: String,
    },
}

impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchEvent::Complete { .. } | BatchEvent::Cancelled { .. } | BatchEvent::Error { .. }
        )
    }
}

impl From<ProgressEvent> for BatchEvent {
    fn from(event: ProgressEvent) -> Self {
        match event {
            ProgressEvent::Log { level, message } => BatchEvent::Log { level, message },
            ProgressEvent::Status { phase, message } => BatchEvent::Status { phase, message },
            ProgressEvent::ReviewItem(review) => BatchEvent::ReviewItem(review),
            ProgressEvent::OcrUsed => BatchEvent::OcrUsed,
            ProgressEvent::FileComplete { status } => BatchEvent::FileComplete { status },
        }
    }
}

/// Consumer side of a batch run.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: BatchEvent);
}

impl EventSink for Sender<BatchEvent> {
    fn emit(&self, event: BatchEvent) {
        if self.send(event).is_err() {
            log::debug!("Batch event receiver dropped");
        }
    }
}

/// Forwards per-document progress onto a batch sink.
pub(crate) struct SinkProgress<'a> {
    sink: &'a dyn EventSink,
}

impl<'a> SinkProgress<'a> {
    pub(crate) fn new(sink: &'a dyn EventSink) -> Self {
        Self { sink }
    }
}

impl ProgressReporter for SinkProgress<'_> {
    fn report(&self, event: ProgressEvent) {
        self.sink.emit(event.into());
    }
}
