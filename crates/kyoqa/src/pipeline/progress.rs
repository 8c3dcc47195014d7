use serde::Serialize;

use crate::document::{ProcessingStatus, ReviewInfo};

/// Coarse activity indicator shown next to status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Processing,
    Ocr,
    Harvesting,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Events emitted while a single document moves through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Log { level: LogLevel, message: String },
    Status { phase: Phase, message: String },
    ReviewItem(ReviewInfo),
    OcrUsed,
    FileComplete { status: ProcessingStatus },
}

impl ProgressEvent {
    pub fn info(message: impl Into<String>) -> Self {
        ProgressEvent::Log {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        ProgressEvent::Log {
            level: LogLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ProgressEvent::Log {
            level: LogLevel::Error,
            message: message.into(),
        }
    }

    pub fn status(phase: Phase, message: impl Into<String>) -> Self {
        ProgressEvent::Status {
            phase,
            message: message.into(),
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}
