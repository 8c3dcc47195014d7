//! Per-document processing: extraction, harvesting, review flagging and
//! result caching, driven one job at a time.

mod config;
mod context;
pub mod progress;
mod runner;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use progress::{LogLevel, NoopProgress, Phase, ProgressEvent, ProgressReporter};
pub use runner::{Pipeline, NO_MODELS_REASON};
