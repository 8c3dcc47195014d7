pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod harvest;
pub mod patterns;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod sanitize;
pub mod worker;

pub use cache::ResultCache;
pub use config::{load_config, AppConfig};
pub use document::{DocumentResult, ProcessingStatus, ReviewInfo, NOT_FOUND};
pub use error::{
    CacheError, ConfigError, KyoqaError, PatternError, ProcessError, ReportError, Result,
    WorkerError,
};
pub use harvest::{HarvestedFields, Harvester};
pub use patterns::{PatternKind, PatternSet, PatternStore};
pub use pipeline::{Pipeline, PipelineConfig, PipelineContext, ProgressEvent, ProgressReporter};
pub use worker::{BatchControl, BatchEvent, BatchRequest, BatchRunner, InputSpec, JobOutcome};
