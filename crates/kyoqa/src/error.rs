use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KyoqaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Pattern store error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures raised by the text, rendering and OCR backends.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to render page {page}: {reason}")]
    Render { page: u32, reason: String },

    #[error("Failed to preprocess image: {0}")]
    ImageProcessing(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("OCR backend unavailable: {0}")]
    OcrUnavailable(String),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to create cache directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write cache entry '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Failed to serialize pattern set: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write pattern file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Spreadsheet-stage failures. Any of these aborts report generation.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No data to generate")]
    NoResults,

    #[error("Template file not found: {0}")]
    TemplateMissing(PathBuf),

    #[error("File '{path}' is locked or not accessible. Close it and try again ({source})")]
    TemplateLocked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save report to '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read workbook '{path}': {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Workbook '{0}' has no worksheets")]
    NoWorksheet(PathBuf),

    #[error("Required column '{0}' not found in template header row")]
    MissingColumn(String),

    #[error("Invalid status palette: {0}")]
    InvalidPalette(String),

    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

/// Batch-level failures. These end a run with a terminal `Error` event.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn batch worker: {0}")]
    SpawnFailed(String),

    #[error("No PDF files found in {0}")]
    NoInputFiles(String),

    #[error("Failed to read input directory '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Batch worker panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, KyoqaError>;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
