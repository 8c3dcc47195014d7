pub mod extract;
pub mod ocr;
pub mod pdf;
pub mod preprocess;
pub mod probe;
pub mod render;

use std::path::Path;

use crate::error::ProcessError;

pub use extract::{Extraction, ExtractionStatus, TextExtractor};
pub use ocr::TesseractOcr;
pub use pdf::LopdfText;
pub use probe::{ProbeError, ProtectionProber};
pub use render::PopplerRenderer;

/// Reads the embedded text layer of a PDF, one entry per page.
pub trait TextBackend: Send + Sync {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ProcessError>;
}

/// Rasterizes PDF pages for OCR.
pub trait PageRenderer: Send + Sync {
    fn page_count(&self, path: &Path) -> Result<u32, ProcessError>;

    /// Renders 1-based `page` at `dpi` and returns PNG bytes.
    fn render_page(&self, path: &Path, page: u32, dpi: u32) -> Result<Vec<u8>, ProcessError>;
}

/// Recognizes text in a preprocessed page image.
pub trait OcrBackend: Send + Sync {
    fn is_available(&self) -> bool;
    fn recognize(&self, png: &[u8]) -> Result<String, ProcessError>;
}
