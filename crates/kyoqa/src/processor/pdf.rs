use std::path::Path;

use crate::error::ProcessError;
use crate::processor::TextBackend;

/// Embedded-text backend built on `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfText;

impl TextBackend for LopdfText {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ProcessError> {
        let _span = tracing::info_span!("processor.pdf_text").entered();

        let bytes = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let doc = lopdf::Document::load_mem(&bytes)
            .map_err(|e| ProcessError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for (page_num, _) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::debug!(page = page_num, error = %e, "No text layer on page");
                    pages.push(String::new());
                }
            }
        }

        Ok(pages)
    }
}

/// Marker lopdf emits for CID fonts it cannot decode.
const IDENTITY_H_PATTERN: &str = "?Identity-H Unimplemented?";

/// Text at least this long is checked for garbling.
const MIN_GARBLE_CHECK_CHARS: usize = 50;

/// Below this share of alphanumerics the text is treated as garbled.
const MIN_ALPHANUMERIC_PERCENT: usize = 10;

/// Whether directly extracted text is good enough to skip OCR.
///
/// The text must exceed `min_chars` characters in total once trimmed and
/// stripped of undecodable-font markers, and must not be mostly symbols.
pub fn is_usable_direct_text(text: &str, min_chars: usize) -> bool {
    let cleaned = text.replace(IDENTITY_H_PATTERN, "");
    let trimmed = cleaned.trim();

    let total_chars = trimmed.chars().count();
    if total_chars <= min_chars {
        return false;
    }

    let alphanumeric_chars = trimmed.chars().filter(|c| c.is_alphanumeric()).count();
    if total_chars > MIN_GARBLE_CHECK_CHARS
        && alphanumeric_chars * 100 < total_chars * MIN_ALPHANUMERIC_PERCENT
    {
        return false;
    }

    true
}
