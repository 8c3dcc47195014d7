use std::sync::{Arc, OnceLock};

use leptess::{LepTess, Variable};

use crate::error::ProcessError;
use crate::processor::OcrBackend;

/// Tesseract OCR through `leptess`.
#[derive(Clone)]
pub struct TesseractOcr {
    inner: Arc<TesseractOcrInner>,
}

struct TesseractOcrInner {
    languages: String,
    page_segmentation_mode: u32,
    available: OnceLock<bool>,
}

impl TesseractOcr {
    pub fn new(languages: &[String], page_segmentation_mode: u32) -> Self {
        let lang_str = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        Self {
            inner: Arc::new(TesseractOcrInner {
                languages: lang_str,
                page_segmentation_mode,
                available: OnceLock::new(),
            }),
        }
    }

    pub fn languages(&self) -> &str {
        &self.inner.languages
    }

    fn engine(&self) -> Result<LepTess, ProcessError> {
        let mut lt = LepTess::new(None, &self.inner.languages).map_err(|e| {
            ProcessError::OcrUnavailable(format!("Failed to initialize Tesseract: {}", e))
        })?;
        lt.set_variable(
            Variable::TesseditPagesegMode,
            &self.inner.page_segmentation_mode.to_string(),
        )
        .map_err(|e| ProcessError::OcrFailed(format!("Failed to set page segmentation: {}", e)))?;
        Ok(lt)
    }
}

impl OcrBackend for TesseractOcr {
    /// Probes Tesseract once and remembers the answer.
    fn is_available(&self) -> bool {
        *self.inner.available.get_or_init(|| match self.engine() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Tesseract OCR is not available");
                false
            }
        })
    }

    fn recognize(&self, png: &[u8]) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.ocr").entered();

        let mut lt = self.engine()?;

        lt.set_image_from_mem(png)
            .map_err(|e| ProcessError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;

        lt.get_utf8_text()
            .map_err(|e| ProcessError::OcrFailed(format!("OCR failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_joined() {
        let ocr = TesseractOcr::new(&["eng".to_string(), "jpn".to_string()], 6);
        assert_eq!(ocr.languages(), "eng+jpn");
    }

    #[test]
    fn test_default_language() {
        let ocr = TesseractOcr::new(&[], 6);
        assert_eq!(ocr.languages(), "eng");
    }

    #[test]
    fn test_clone_shares_settings() {
        let ocr = TesseractOcr::new(&["fra".to_string()], 3);
        let cloned = ocr.clone();
        assert_eq!(cloned.inner.page_segmentation_mode, 3);
        assert!(Arc::ptr_eq(&ocr.inner, &cloned.inner));
    }

    #[test]
    fn test_invalid_image_data_error() {
        let ocr = TesseractOcr::new(&["eng".to_string()], 6);
        if !ocr.is_available() {
            return;
        }
        assert!(ocr.recognize(b"not valid image data").is_err());
    }
}
