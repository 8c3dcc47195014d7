//! Cheap pre-extraction check for password protection and structural damage.

use std::path::Path;

use thiserror::Error;

/// Why a document cannot be processed at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("File is password protected: {0}")]
    Protected(String),

    #[error("File appears corrupted: {0}")]
    Corrupted(String),
}

const PROTECTION_MARKERS: &[&str] = &["password", "encrypt", "decrypt"];

const CORRUPTION_MARKERS: &[&str] = &[
    "corrupt", "damaged", "header", "xref", "trailer", "startxref", "parse", "offset", "eof",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct ProtectionProber;

impl ProtectionProber {
    /// Classifies `path` as protected, corrupted or clear (`Ok`).
    ///
    /// Read errors are not treated as a verdict; the extraction stage reports
    /// them with full context instead.
    pub fn probe(&self, path: &Path) -> Result<(), ProbeError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Probe could not read file, deferring to extraction");
                return Ok(());
            }
        };

        if !has_pdf_header(&bytes) {
            return Err(ProbeError::Corrupted(
                "File is not a valid PDF document".to_string(),
            ));
        }

        match lopdf::Document::load_mem(&bytes) {
            Ok(doc) => {
                if doc.is_encrypted() || declares_encryption(&bytes) {
                    return Err(ProbeError::Protected(
                        "PDF declares an encryption dictionary".to_string(),
                    ));
                }
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                if let Some(verdict) = classify_load_error(&message) {
                    return Err(verdict);
                }
                if declares_encryption(&bytes) {
                    return Err(ProbeError::Protected(format!(
                        "PDF declares an encryption dictionary ({})",
                        message
                    )));
                }
                tracing::debug!(error = %message, "lopdf could not parse file, deferring to extraction");
                Ok(())
            }
        }
    }
}

/// Maps a backend error message to a verdict, if it names one.
pub fn classify_load_error(message: &str) -> Option<ProbeError> {
    let lower = message.to_lowercase();
    if PROTECTION_MARKERS.iter().any(|m| lower.contains(m)) {
        return Some(ProbeError::Protected(message.to_string()));
    }
    if CORRUPTION_MARKERS.iter().any(|m| lower.contains(m)) {
        return Some(ProbeError::Corrupted(message.to_string()));
    }
    None
}

/// PDF readers accept the header anywhere in the first kilobyte.
fn has_pdf_header(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

fn declares_encryption(bytes: &[u8]) -> bool {
    bytes.windows(8).any(|w| w == b"/Encrypt")
}
