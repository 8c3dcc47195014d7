use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ProcessError;
use crate::processor::PageRenderer;

/// Page rasterizer shelling out to poppler-utils (`pdftoppm`, `pdfinfo`).
#[derive(Debug, Clone)]
pub struct PopplerRenderer {
    scratch_dir: PathBuf,
}

impl PopplerRenderer {
    pub fn new() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: dir.into(),
        }
    }
}

impl Default for PopplerRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for PopplerRenderer {
    /// Uses lopdf when it can parse the file, `pdfinfo` otherwise.
    fn page_count(&self, path: &Path) -> Result<u32, ProcessError> {
        match lopdf::Document::load(path) {
            Ok(doc) => Ok(doc.get_pages().len() as u32),
            Err(e) => {
                tracing::debug!(error = %e, "lopdf could not count pages, asking pdfinfo");
                count_pages_with_pdfinfo(path)
            }
        }
    }

    fn render_page(&self, path: &Path, page: u32, dpi: u32) -> Result<Vec<u8>, ProcessError> {
        let _span = tracing::info_span!("processor.render", page).entered();

        let output_prefix = self
            .scratch_dir
            .join(format!("kyoqa_page_{}", uuid::Uuid::new_v4()));

        let output = Command::new("pdftoppm")
            .arg("-png")
            .args(["-r", &dpi.to_string()])
            .args(["-f", &page.to_string(), "-l", &page.to_string()])
            .arg(path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| ProcessError::Render {
                page,
                reason: format!(
                    "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                    e
                ),
            })?;

        if !output.status.success() {
            return Err(ProcessError::Render {
                page,
                reason: format!("pdftoppm failed: {}", String::from_utf8_lossy(&output.stderr)),
            });
        }

        // pdftoppm pads the page suffix to the width of the page count
        let prefix = output_prefix.display();
        let candidates = [
            format!("{}-{}.png", prefix, page),
            format!("{}-{:02}.png", prefix, page),
            format!("{}-{:03}.png", prefix, page),
            format!("{}-{:04}.png", prefix, page),
        ];
        let image_path = candidates
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .ok_or_else(|| ProcessError::Render {
                page,
                reason: "Failed to find rendered page image".to_string(),
            })?;

        let image_data = std::fs::read(&image_path).map_err(|e| ProcessError::Render {
            page,
            reason: format!("Failed to read rendered image: {}", e),
        })?;
        let _ = std::fs::remove_file(&image_path);

        Ok(image_data)
    }
}

fn count_pages_with_pdfinfo(path: &Path) -> Result<u32, ProcessError> {
    let output = Command::new("pdfinfo").arg(path).output().map_err(|e| {
        ProcessError::PdfProcessing(format!(
            "Failed to run pdfinfo: {}. Make sure poppler-utils is installed.",
            e
        ))
    })?;

    if !output.status.success() {
        return Err(ProcessError::PdfProcessing(format!(
            "pdfinfo failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    parse_pdfinfo_pages(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
        ProcessError::PdfProcessing("pdfinfo did not report a page count".to_string())
    })
}

fn parse_pdfinfo_pages(stdout: &str) -> Option<u32> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("Pages:"))
        .find_map(|count| count.trim().parse().ok())
}
