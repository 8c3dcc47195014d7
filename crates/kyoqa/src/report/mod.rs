//! Spreadsheet generation: results are merged into the rows of an xlsx
//! template and written to a new workbook with status fills.

mod merge;
mod palette;
mod template;
mod writer;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, info_span};

use crate::config::SpreadsheetConfig;
use crate::document::DocumentResult;
use crate::error::ReportError;

pub use merge::{description_key, merge, MergedSheet, PROCESSED_PREFIX};
pub use palette::StatusPalette;
pub use template::{read_template, CellValue, Sheet};
pub use writer::{column_width, write_sheet};

/// Merges `results` into the rows of `template` and saves the workbook at
/// `output`. The workbook is staged next to `output` and only moved into
/// place once fully written, so a failed run leaves no report behind.
pub fn generate(
    results: &[DocumentResult],
    output: &Path,
    template: &Path,
    config: &SpreadsheetConfig,
) -> Result<PathBuf, ReportError> {
    let _span = info_span!("generate_report", results = results.len()).entered();

    if results.is_empty() {
        return Err(ReportError::NoResults);
    }
    if !template.is_file() {
        return Err(ReportError::TemplateMissing(template.to_path_buf()));
    }
    let palette = StatusPalette::from_config(&config.palette).map_err(ReportError::InvalidPalette)?;

    let staged = probe_access(template, output)?;

    let sheet = read_template(template)?;
    let merged = merge(sheet, results, &config.columns, &palette)?;
    write_sheet(&merged, staged.path(), config.max_column_width)?;

    staged.persist(output).map_err(|e| ReportError::Persist {
        path: output.to_path_buf(),
        source: e.error,
    })?;

    info!("Report written to {}", output.display());
    Ok(output.to_path_buf())
}

/// Fails fast when the template cannot be read or the output cannot be
/// written, typically because a spreadsheet application holds a lock.
/// Returns the staging file the report is written to.
fn probe_access(template: &Path, output: &Path) -> Result<NamedTempFile, ReportError> {
    File::open(template).map_err(locked(template))?;
    if output.exists() {
        OpenOptions::new()
            .write(true)
            .open(output)
            .map_err(locked(output))?;
    }

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(".kyoqa-report-")
        .suffix(".xlsx")
        .tempfile_in(dir)
        .map_err(locked(output))
}

fn locked(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError {
    let path = path.to_path_buf();
    move |source| ReportError::TemplateLocked { path, source }
}
