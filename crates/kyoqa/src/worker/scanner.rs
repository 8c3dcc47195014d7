use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::WorkerError;

/// Where a batch takes its documents from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// An explicit list, processed in the given order.
    Files(Vec<PathBuf>),
    /// Every `.pdf` at the top level of a directory, in name order.
    Directory(PathBuf),
}

impl InputSpec {
    /// Builds an input selection from command-line style arguments: a single directory
    /// argument scans it, anything else is treated as a file list.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        match paths.as_slice() {
            [single] if single.is_dir() => InputSpec::Directory(single.clone()),
            _ => InputSpec::Files(paths),
        }
    }

    pub fn resolve(&self) -> Result<Vec<PathBuf>, WorkerError> {
        match self {
            InputSpec::Files(files) => {
                if files.is_empty() {
                    return Err(WorkerError::NoInputFiles("the selection".to_string()));
                }
                Ok(files.clone())
            }
            InputSpec::Directory(dir) => scan_directory(dir),
        }
    }
}

fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, WorkerError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| WorkerError::ScanFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        if is_pdf(path) {
            debug!("Found document: {}", path.display());
            files.push(path.to_path_buf());
        }
    }

    if files.is_empty() {
        return Err(WorkerError::NoInputFiles(dir.display().to_string()));
    }

    files.sort();
    info!("Scanned {} documents in {}", files.len(), dir.display());
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_scan_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.pdf"), b"%PDF-").unwrap();
        std::fs::write(temp_dir.path().join("a.PDF"), b"%PDF-").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"text").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested.pdf")).unwrap();
        std::fs::write(temp_dir.path().join("nested.pdf").join("c.pdf"), b"%PDF-").unwrap();

        let files = InputSpec::Directory(temp_dir.path().to_path_buf())
            .resolve()
            .unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"text").unwrap();

        let err = InputSpec::Directory(temp_dir.path().to_path_buf())
            .resolve()
            .unwrap_err();
        assert!(matches!(err, WorkerError::NoInputFiles(_)));
    }

    #[test]
    fn test_missing_directory_is_a_scan_failure() {
        let temp_dir = TempDir::new().unwrap();
        let err = InputSpec::Directory(temp_dir.path().join("absent"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, WorkerError::ScanFailed { .. }));
    }

    #[test]
    fn test_file_list_keeps_order() {
        let files = vec![PathBuf::from("/in/z.pdf"), PathBuf::from("/in/a.pdf")];
        assert_eq!(InputSpec::Files(files.clone()).resolve().unwrap(), files);
        assert!(InputSpec::Files(vec![]).resolve().is_err());
    }

    #[test]
    fn test_from_paths() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            InputSpec::from_paths(vec![temp_dir.path().to_path_buf()]),
            InputSpec::Directory(temp_dir.path().to_path_buf())
        );
        let file = temp_dir.path().join("one.pdf");
        assert_eq!(
            InputSpec::from_paths(vec![file.clone()]),
            InputSpec::Files(vec![file])
        );
    }
}
