//! On-disk cache of finished document results, one JSON file per document.
//!
//! Entries are keyed by `<stem>_<size in bytes>`. Two different files with
//! the same name and size share an entry; re-runs pass `ignore_cache` to
//! force reprocessing.

use std::path::{Path, PathBuf};

use crate::document::DocumentResult;
use crate::error::CacheError;

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for `path`. Falls back to `<stem>_unknown` when the file
    /// size can't be read.
    pub fn fingerprint(path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        match std::fs::metadata(path) {
            Ok(meta) => format!("{}_{}", stem, meta.len()),
            Err(_) => format!("{}_unknown", stem),
        }
    }

    pub fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{}.json", fingerprint))
    }

    /// Returns the cached result, or `None` on any miss. Unreadable,
    /// unparseable or internally inconsistent entries count as misses.
    pub fn get(&self, fingerprint: &str) -> Option<DocumentResult> {
        let path = self.entry_path(fingerprint);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(fingerprint, error = %e, "Cache entry unreadable");
                }
                return None;
            }
        };

        match serde_json::from_str::<DocumentResult>(&content) {
            Ok(result) if result.is_consistent() => Some(result),
            Ok(_) => {
                tracing::debug!(fingerprint, "Cache entry inconsistent, reprocessing");
                None
            }
            Err(e) => {
                tracing::debug!(fingerprint, error = %e, "Cache entry malformed, reprocessing");
                None
            }
        }
    }

    pub fn put(&self, fingerprint: &str, result: &DocumentResult) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::CreateDirectory {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.entry_path(fingerprint);
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(&path, json).map_err(|e| CacheError::WriteFile { path, source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ProcessingStatus;

    #[test]
    fn test_fingerprint_uses_stem_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("bulletin.pdf");
        std::fs::write(&pdf, b"12345").unwrap();

        assert_eq!(ResultCache::fingerprint(&pdf), "bulletin_5");
        assert_eq!(
            ResultCache::fingerprint(&dir.path().join("gone.pdf")),
            "gone_unknown"
        );
    }

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(dir.path().join("cache"));
        let result = DocumentResult::success(
            "a.pdf",
            "TASKalfa 8000i".to_string(),
            "Jane".to_string(),
            String::new(),
            false,
        );

        cache.put("a_10", &result).unwrap();

        assert_eq!(cache.get("a_10"), Some(result));
        assert_eq!(cache.get("b_10"), None);
    }

    #[test]
    fn test_malformed_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(dir.path());
        std::fs::write(cache.entry_path("a_1"), r#"{"fileName": "a.pdf"}"#).unwrap();

        assert!(cache.get("a_1").is_none());
    }

    #[test]
    fn test_inconsistent_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(dir.path());
        let mut result = DocumentResult::failure("a.pdf", ProcessingStatus::Corrupted, "bad", false);
        result.status = ProcessingStatus::Success;
        cache.put("a_1", &result).unwrap();

        assert!(cache.get("a_1").is_none());
    }
}
