use std::path::{Path, PathBuf};

/// One document scheduled for processing within a batch.
#[derive(Debug, Clone)]
pub struct DocumentJob {
    pub id: String,
    pub source_path: PathBuf,
    /// Skip the cache lookup.
    pub ignore_cache: bool,
    /// Part of a re-run batch. Re-runs always bypass the cache.
    pub is_rerun: bool,
}

impl DocumentJob {
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_path,
            ignore_cache: false,
            is_rerun: false,
        }
    }

    pub fn ignoring_cache(mut self, ignore_cache: bool) -> Self {
        self.ignore_cache = ignore_cache;
        self
    }

    pub fn for_rerun(mut self, is_rerun: bool) -> Self {
        self.is_rerun = is_rerun;
        self.ignore_cache |= is_rerun;
        self
    }

    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }

    pub fn file_stem(&self) -> String {
        stem_of(&self.source_path)
    }
}

pub(crate) fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unnamed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ids_are_unique() {
        let a = DocumentJob::new(PathBuf::from("/in/a.pdf"));
        let b = DocumentJob::new(PathBuf::from("/in/a.pdf"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_names() {
        let job = DocumentJob::new(PathBuf::from("/in/Service_Bulletin.PDF")).ignoring_cache(true);
        assert_eq!(job.file_name(), "Service_Bulletin.PDF");
        assert_eq!(job.file_stem(), "Service_Bulletin");
        assert!(job.ignore_cache);
        assert!(!job.is_rerun);
    }

    #[test]
    fn test_rerun_implies_ignore_cache() {
        let job = DocumentJob::new(PathBuf::from("/in/a.pdf")).for_rerun(true);
        assert!(job.is_rerun);
        assert!(job.ignore_cache);

        let fresh = DocumentJob::new(PathBuf::from("/in/a.pdf")).for_rerun(false);
        assert!(!fresh.is_rerun);
        assert!(!fresh.ignore_cache);
    }
}
