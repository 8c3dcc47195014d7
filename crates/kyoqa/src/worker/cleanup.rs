use std::path::Path;

use log::{info, warn};

/// Removes stale review side-files (`*.txt`) left by a previous batch.
pub fn clear_review_files(review_dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(review_dir) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_txt = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if !is_txt || !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not delete {}: {}", path.display(), e),
        }
    }
    if removed > 0 {
        info!("Cleared {} review files from {}", removed, review_dir.display());
    }
    removed
}

/// Empties the cache and review directories. Entries that cannot be removed
/// are logged and skipped. Returns the number of entries removed.
pub fn cleanup_temp_files(cache_dir: &Path, review_dir: &Path) -> usize {
    let mut removed = 0;
    for dir in [cache_dir, review_dir] {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let outcome = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            match outcome {
                Ok(()) => removed += 1,
                Err(e) => warn!("Error deleting {}: {}", path.display(), e),
            }
        }
    }
    info!("Cleanup complete, removed {} entries", removed);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn test_clear_review_files_only_removes_text() {
        let temp = TempDir::new().unwrap();
        temp.child("a.txt").write_str("text").unwrap();
        temp.child("b.TXT").write_str("text").unwrap();
        temp.child("keep.pdf").write_binary(b"%PDF-").unwrap();

        assert_eq!(clear_review_files(temp.path()), 2);
        assert!(!temp.child("a.txt").path().exists());
        assert!(temp.child("keep.pdf").path().exists());
    }

    #[test]
    fn test_cleanup_empties_both_directories() {
        let temp = TempDir::new().unwrap();
        temp.child("cache/a_10.json").write_str("{}").unwrap();
        temp.child("cache/nested/x").write_str("x").unwrap();
        temp.child("review/a.txt").write_str("text").unwrap();

        let removed = cleanup_temp_files(&temp.path().join("cache"), &temp.path().join("review"));

        assert_eq!(removed, 3);
        assert!(temp.child("cache").path().is_dir());
        assert_eq!(std::fs::read_dir(temp.path().join("cache")).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directories_are_ignored() {
        let temp = TempDir::new().unwrap();
        assert_eq!(cleanup_temp_files(&temp.path().join("x"), &temp.path().join("y")), 0);
        assert_eq!(clear_review_files(&temp.path().join("z")), 0);
    }
}
