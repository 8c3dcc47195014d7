//! User-editable regex pattern source.
//!
//! Patterns live in a small JSON file with two ordered lists. The harvester
//! re-reads it on every call, so edits made between documents take effect
//! without a restart.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// Built-in model patterns, searched after the custom ones.
pub const DEFAULT_MODEL_PATTERNS: &[&str] = &[
    r"\bTASKalfa\s*[\w-]+\b",
    r"\bECOSYS\s*[\w-]+\b",
    r"\b(?:PF|DF|MK|AK|DP|BF|JS)-\d+[\w-]*\b",
];

/// Built-in tracking number patterns, searched after the custom ones.
pub const DEFAULT_QA_NUMBER_PATTERNS: &[&str] = &[r"\bQA[-_]?[\w-]+", r"\bSB[-_]?[\w-]+"];

/// Aggressive model patterns tried only when nothing else matched. These are
/// matched case-sensitively.
pub const FALLBACK_MODEL_PATTERNS: &[&str] = &[
    r"\b[A-Z]{2,}[-\s]+[A-Z0-9]{2,}\b",
    r"\b[A-Z]{2,}[A-Z0-9]*\d+[a-z]*\b",
    r"\b[A-Z]{2,}\s+[A-Z0-9]+[a-z]*\b",
    r"(?i)\bFS[-\s]*[A-Z0-9]+[a-z]*\b",
    r"(?i)\bKM[-\s]*[A-Z0-9]+[a-z]*\b",
    r"(?i)\bTASKalfa\s*[A-Z0-9]+[a-z]*\b",
    r"(?i)\bECOSYS\s*[A-Z0-9]+[a-z]*\b",
    r"(?i)\bPF[-\s]*\d+\b",
    r"(?i)\bDF[-\s]*\d+\b",
    r"(?i)\bMK[-\s]*\d+\b",
    r"(?m)\b([A-Z]{2,}[A-Z0-9\-\s]+[A-Z0-9][a-z]*)\s*(?:,|\)|$)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Model,
    Tracking,
}

impl PatternKind {
    pub fn defaults(&self) -> &'static [&'static str] {
        match self {
            PatternKind::Model => DEFAULT_MODEL_PATTERNS,
            PatternKind::Tracking => DEFAULT_QA_NUMBER_PATTERNS,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            PatternKind::Model => "MODEL_PATTERNS",
            PatternKind::Tracking => "QA_NUMBER_PATTERNS",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    #[serde(rename = "MODEL_PATTERNS", default)]
    pub model_patterns: Vec<String>,
    #[serde(rename = "QA_NUMBER_PATTERNS", default)]
    pub qa_number_patterns: Vec<String>,
}

impl PatternSet {
    /// Contents written when the custom source is absent or unreadable.
    pub fn seed() -> Self {
        Self {
            model_patterns: [
                r"\bFS-\d+[A-Z]*\b",
                r"\bKM-\d+[A-Z]*\b",
                r"\bECOSYS\s+[A-Z]+\d+[a-z]*\b",
                r"\bTASKalfa\s+\d+[a-z]*\b",
                r"\bPF-\d+\b",
                r"\bDF-\d+\b",
                r"\bMK-\d+\b",
                r"\bDV-\d+\b",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            qa_number_patterns: vec![r"\bQA-\d+\b".to_string(), r"\bSB-\d+\b".to_string()],
        }
    }

    pub fn get(&self, kind: PatternKind) -> &[String] {
        match kind {
            PatternKind::Model => &self.model_patterns,
            PatternKind::Tracking => &self.qa_number_patterns,
        }
    }

    pub fn get_mut(&mut self, kind: PatternKind) -> &mut Vec<String> {
        match kind {
            PatternKind::Model => &mut self.model_patterns,
            PatternKind::Tracking => &mut self.qa_number_patterns,
        }
    }

    /// Drops blanks and duplicates (keeping the first occurrence) and returns
    /// the patterns that do not compile, leaving them in place.
    fn normalize(&mut self) -> Vec<String> {
        let mut invalid = Vec::new();
        for list in [&mut self.model_patterns, &mut self.qa_number_patterns] {
            let mut seen = Vec::with_capacity(list.len());
            for pattern in list.drain(..) {
                if pattern.trim().is_empty() || seen.contains(&pattern) {
                    continue;
                }
                seen.push(pattern);
            }
            invalid.extend(seen.iter().filter(|p| Regex::new(p).is_err()).cloned());
            *list = seen;
        }
        invalid
    }
}

/// File-backed custom pattern source.
#[derive(Debug, Clone)]
pub struct PatternStore {
    path: PathBuf,
}

impl PatternStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the custom patterns fresh from disk.
    ///
    /// Never fails: an absent file is regenerated from [`PatternSet::seed`],
    /// an unparseable one is moved aside to `<name>.invalid` and regenerated.
    /// The result is deduplicated and stripped of patterns that don't compile.
    pub fn load(&self) -> PatternSet {
        let mut set = match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<PatternSet>(&content) {
                Ok(set) => set,
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Custom pattern file is not valid, regenerating defaults"
                    );
                    let backup = self.path.with_extension("invalid");
                    if let Err(e) = std::fs::rename(&self.path, &backup) {
                        tracing::warn!(error = %e, "Failed to move invalid pattern file aside");
                    }
                    self.regenerate()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Creating custom pattern file");
                self.regenerate()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read custom patterns, using built-in defaults only"
                );
                PatternSet::default()
            }
        };

        let invalid = set.normalize();
        for pattern in &invalid {
            tracing::warn!(pattern = %pattern, "Skipping custom pattern that does not compile");
        }
        set.model_patterns.retain(|p| !invalid.contains(p));
        set.qa_number_patterns.retain(|p| !invalid.contains(p));
        set
    }

    /// Writes `set` as the new custom source, replacing the previous file.
    ///
    /// Blank and duplicate entries are dropped. Patterns that fail to compile
    /// are still written but returned so the caller can report them; `load`
    /// will skip them.
    pub fn save(&self, set: &PatternSet) -> Result<Vec<String>, PatternError> {
        let mut set = set.clone();
        let invalid = set.normalize();

        let json = serde_json::to_string_pretty(&set)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PatternError::WriteFile {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| PatternError::WriteFile {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| PatternError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(invalid)
    }

    /// Custom patterns of `kind` followed by the built-in defaults that are
    /// not already present.
    pub fn combined(&self, kind: PatternKind) -> Vec<String> {
        let set = self.load();
        let mut combined: Vec<String> = Vec::new();
        let custom = set.get(kind).iter().map(String::as_str);
        for pattern in custom.chain(kind.defaults().iter().copied()) {
            if !combined.iter().any(|p| p == pattern) {
                combined.push(pattern.to_string());
            }
        }
        combined
    }

    fn regenerate(&self) -> PatternSet {
        let seed = PatternSet::seed();
        if let Err(e) = self.save(&seed) {
            tracing::warn!(error = %e, "Failed to write default custom pattern file");
        }
        seed
    }
}
