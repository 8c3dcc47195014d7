use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub directories: DirectoriesConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
    #[serde(default = "default_cache_dir")]
    pub cache: PathBuf,
    #[serde(default = "default_review_dir")]
    pub review: PathBuf,
    #[serde(default = "default_custom_patterns")]
    pub custom_patterns: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_review_dir() -> PathBuf {
    PathBuf::from("PDF_TXT")
}

fn default_custom_patterns() -> PathBuf {
    PathBuf::from("custom_patterns.json")
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            output: default_output_dir(),
            cache: default_cache_dir(),
            review: default_review_dir(),
            custom_patterns: default_custom_patterns(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    Otsu,
    Adaptive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Tesseract page segmentation mode; 6 is "single uniform block of text".
    #[serde(default = "default_psm")]
    pub page_segmentation_mode: u32,
    #[serde(default = "default_threshold")]
    pub threshold: ThresholdMode,
    #[serde(default = "default_median_kernel")]
    pub median_kernel: u32,
}

fn default_true() -> bool {
    true
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

fn default_dpi() -> u32 {
    300
}

fn default_psm() -> u32 {
    6
}

fn default_threshold() -> ThresholdMode {
    ThresholdMode::Otsu
}

fn default_median_kernel() -> u32 {
    3
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: default_languages(),
            dpi: default_dpi(),
            page_segmentation_mode: default_psm(),
            threshold: default_threshold(),
            median_kernel: default_median_kernel(),
        }
    }
}

/// Thresholds deciding when direct extraction is good enough.
///
/// `min_direct_text_chars` is measured over the whole document (all pages
/// concatenated, surrounding whitespace trimmed), not per page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_min_direct_text_chars")]
    pub min_direct_text_chars: usize,
    #[serde(default = "default_min_ocr_text_chars")]
    pub min_ocr_text_chars: usize,
}

fn default_min_direct_text_chars() -> usize {
    50
}

fn default_min_ocr_text_chars() -> usize {
    10
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_direct_text_chars: default_min_direct_text_chars(),
            min_ocr_text_chars: default_min_ocr_text_chars(),
        }
    }
}

/// A literal substring replacement applied to harvested identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizationRule {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    #[serde(default = "default_exclusions")]
    pub exclusion_patterns: Vec<String>,
    #[serde(default = "default_unwanted_authors")]
    pub unwanted_authors: Vec<String>,
    /// Applied in order after whitespace collapsing.
    #[serde(default = "default_standardization")]
    pub standardization_rules: Vec<StandardizationRule>,
    #[serde(default)]
    pub fallback_patterns_enabled: bool,
}

fn default_exclusions() -> Vec<String> {
    vec!["CVE-".to_string(), "CWE-".to_string(), "TK-".to_string()]
}

fn default_unwanted_authors() -> Vec<String> {
    vec!["Knowledge Import".to_string()]
}

fn default_standardization() -> Vec<StandardizationRule> {
    vec![
        StandardizationRule {
            from: "TASKalfa-".to_string(),
            to: "TASKalfa ".to_string(),
        },
        StandardizationRule {
            from: "ECOSYS-".to_string(),
            to: "ECOSYS ".to_string(),
        },
    ]
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            exclusion_patterns: default_exclusions(),
            unwanted_authors: default_unwanted_authors(),
            standardization_rules: default_standardization(),
            fallback_patterns_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "default_description_column")]
    pub description: String,
    #[serde(default = "default_meta_column")]
    pub meta: String,
    #[serde(default = "default_author_column")]
    pub author: String,
    #[serde(default = "default_tracking_column")]
    pub tracking: String,
    #[serde(default = "default_status_column")]
    pub status: String,
    #[serde(default = "default_file_name_column")]
    pub file_name: String,
}

fn default_description_column() -> String {
    "Short description".to_string()
}

fn default_meta_column() -> String {
    "Meta".to_string()
}

fn default_author_column() -> String {
    "Author".to_string()
}

fn default_tracking_column() -> String {
    "QA Numbers".to_string()
}

fn default_status_column() -> String {
    "Processing Status".to_string()
}

fn default_file_name_column() -> String {
    "file_name".to_string()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            description: default_description_column(),
            meta: default_meta_column(),
            author: default_author_column(),
            tracking: default_tracking_column(),
            status: default_status_column(),
            file_name: default_file_name_column(),
        }
    }
}

/// Row fill colours as `RRGGBB` hex strings. `None` leaves the row unfilled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_success_fill")]
    pub success: Option<String>,
    #[serde(default = "default_needs_review_fill")]
    pub needs_review: Option<String>,
    #[serde(default = "default_failed_fill")]
    pub failed: Option<String>,
    #[serde(default = "default_protected_fill")]
    pub protected: Option<String>,
    #[serde(default = "default_corrupted_fill")]
    pub corrupted: Option<String>,
}

fn default_success_fill() -> Option<String> {
    Some("C6EFCE".to_string())
}

fn default_needs_review_fill() -> Option<String> {
    Some("FFEB9C".to_string())
}

fn default_failed_fill() -> Option<String> {
    Some("FFC7CE".to_string())
}

fn default_protected_fill() -> Option<String> {
    Some("D9D9D9".to_string())
}

fn default_corrupted_fill() -> Option<String> {
    Some("F8CBAD".to_string())
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            success: default_success_fill(),
            needs_review: default_needs_review_fill(),
            failed: default_failed_fill(),
            protected: default_protected_fill(),
            corrupted: default_corrupted_fill(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetConfig {
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default = "default_max_column_width")]
    pub max_column_width: f64,
}

fn default_max_column_width() -> f64 {
    70.0
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            palette: PaletteConfig::default(),
            max_column_width: default_max_column_width(),
        }
    }
}
