pub mod loader;
pub mod schema;

pub use loader::{default_config_path, ensure_directories, load_config, load_config_from_str};
pub use schema::{
    AppConfig, ColumnNames, DirectoriesConfig, ExtractionConfig, HarvestConfig, OcrConfig,
    PaletteConfig, SpreadsheetConfig, StandardizationRule, ThresholdMode,
};
