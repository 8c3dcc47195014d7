use std::path::{Path, PathBuf};

use crate::config::schema::AppConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// Loads the configuration from `path`. A missing file is not an error: the
/// built-in defaults are returned instead.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: AppConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// `<platform config dir>/kyoqa/config.json`, falling back to the working
/// directory when the platform has no config dir.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("kyoqa"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// Creates the output, cache and review directories if they are missing.
pub fn ensure_directories(config: &AppConfig) -> Result<(), ConfigError> {
    let dirs = &config.directories;
    for dir in [&dirs.output, &dirs.cache, &dirs.review] {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDirectory {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(())
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.ocr.languages.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "OCR language codes must not be empty".to_string(),
        });
    }

    if config.ocr.median_kernel % 2 == 0 {
        return Err(ConfigError::Validation {
            message: format!(
                "Median filter kernel must be odd, got {}",
                config.ocr.median_kernel
            ),
        });
    }

    for rule in &config.harvest.standardization_rules {
        if rule.from.is_empty() {
            return Err(ConfigError::Validation {
                message: format!("Standardization rule replacing with '{}' has an empty source", rule.to),
            });
        }
    }

    crate::report::StatusPalette::from_config(&config.spreadsheet.palette)
        .map_err(|message| ConfigError::Validation { message })?;

    Ok(())
}
