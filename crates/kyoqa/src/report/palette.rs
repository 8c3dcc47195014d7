use crate::config::PaletteConfig;
use crate::document::ProcessingStatus;

/// Resolved RGB fills keyed by status. `None` leaves the row unfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPalette {
    pub success: Option<u32>,
    pub needs_review: Option<u32>,
    pub failed: Option<u32>,
    pub protected: Option<u32>,
    pub corrupted: Option<u32>,
}

impl StatusPalette {
    pub fn from_config(config: &PaletteConfig) -> Result<Self, String> {
        Ok(Self {
            success: parse_fill("success", config.success.as_deref())?,
            needs_review: parse_fill("needs_review", config.needs_review.as_deref())?,
            failed: parse_fill("failed", config.failed.as_deref())?,
            protected: parse_fill("protected", config.protected.as_deref())?,
            corrupted: parse_fill("corrupted", config.corrupted.as_deref())?,
        })
    }

    pub fn fill_for(&self, status: ProcessingStatus) -> Option<u32> {
        match status {
            ProcessingStatus::Success => self.success,
            ProcessingStatus::NeedsReview => self.needs_review,
            ProcessingStatus::Protected => self.protected,
            ProcessingStatus::Corrupted => self.corrupted,
            ProcessingStatus::OcrFailed
            | ProcessingStatus::NoTextFound
            | ProcessingStatus::Failed => self.failed,
        }
    }
}

fn parse_fill(name: &str, value: Option<&str>) -> Result<Option<u32>, String> {
    let Some(value) = value else {
        return Ok(None);
    };
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return Err(format!("palette.{}: expected a 6-digit hex color, got '{}'", name, value));
    }
    u32::from_str_radix(hex, 16)
        .map(Some)
        .map_err(|_| format!("palette.{}: '{}' is not a hex color", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let palette = StatusPalette::from_config(&PaletteConfig::default()).unwrap();
        assert_eq!(palette.fill_for(ProcessingStatus::Success), Some(0xC6EFCE));
        assert_eq!(palette.fill_for(ProcessingStatus::NeedsReview), Some(0xFFEB9C));
        assert_eq!(palette.fill_for(ProcessingStatus::OcrFailed), Some(0xFFC7CE));
        assert_eq!(palette.fill_for(ProcessingStatus::NoTextFound), Some(0xFFC7CE));
        assert_eq!(palette.fill_for(ProcessingStatus::Protected), Some(0xD9D9D9));
        assert_eq!(palette.fill_for(ProcessingStatus::Corrupted), Some(0xF8CBAD));
    }

    #[test]
    fn test_hash_prefix_and_disabled_entries() {
        let config = PaletteConfig {
            success: None,
            failed: Some("#9c0006".to_string()),
            ..PaletteConfig::default()
        };
        let palette = StatusPalette::from_config(&config).unwrap();
        assert_eq!(palette.fill_for(ProcessingStatus::Success), None);
        assert_eq!(palette.fill_for(ProcessingStatus::Failed), Some(0x9C0006));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        let config = PaletteConfig {
            protected: Some("grey".to_string()),
            ..PaletteConfig::default()
        };
        let err = StatusPalette::from_config(&config).unwrap_err();
        assert!(err.contains("palette.protected"));
    }
}
