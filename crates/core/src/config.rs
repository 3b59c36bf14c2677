//! Template thresholds and page range.
//!
//! The hymnal template prints the song number in a large footer numeral,
//! titles in a slightly larger face than the verses, and nothing else worth
//! keeping below the footer line. Every number here is template specific,
//! which is why all of it can be loaded from TOML and overridden from the
//! command line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid layout configuration: {0}")]
    Invalid(String),
    #[error("Failed to parse layout configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Font-size bands and the footer line used by the span classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Size of the footer numeral carrying the song number.
    pub number_size: f32,
    /// Size of title lines.
    pub title_size: f32,
    /// Size of verse lines. Informational; anything that is not a number or
    /// a title is treated as body text.
    pub content_size: f32,
    /// Half-width of every size band.
    pub tolerance: f32,
    /// Lines whose origin lies below this `y` are footer.
    pub footer_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            number_size: 28.0,
            title_size: 12.0,
            content_size: 11.0,
            tolerance: 1.0,
            footer_y: 500.0,
        }
    }
}

impl LayoutConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject bands that cannot classify anything sensibly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        for (name, size) in [
            ("number_size", self.number_size),
            ("title_size", self.title_size),
            ("content_size", self.content_size),
        ] {
            if size.is_nan() || size <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {size}"
                )));
            }
        }
        if (self.number_size - self.title_size).abs() < self.tolerance * 2.0 {
            return Err(ConfigError::Invalid(format!(
                "number band ({}) overlaps title band ({})",
                self.number_size, self.title_size
            )));
        }
        Ok(())
    }

    pub fn in_number_band(&self, size: f32) -> bool {
        (size - self.number_size).abs() < self.tolerance
    }

    pub fn in_title_band(&self, size: f32) -> bool {
        (size - self.title_size).abs() < self.tolerance
    }

    pub fn is_footer(&self, y: f32) -> bool {
        y > self.footer_y
    }
}

/// 1-based, inclusive page window. Pages before `start` are front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl Default for PageRange {
    fn default() -> Self {
        Self {
            start: 7,
            end: None,
        }
    }
}

impl PageRange {
    pub fn new(start: u32, end: Option<u32>) -> Result<Self, ConfigError> {
        if start == 0 {
            return Err(ConfigError::Invalid("start page is 1-based".into()));
        }
        if let Some(end) = end {
            if end < start {
                return Err(ConfigError::Invalid(format!(
                    "end page {end} comes before start page {start}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Clamp the window to a document of `page_count` pages.
    pub fn pages(&self, page_count: u32) -> std::ops::RangeInclusive<u32> {
        let end = self.end.unwrap_or(page_count).min(page_count);
        self.start..=end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_template() {
        let config = LayoutConfig::default();
        assert!(config.in_number_band(28.4));
        assert!(config.in_title_band(12.0));
        assert!(!config.in_title_band(11.0));
        assert!(config.is_footer(500.5));
        assert!(!config.is_footer(500.0));
    }

    #[test]
    fn test_from_toml_partial_keeps_defaults() {
        let config = LayoutConfig::from_toml("title_size = 14.0\nfooter_y = 720.0\n").unwrap();
        assert_eq!(config.title_size, 14.0);
        assert_eq!(config.footer_y, 720.0);
        assert_eq!(config.number_size, 28.0);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        assert!(matches!(
            LayoutConfig::from_toml("titel_size = 14.0"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_overlapping_bands() {
        let config = LayoutConfig {
            number_size: 12.5,
            ..LayoutConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_tolerance() {
        let config = LayoutConfig {
            tolerance: 0.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_range_clamps_to_document() {
        let range = PageRange::new(7, Some(200)).unwrap();
        assert_eq!(range.pages(161), 7..=161);

        let open = PageRange::new(2, None).unwrap();
        assert_eq!(open.pages(4), 2..=4);
    }

    #[test]
    fn test_page_range_start_past_end_is_empty() {
        let range = PageRange::new(10, None).unwrap();
        assert_eq!(range.pages(5).count(), 0);
    }

    #[test]
    fn test_page_range_rejects_bad_bounds() {
        assert!(PageRange::new(0, None).is_err());
        assert!(PageRange::new(9, Some(3)).is_err());
    }
}
