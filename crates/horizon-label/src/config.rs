//! Host configuration for a label.
//!
//! A [`LabelConfig`] can be built in code with the `with_*` methods or read
//! from TOML:
//!
//! ```toml
//! auto_detect_links = true
//! defer_link_detection = true
//! detector_types = ["link", "email"]
//! link_color = "#0000FF"
//! highlighted_link_background_color = "#80808080"
//! links_have_underlines = true
//!
//! [defaults]
//! text_color = "#222222"
//! kern = 0.5
//! font = { family = "Helvetica", size = 14.0 }
//! ```
//!
//! Every key is optional; missing keys keep their [`Default`] values.

use std::path::Path;

use horizon_label_core::logging::targets;
use serde::Deserialize;

use crate::attributes::{
    Attribute, AttributeSet, Color, FontDescriptor, UnderlinePattern, UnderlineStyle,
};
use crate::detector::{DetectionMode, DetectorTypes};
use crate::error::{LabelError, Result};

/// Whole-text default styles, the `[defaults]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultStyle {
    pub text_color: Option<Color>,
    pub font: Option<FontDescriptor>,
    pub underline: Option<UnderlineStyle>,
    pub underline_pattern: Option<UnderlinePattern>,
    pub stroke_width: Option<f32>,
    pub stroke_color: Option<Color>,
    pub kern: Option<f32>,
    pub shadow_blur: Option<f32>,
}

impl DefaultStyle {
    /// The styles as an attribute set, omitting unset entries.
    pub fn to_attributes(&self) -> AttributeSet {
        let mut set = AttributeSet::new();
        set.extend(self.text_color.map(Attribute::TextColor));
        set.extend(self.font.clone().map(Attribute::Font));
        set.extend(self.underline.map(Attribute::UnderlineStyle));
        set.extend(self.underline_pattern.map(Attribute::UnderlinePattern));
        set.extend(self.stroke_width.map(Attribute::StrokeWidth));
        set.extend(self.stroke_color.map(Attribute::StrokeColor));
        set.extend(self.kern.map(Attribute::Kern));
        set.extend(self.shadow_blur.map(Attribute::ShadowBlur));
        set
    }
}

/// Link detection and link styling settings of a label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    /// Detect links when the label is prepared for display.
    pub auto_detect_links: bool,
    /// Run detection on the background executor instead of inline.
    pub defer_link_detection: bool,
    /// Kinds of data to detect.
    pub detector_types: DetectorTypes,
    /// Text color of links. `None` leaves link text colored as styled.
    pub link_color: Option<Color>,
    /// Background of the link being pressed.
    pub highlighted_link_background_color: Option<Color>,
    /// Underline every link.
    pub links_have_underlines: bool,
    /// Whole-text default styles.
    pub defaults: DefaultStyle,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            auto_detect_links: false,
            defer_link_detection: false,
            detector_types: DetectorTypes::default(),
            link_color: Some(Color::BLUE),
            highlighted_link_background_color: Some(Color::GRAY.with_alpha(128)),
            links_have_underlines: false,
            defaults: DefaultStyle::default(),
        }
    }
}

impl LabelConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| LabelError::io(path, e))?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            target: targets::CONFIG,
            path = %path.display(),
            auto_detect = config.auto_detect_links,
            deferred = config.defer_link_detection,
            "label configuration loaded"
        );
        Ok(config)
    }

    /// The detection mode selected by `defer_link_detection`.
    pub fn detection_mode(&self) -> DetectionMode {
        if self.defer_link_detection {
            DetectionMode::Deferred
        } else {
            DetectionMode::Immediate
        }
    }

    pub fn with_auto_detect_links(mut self, enabled: bool) -> Self {
        self.auto_detect_links = enabled;
        self
    }

    pub fn with_deferred_detection(mut self, deferred: bool) -> Self {
        self.defer_link_detection = deferred;
        self
    }

    pub fn with_detector_types(mut self, types: DetectorTypes) -> Self {
        self.detector_types = types;
        self
    }

    pub fn with_link_color(mut self, color: Option<Color>) -> Self {
        self.link_color = color;
        self
    }

    pub fn with_highlighted_link_background_color(mut self, color: Option<Color>) -> Self {
        self.highlighted_link_background_color = color;
        self
    }

    pub fn with_link_underlines(mut self, underlined: bool) -> Self {
        self.links_have_underlines = underlined;
        self
    }

    pub fn with_defaults(mut self, defaults: DefaultStyle) -> Self {
        self.defaults = defaults;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LabelConfig::default();
        assert!(!config.auto_detect_links);
        assert_eq!(config.detection_mode(), DetectionMode::Immediate);
        assert_eq!(config.detector_types, DetectorTypes::LINK);
        assert_eq!(config.link_color, Some(Color::BLUE));
        assert_eq!(
            config.highlighted_link_background_color,
            Some(Color::from_rgba8(128, 128, 128, 128))
        );
        assert!(config.defaults.to_attributes().is_empty());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(LabelConfig::from_toml_str("").unwrap(), LabelConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let config = LabelConfig::from_toml_str(
            r##"
            auto_detect_links = true
            defer_link_detection = true
            detector_types = ["link", "phone_number"]
            link_color = "#FF0000"
            links_have_underlines = true

            [defaults]
            text_color = "#222222"
            underline = "double"
            underline_pattern = "dash_dot"
            kern = 0.5
            font = { family = "Helvetica", size = 14.0, weight = 700 }
            "##,
        )
        .unwrap();

        assert!(config.auto_detect_links);
        assert_eq!(config.detection_mode(), DetectionMode::Deferred);
        assert_eq!(config.detector_types, DetectorTypes::LINK | DetectorTypes::PHONE_NUMBER);
        assert_eq!(config.link_color, Some(Color::RED));

        let defaults = config.defaults.to_attributes();
        assert_eq!(defaults.len(), 5);
        assert_eq!(defaults.text_color(), Some(Color::from_rgb8(0x22, 0x22, 0x22)));
        assert_eq!(defaults.underline_style(), Some(UnderlineStyle::Double));
        assert_eq!(defaults.underline_pattern(), Some(UnderlinePattern::DashDot));
        assert_eq!(defaults.kern(), Some(0.5));
        assert_eq!(defaults.font().map(|f| f.weight), Some(FontDescriptor::BOLD));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = LabelConfig::from_toml_str(r##"link_color = "blue""##).unwrap_err();
        assert!(matches!(err, LabelError::Config(_)));
        assert!(err.to_string().contains("invalid color 'blue'"));

        let err = LabelConfig::from_toml_str(r#"detector_types = ["address"]"#).unwrap_err();
        assert!(err.to_string().contains("unknown detector type 'address'"));

        let err = LabelConfig::from_toml_str("auto_detect = true").unwrap_err();
        assert!(matches!(err, LabelError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LabelConfig::load("/nonexistent/horizon-label.toml").unwrap_err();
        assert!(matches!(err, LabelError::Io { .. }));
    }

    #[test]
    fn test_builder() {
        let config = LabelConfig::default()
            .with_auto_detect_links(true)
            .with_detector_types(DetectorTypes::ALL)
            .with_link_color(None)
            .with_link_underlines(true);
        assert!(config.auto_detect_links);
        assert_eq!(config.detector_types, DetectorTypes::ALL);
        assert_eq!(config.link_color, None);
        assert!(config.links_have_underlines);
    }
}
