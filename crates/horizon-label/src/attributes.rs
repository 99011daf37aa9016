//! Text attributes: the style keys a range can carry and the sets they form.
//!
//! An [`Attribute`] is a keyed value (a color for the text, a font, an
//! underline style...). An [`AttributeSet`] holds at most one value per
//! [`AttributeKey`]; merging one set into another overwrites per key, which is
//! how overlapping styles resolve.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// An RGBA color with 8 bits per channel and straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a color from 8-bit RGBA components.
    #[inline]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit RGB components.
    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "#FF000080").
    ///
    /// Exactly one leading `#` is required.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        let len = hex.len();

        if (len != 6 && len != 8) || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        let a = if len == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()?
        } else {
            255
        };

        Some(Self::from_rgba8(r, g, b, a))
    }

    /// Return the same color with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Format as `#RRGGBBAA`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    pub const TRANSPARENT: Self = Self::from_rgba8(0, 0, 0, 0);
    pub const BLACK: Self = Self::from_rgb8(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb8(255, 255, 255);
    pub const RED: Self = Self::from_rgb8(255, 0, 0);
    pub const GREEN: Self = Self::from_rgb8(0, 255, 0);
    pub const BLUE: Self = Self::from_rgb8(0, 0, 255);
    pub const GRAY: Self = Self::from_rgb8(128, 128, 128);
}

impl TryFrom<String> for Color {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or(LabelError::InvalidColor(value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A reference to a font, resolved by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font family name, e.g. "Helvetica" or "sans-serif".
    pub family: String,
    /// Point size.
    pub size: f32,
    /// Weight from 100 (thin) to 900 (black).
    #[serde(default = "FontDescriptor::default_weight")]
    pub weight: u16,
    /// Whether the italic face is requested.
    #[serde(default)]
    pub italic: bool,
}

impl FontDescriptor {
    /// Normal weight (400).
    pub const NORMAL: u16 = 400;
    /// Bold weight (700).
    pub const BOLD: u16 = 700;

    /// Create a regular font of the given family and size.
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: Self::NORMAL,
            italic: false,
        }
    }

    /// Set the weight, clamped to 100..=900.
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight.clamp(100, 900);
        self
    }

    /// Request the bold weight.
    pub fn bold(self) -> Self {
        self.with_weight(Self::BOLD)
    }

    /// Request the italic face.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn default_weight() -> u16 {
        Self::NORMAL
    }
}

/// The line style of an underline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderlineStyle {
    /// No underline.
    #[default]
    None,
    /// A single thin line.
    Single,
    /// A single thick line.
    Thick,
    /// Two thin lines.
    Double,
}

/// The dash pattern applied to an underline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderlinePattern {
    /// Continuous line.
    #[default]
    Solid,
    /// Dotted line.
    Dot,
    /// Dashed line.
    Dash,
    /// Alternating dashes and dots.
    DashDot,
    /// A dash followed by two dots.
    DashDotDot,
}

/// The key an [`Attribute`] is stored under. One value per key per set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKey {
    TextColor,
    BackgroundColor,
    Font,
    UnderlineStyle,
    UnderlinePattern,
    StrokeWidth,
    StrokeColor,
    Kern,
    ShadowBlur,
}

/// A single style value together with its key.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Foreground color of the glyphs.
    TextColor(Color),
    /// Fill behind the glyphs, used for link highlighting.
    BackgroundColor(Color),
    /// Font used for the glyphs.
    Font(FontDescriptor),
    /// Underline line style.
    UnderlineStyle(UnderlineStyle),
    /// Underline dash pattern.
    UnderlinePattern(UnderlinePattern),
    /// Stroke width. Positive strokes only, negative strokes and fills.
    StrokeWidth(f32),
    /// Stroke color.
    StrokeColor(Color),
    /// Extra spacing between characters, in points. Negative tightens.
    Kern(f32),
    /// Blur radius of the text shadow.
    ShadowBlur(f32),
}

impl Attribute {
    /// The key this attribute is stored under.
    pub fn key(&self) -> AttributeKey {
        match self {
            Self::TextColor(_) => AttributeKey::TextColor,
            Self::BackgroundColor(_) => AttributeKey::BackgroundColor,
            Self::Font(_) => AttributeKey::Font,
            Self::UnderlineStyle(_) => AttributeKey::UnderlineStyle,
            Self::UnderlinePattern(_) => AttributeKey::UnderlinePattern,
            Self::StrokeWidth(_) => AttributeKey::StrokeWidth,
            Self::StrokeColor(_) => AttributeKey::StrokeColor,
            Self::Kern(_) => AttributeKey::Kern,
            Self::ShadowBlur(_) => AttributeKey::ShadowBlur,
        }
    }
}

/// A mapping from [`AttributeKey`] to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeSet {
    values: BTreeMap<AttributeKey, Attribute>,
}

impl AttributeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, returning the value it replaced.
    pub fn insert(&mut self, attribute: Attribute) -> Option<Attribute> {
        self.values.insert(attribute.key(), attribute)
    }

    /// Builder-style insert.
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.insert(attribute);
        self
    }

    /// Remove the value stored for `key`.
    pub fn remove(&mut self, key: AttributeKey) -> Option<Attribute> {
        self.values.remove(&key)
    }

    /// The value stored for `key`.
    pub fn get(&self, key: AttributeKey) -> Option<&Attribute> {
        self.values.get(&key)
    }

    /// Whether a value is stored for `key`.
    pub fn contains(&self, key: AttributeKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Layer `other` on top of this set; `other` wins on every shared key.
    pub fn merge(&mut self, other: &AttributeSet) {
        for attribute in other.values.values() {
            self.insert(attribute.clone());
        }
    }

    /// Iterate over the stored attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn text_color(&self) -> Option<Color> {
        match self.get(AttributeKey::TextColor) {
            Some(Attribute::TextColor(color)) => Some(*color),
            _ => None,
        }
    }

    pub fn background_color(&self) -> Option<Color> {
        match self.get(AttributeKey::BackgroundColor) {
            Some(Attribute::BackgroundColor(color)) => Some(*color),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<&FontDescriptor> {
        match self.get(AttributeKey::Font) {
            Some(Attribute::Font(font)) => Some(font),
            _ => None,
        }
    }

    pub fn underline_style(&self) -> Option<UnderlineStyle> {
        match self.get(AttributeKey::UnderlineStyle) {
            Some(Attribute::UnderlineStyle(style)) => Some(*style),
            _ => None,
        }
    }

    pub fn underline_pattern(&self) -> Option<UnderlinePattern> {
        match self.get(AttributeKey::UnderlinePattern) {
            Some(Attribute::UnderlinePattern(pattern)) => Some(*pattern),
            _ => None,
        }
    }

    pub fn stroke_width(&self) -> Option<f32> {
        match self.get(AttributeKey::StrokeWidth) {
            Some(Attribute::StrokeWidth(width)) => Some(*width),
            _ => None,
        }
    }

    pub fn stroke_color(&self) -> Option<Color> {
        match self.get(AttributeKey::StrokeColor) {
            Some(Attribute::StrokeColor(color)) => Some(*color),
            _ => None,
        }
    }

    pub fn kern(&self) -> Option<f32> {
        match self.get(AttributeKey::Kern) {
            Some(Attribute::Kern(kern)) => Some(*kern),
            _ => None,
        }
    }

    pub fn shadow_blur(&self) -> Option<f32> {
        match self.get(AttributeKey::ShadowBlur) {
            Some(Attribute::ShadowBlur(blur)) => Some(*blur),
            _ => None,
        }
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Attribute> for AttributeSet {
    fn extend<I: IntoIterator<Item = Attribute>>(&mut self, iter: I) {
        for attribute in iter {
            self.insert(attribute);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::RED));
        assert_eq!(
            Color::from_hex("#80808080"),
            Some(Color::GRAY.with_alpha(0x80))
        );
        assert_eq!(Color::from_hex("FF0000"), None);
        assert_eq!(Color::from_hex("##FF0000"), None);
        assert_eq!(Color::from_hex("#F00"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(Color::BLUE.to_hex(), "#0000FFFF");
    }

    #[test]
    fn test_color_try_from_string() {
        let err = Color::try_from("blue".to_string()).unwrap_err();
        assert!(matches!(err, LabelError::InvalidColor(ref s) if s == "blue"));
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut set = AttributeSet::new();
        assert!(set.insert(Attribute::TextColor(Color::RED)).is_none());
        let previous = set.insert(Attribute::TextColor(Color::BLUE));
        assert_eq!(previous, Some(Attribute::TextColor(Color::RED)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.text_color(), Some(Color::BLUE));
    }

    #[test]
    fn test_merge_overwrites_per_key() {
        let mut base: AttributeSet = [
            Attribute::TextColor(Color::BLACK),
            Attribute::Kern(1.0),
        ]
        .into_iter()
        .collect();
        let overlay = AttributeSet::new()
            .with(Attribute::TextColor(Color::RED))
            .with(Attribute::UnderlineStyle(UnderlineStyle::Single));

        base.merge(&overlay);

        assert_eq!(base.text_color(), Some(Color::RED));
        assert_eq!(base.kern(), Some(1.0));
        assert_eq!(base.underline_style(), Some(UnderlineStyle::Single));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_font_descriptor_builder() {
        let font = FontDescriptor::new("Helvetica", 14.0).bold().italic();
        assert_eq!(font.weight, FontDescriptor::BOLD);
        assert!(font.italic);
        assert_eq!(FontDescriptor::new("x", 1.0).with_weight(50).weight, 100);
    }
}
