//! The attributed text model.
//!
//! [`TextModel`] owns an immutable base text, whole-text default attributes
//! and an append-only list of [`StyledRange`]s. Overlaps are never split at
//! write time: [`TextModel::resolved_attributes`] layers the ranges covering an
//! offset in the order they were applied, so the most recently applied value
//! wins per attribute key.
//!
//! # Example
//!
//! ```
//! use horizon_label::{Attribute, Color, TextModel, TextRange};
//!
//! let mut model = TextModel::new("Hello, World!");
//! model.apply_style(TextRange::new(0, 10), Attribute::TextColor(Color::RED))?;
//! model.apply_style(TextRange::new(5, 8), Attribute::TextColor(Color::BLUE))?;
//!
//! assert_eq!(model.resolved_attributes(7).text_color(), Some(Color::BLUE));
//! assert_eq!(model.resolved_attributes(2).text_color(), Some(Color::RED));
//! # Ok::<(), horizon_label::LabelError>(())
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use horizon_label_core::logging::{span_names, targets};
use horizon_label_core::PerfSpan;

use crate::attributes::{
    Attribute, AttributeSet, Color, FontDescriptor, UnderlinePattern, UnderlineStyle,
};
use crate::error::Result;
use crate::range::TextRange;

/// A style applied to a span of text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRange {
    /// The styled span.
    pub range: TextRange,
    /// The attribute applied over the span.
    pub attribute: Attribute,
}

/// A maximal run of text whose resolved attributes are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRun {
    /// The span of the run.
    pub range: TextRange,
    /// Attributes in effect over the whole run.
    pub attributes: AttributeSet,
}

/// Base text plus ordered, non-destructive style ranges.
#[derive(Debug, Clone, Default)]
pub struct TextModel {
    text: Arc<str>,
    generation: u64,
    ranges: Vec<StyledRange>,
    defaults: AttributeSet,
}

impl TextModel {
    /// Create a model over `text` with no styles.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Arc::from(text.into()),
            ..Default::default()
        }
    }

    /// The base text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// A cheap shared snapshot of the base text.
    pub fn snapshot(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Counter bumped by every [`set_text`](Self::set_text).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the base text, dropping every styled range.
    ///
    /// Default attributes are kept.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Arc::from(text.into());
        self.ranges.clear();
        self.generation += 1;
        tracing::debug!(
            target: targets::MODEL,
            generation = self.generation,
            len = self.text.len(),
            "text replaced"
        );
    }

    /// Apply `attribute` over `range`.
    ///
    /// Fails without effect when the range does not fit the text.
    pub fn apply_style(&mut self, range: TextRange, attribute: Attribute) -> Result<()> {
        range.validate(&self.text)?;
        tracing::trace!(target: targets::MODEL, %range, key = ?attribute.key(), "style applied");
        self.ranges.push(StyledRange { range, attribute });
        Ok(())
    }

    /// Apply every attribute of `attributes` over `range`, in key order.
    pub fn apply_styles(&mut self, range: TextRange, attributes: &AttributeSet) -> Result<()> {
        range.validate(&self.text)?;
        self.ranges.extend(attributes.iter().map(|attribute| StyledRange {
            range,
            attribute: attribute.clone(),
        }));
        Ok(())
    }

    pub fn set_text_color(&mut self, color: Color, range: TextRange) -> Result<()> {
        self.apply_style(range, Attribute::TextColor(color))
    }

    pub fn set_font(&mut self, font: FontDescriptor, range: TextRange) -> Result<()> {
        self.apply_style(range, Attribute::Font(font))
    }

    /// Set both the underline style and its dash pattern over `range`.
    pub fn set_underline_style(
        &mut self,
        style: UnderlineStyle,
        pattern: UnderlinePattern,
        range: TextRange,
    ) -> Result<()> {
        range.validate(&self.text)?;
        self.ranges.push(StyledRange {
            range,
            attribute: Attribute::UnderlineStyle(style),
        });
        self.ranges.push(StyledRange {
            range,
            attribute: Attribute::UnderlinePattern(pattern),
        });
        Ok(())
    }

    pub fn set_stroke_width(&mut self, width: f32, range: TextRange) -> Result<()> {
        self.apply_style(range, Attribute::StrokeWidth(width))
    }

    pub fn set_stroke_color(&mut self, color: Color, range: TextRange) -> Result<()> {
        self.apply_style(range, Attribute::StrokeColor(color))
    }

    pub fn set_text_kern(&mut self, kern: f32, range: TextRange) -> Result<()> {
        self.apply_style(range, Attribute::Kern(kern))
    }

    /// Set a whole-text default attribute.
    pub fn set_default(&mut self, attribute: Attribute) {
        self.defaults.insert(attribute);
    }

    /// Replace all whole-text default attributes.
    pub fn set_defaults(&mut self, defaults: AttributeSet) {
        self.defaults = defaults;
    }

    /// The whole-text default attributes.
    pub fn defaults(&self) -> &AttributeSet {
        &self.defaults
    }

    /// Styled ranges in application order.
    pub fn styled_ranges(&self) -> &[StyledRange] {
        &self.ranges
    }

    /// Attributes visible at `offset`: the defaults, overlaid by every range
    /// covering the offset in application order.
    pub fn resolved_attributes(&self, offset: usize) -> AttributeSet {
        let mut resolved = self.defaults.clone();
        for styled in self.ranges.iter().filter(|s| s.range.contains(offset)) {
            resolved.insert(styled.attribute.clone());
        }
        resolved
    }

    /// Split the text into maximal runs with identical resolved attributes.
    ///
    /// Runs are contiguous, ordered and cover the whole text. Empty text
    /// yields no runs.
    pub fn attribute_runs(&self) -> Vec<AttributeRun> {
        let _span = PerfSpan::new(span_names::ATTRIBUTE_RUNS);
        let len = self.text.len();
        if len == 0 {
            return Vec::new();
        }

        let mut boundaries = BTreeSet::new();
        boundaries.insert(0);
        boundaries.insert(len);
        for styled in &self.ranges {
            if !styled.range.is_empty() {
                boundaries.insert(styled.range.start);
                boundaries.insert(styled.range.end());
            }
        }

        let boundaries: Vec<usize> = boundaries.into_iter().collect();
        let mut runs: Vec<AttributeRun> = Vec::with_capacity(boundaries.len());
        for window in boundaries.windows(2) {
            let (start, end) = (window[0], window[1]);
            let attributes = self.resolved_attributes(start);
            match runs.last_mut() {
                Some(last) if last.attributes == attributes => {
                    last.range = TextRange::from_bounds(last.range.start, end);
                }
                _ => runs.push(AttributeRun {
                    range: TextRange::from_bounds(start, end),
                    attributes,
                }),
            }
        }
        runs
    }
}
