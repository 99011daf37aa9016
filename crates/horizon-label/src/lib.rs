//! Attributed text and links for Horizon Label.
//!
//! This crate is the platform-independent engine behind a rich-text label:
//!
//! - **TextModel**: Base text with styled ranges resolved last-writer-wins per attribute
//! - **LinkTable**: Explicit links set by the host and links found by detection
//! - **Detector**: URL, e-mail and phone detection, inline or on a background executor
//! - **HitTester**: Maps an offset to the single link that owns it
//! - **AttributedLabel**: The owner-facing facade tying the above together
//!
//! Offsets and lengths are UTF-8 byte offsets into the label's text. Ranges
//! that do not fit the text, or that split a character, are rejected with a
//! [`LabelError`] and leave the label unchanged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_label::{AttributedLabel, Color, LabelConfig, LinkOrigin, TextRange};
//! use horizon_label_core::InlineExecutor;
//!
//! let mut label = AttributedLabel::with_config(
//!     "Read the guide or visit https://example.com",
//!     &LabelConfig::default().with_auto_detect_links(true),
//! )
//! .with_executor(Arc::new(InlineExecutor));
//!
//! label.set_text_color(Color::GRAY, TextRange::new(0, 4))?;
//! label.add_link("app://guide", TextRange::new(9, 5))?;
//! label.prepare_for_display();
//!
//! assert_eq!(label.hit_test(10).map(|l| l.origin), Some(LinkOrigin::Explicit));
//! assert_eq!(label.hit_test(30).map(|l| l.target.as_str()), Some("https://example.com/"));
//! assert_eq!(label.resolved_attributes(1).text_color(), Some(Color::GRAY));
//! # Ok::<(), horizon_label::LabelError>(())
//! ```

pub mod attributes;
pub mod config;
pub mod detector;
mod error;
pub mod label;
pub mod link;
pub mod model;
mod range;

pub use attributes::{
    Attribute, AttributeKey, AttributeSet, Color, FontDescriptor, UnderlinePattern, UnderlineStyle,
};
pub use config::{DefaultStyle, LabelConfig};
pub use detector::{
    ApplyOutcome, DetectedKind, DetectionJob, DetectionMode, DetectionOutcome, DetectionScheduler,
    DetectorTypes, LinkDetector, PatternDetector,
};
pub use error::{LabelError, Result};
pub use hit_test::HitTester;
pub use label::{AttributedLabel, LinkActivation, Point};
pub use link::{DetectionResult, LinkEntry, LinkOrigin, LinkTable, LinkTarget};
pub use model::{AttributeRun, StyledRange, TextModel};
pub use range::TextRange;

static_assertions::assert_impl_all!(TextModel: Send, Sync);
static_assertions::assert_impl_all!(LinkTable: Send, Sync);
static_assertions::assert_impl_all!(DetectionOutcome: Send);
static_assertions::assert_impl_all!(AttributedLabel: Send);
