//! The attributed label: text model, links and detection behind one owner.
//!
//! [`AttributedLabel`] is the type hosts hold. It keeps the [`TextModel`] and
//! [`LinkTable`] consistent with each other (replacing the text drops every
//! link), runs detection in the configured [`DetectionMode`], layers link
//! styling over the model's attributes, and reports activity through
//! [`Signal`]s.
//!
//! All mutation happens on the thread that owns the label. In deferred mode
//! the owner calls [`process_detection_results`](AttributedLabel::process_detection_results)
//! from its event loop (or [`wait_for_detection`](AttributedLabel::wait_for_detection)
//! when it has none) to pick up finished detection jobs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_label::{AttributedLabel, LabelConfig, Point};
//! use horizon_label_core::InlineExecutor;
//!
//! let config = LabelConfig::default().with_auto_detect_links(true);
//! let mut label = AttributedLabel::with_config("Visit http://x.com now", &config)
//!     .with_executor(Arc::new(InlineExecutor));
//!
//! label.link_activated().connect(|activation| {
//!     println!("open {}", activation.entry.target);
//! });
//!
//! label.prepare_for_display();
//! assert!(label.activate_link_at(10, Point::new(42.0, 8.0)).is_some());
//! assert!(label.activate_link_at(0, Point::new(1.0, 8.0)).is_none());
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_label_core::logging::{span_names, targets};
use horizon_label_core::{Executor, PerfSpan, Signal, ThreadPool};

use crate::attributes::{
    Attribute, AttributeSet, Color, FontDescriptor, UnderlinePattern, UnderlineStyle,
};
use crate::config::LabelConfig;
use crate::detector::{
    ApplyOutcome, DetectionMode, DetectionOutcome, DetectionScheduler, DetectorTypes,
    LinkDetector, PatternDetector,
};
use crate::error::Result;
use crate::hit_test::HitTester;
use crate::link::{LinkEntry, LinkOrigin, LinkTable, LinkTarget};
use crate::model::{AttributeRun, TextModel};
use crate::range::TextRange;

/// A position in the label's coordinate space, as reported by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Payload of [`AttributedLabel::link_activated`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinkActivation {
    /// The link that was activated.
    pub entry: LinkEntry,
    /// Where the activation happened.
    pub point: Point,
}

/// Attributed text with explicit and detected links.
#[derive(Debug)]
pub struct AttributedLabel {
    model: TextModel,
    links: LinkTable,
    scheduler: DetectionScheduler,

    auto_detect_links: bool,
    detection_mode: DetectionMode,
    detector_types: DetectorTypes,
    /// Detection has run, or is in flight, for the current text.
    links_detected: bool,

    link_color: Option<Color>,
    highlighted_link_background_color: Option<Color>,
    links_have_underlines: bool,
    attributes_for_links: AttributeSet,
    /// Sequence of the highlighted link.
    highlighted: Option<u64>,

    link_activated: Signal<LinkActivation>,
    text_changed: Signal<()>,
    links_changed: Signal<()>,
}

impl AttributedLabel {
    /// Create a label with the default configuration.
    ///
    /// Deferred detection runs on the global [`ThreadPool`].
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_config(text, &LabelConfig::default())
    }

    /// Create a label configured by `config`.
    pub fn with_config(text: impl Into<String>, config: &LabelConfig) -> Self {
        let mut label = Self {
            model: TextModel::new(text),
            links: LinkTable::new(),
            scheduler: DetectionScheduler::new(
                Arc::new(PatternDetector::new()),
                Arc::new(ThreadPool::global()),
            ),
            auto_detect_links: false,
            detection_mode: DetectionMode::Immediate,
            detector_types: DetectorTypes::default(),
            links_detected: false,
            link_color: None,
            highlighted_link_background_color: None,
            links_have_underlines: false,
            attributes_for_links: AttributeSet::new(),
            highlighted: None,
            link_activated: Signal::new(),
            text_changed: Signal::new(),
            links_changed: Signal::new(),
        };
        label.apply_config(config);
        label
    }

    /// Run deferred detection on `executor` instead of the global pool.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        let detector = Arc::clone(self.scheduler.detector());
        self.replace_scheduler(DetectionScheduler::new(detector, executor));
        self
    }

    /// Use `detector` in place of the built-in [`PatternDetector`].
    pub fn with_detector(mut self, detector: Arc<dyn LinkDetector>) -> Self {
        let executor = self.scheduler.executor();
        self.replace_scheduler(DetectionScheduler::new(detector, executor));
        self
    }

    fn replace_scheduler(&mut self, scheduler: DetectionScheduler) {
        self.scheduler.cancel_pending();
        self.scheduler = scheduler;
        self.links_detected = false;
    }

    /// Apply every setting of `config`, replacing the default attributes.
    pub fn apply_config(&mut self, config: &LabelConfig) {
        self.set_auto_detect_links(config.auto_detect_links);
        self.set_detection_mode(config.detection_mode());
        self.set_detector_types(config.detector_types);
        self.link_color = config.link_color;
        self.highlighted_link_background_color = config.highlighted_link_background_color;
        self.links_have_underlines = config.links_have_underlines;
        self.model.set_defaults(config.defaults.to_attributes());
        tracing::debug!(target: targets::LABEL, ?config, "configuration applied");
    }

    // Text and styles

    pub fn text(&self) -> &str {
        self.model.text()
    }

    /// The underlying model, without link styling.
    pub fn model(&self) -> &TextModel {
        &self.model
    }

    /// Replace the text.
    ///
    /// Drops every styled range and every link, cancels any detection in
    /// flight and clears the highlight. Default attributes are kept.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.scheduler.cancel_pending();
        self.model.set_text(text);
        self.links.clear();
        self.links_detected = false;
        self.highlighted = None;
        self.text_changed.emit(());
        self.links_changed.emit(());
    }

    pub fn apply_style(&mut self, range: TextRange, attribute: Attribute) -> Result<()> {
        self.model.apply_style(range, attribute)
    }

    pub fn set_text_color(&mut self, color: Color, range: TextRange) -> Result<()> {
        self.model.set_text_color(color, range)
    }

    pub fn set_font(&mut self, font: FontDescriptor, range: TextRange) -> Result<()> {
        self.model.set_font(font, range)
    }

    pub fn set_underline_style(
        &mut self,
        style: UnderlineStyle,
        pattern: UnderlinePattern,
        range: TextRange,
    ) -> Result<()> {
        self.model.set_underline_style(style, pattern, range)
    }

    pub fn set_stroke_width(&mut self, width: f32, range: TextRange) -> Result<()> {
        self.model.set_stroke_width(width, range)
    }

    pub fn set_stroke_color(&mut self, color: Color, range: TextRange) -> Result<()> {
        self.model.set_stroke_color(color, range)
    }

    pub fn set_text_kern(&mut self, kern: f32, range: TextRange) -> Result<()> {
        self.model.set_text_kern(kern, range)
    }

    /// Set a whole-text default attribute, such as the shadow blur.
    pub fn set_default(&mut self, attribute: Attribute) {
        self.model.set_default(attribute);
    }

    // Links

    /// The link table of the current text.
    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Add an explicit link over `range`.
    pub fn add_link(&mut self, target: impl Into<LinkTarget>, range: TextRange) -> Result<()> {
        self.links.add_explicit_link(range, target, self.model.text())?;
        self.links_changed.emit(());
        Ok(())
    }

    /// Remove every explicit link. Detected links stay.
    pub fn remove_all_explicit_links(&mut self) {
        if self.highlighted_origin() == Some(LinkOrigin::Explicit) {
            self.highlighted = None;
        }
        self.links.remove_all_explicit();
        self.links_changed.emit(());
    }

    /// The link under `offset`.
    pub fn hit_test(&self, offset: usize) -> Option<&LinkEntry> {
        HitTester::new(&self.links).hit_test(offset)
    }

    /// Activate the link under `offset`, emitting [`link_activated`](Self::link_activated).
    pub fn activate_link_at(&self, offset: usize, point: Point) -> Option<LinkEntry> {
        let entry = self.hit_test(offset)?.clone();
        tracing::info!(
            target: targets::LABEL,
            offset,
            target_uri = %entry.target,
            origin = ?entry.origin,
            "link activated"
        );
        self.link_activated.emit(LinkActivation {
            entry: entry.clone(),
            point,
        });
        Some(entry)
    }

    // Highlight

    /// Highlight the link under `offset`, as while it is being pressed.
    ///
    /// Returns whether a link was found. Any previous highlight is replaced.
    pub fn set_highlighted_link(&mut self, offset: usize) -> bool {
        let sequence = self.hit_test(offset).map(LinkEntry::sequence);
        let found = sequence.is_some();
        if self.highlighted != sequence {
            self.highlighted = sequence;
            self.links_changed.emit(());
        }
        found
    }

    pub fn clear_highlight(&mut self) {
        if self.highlighted.take().is_some() {
            self.links_changed.emit(());
        }
    }

    /// The highlighted link, if it still exists.
    pub fn highlighted_link(&self) -> Option<&LinkEntry> {
        let sequence = self.highlighted?;
        self.links.iter().find(|entry| entry.sequence() == sequence)
    }

    fn highlighted_origin(&self) -> Option<LinkOrigin> {
        self.highlighted_link().map(|entry| entry.origin)
    }

    // Link styling

    pub fn link_color(&self) -> Option<Color> {
        self.link_color
    }

    /// Set the text color of links. `None` leaves link text as styled.
    pub fn set_link_color(&mut self, color: Option<Color>) {
        self.link_color = color;
    }

    pub fn highlighted_link_background_color(&self) -> Option<Color> {
        self.highlighted_link_background_color
    }

    pub fn set_highlighted_link_background_color(&mut self, color: Option<Color>) {
        self.highlighted_link_background_color = color;
    }

    pub fn links_have_underlines(&self) -> bool {
        self.links_have_underlines
    }

    pub fn set_links_have_underlines(&mut self, underlined: bool) {
        self.links_have_underlines = underlined;
    }

    pub fn attributes_for_links(&self) -> &AttributeSet {
        &self.attributes_for_links
    }

    /// Extra attributes for links, applied after the link color and underline.
    ///
    /// Replaces any previously set link attributes.
    pub fn set_attributes_for_links(&mut self, attributes: AttributeSet) {
        self.attributes_for_links = attributes;
    }

    fn decorate_link(&self, attributes: &mut AttributeSet, link: &LinkEntry) {
        if let Some(color) = self.link_color {
            attributes.insert(Attribute::TextColor(color));
        }
        if self.links_have_underlines {
            attributes.insert(Attribute::UnderlineStyle(UnderlineStyle::Single));
            attributes.insert(Attribute::UnderlinePattern(UnderlinePattern::Solid));
        }
        attributes.merge(&self.attributes_for_links);
        if self.highlighted == Some(link.sequence()) {
            if let Some(background) = self.highlighted_link_background_color {
                attributes.insert(Attribute::BackgroundColor(background));
            }
        }
    }

    /// Attributes at `offset` including link styling.
    pub fn resolved_attributes(&self, offset: usize) -> AttributeSet {
        let mut attributes = self.model.resolved_attributes(offset);
        if let Some(link) = self.hit_test(offset) {
            self.decorate_link(&mut attributes, link);
        }
        attributes
    }

    /// Maximal runs with identical attributes, including link styling.
    pub fn attribute_runs(&self) -> Vec<AttributeRun> {
        if self.links.is_empty() {
            return self.model.attribute_runs();
        }

        let _span = PerfSpan::new(span_names::ATTRIBUTE_RUNS);
        let mut boundaries: BTreeSet<usize> = BTreeSet::new();
        for run in self.model.attribute_runs() {
            boundaries.insert(run.range.start);
            boundaries.insert(run.range.end());
        }
        for entry in self.links.iter() {
            boundaries.insert(entry.range.start);
            boundaries.insert(entry.range.end());
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

    // Detection

    pub fn auto_detect_links(&self) -> bool {
        self.auto_detect_links
    }

    /// Enable or disable detection on [`prepare_for_display`](Self::prepare_for_display).
    ///
    /// Disabling drops the detected links, cancels detection in flight and
    /// discards results that finished but were not collected yet.
    pub fn set_auto_detect_links(&mut self, enabled: bool) {
        if self.auto_detect_links == enabled {
            return;
        }
        self.auto_detect_links = enabled;
        if !enabled {
            self.scheduler.discard();
            if !self.links.auto_detected_links().is_empty() {
                if self.highlighted_origin() == Some(LinkOrigin::AutoDetected) {
                    self.highlighted = None;
                }
                self.links.replace_auto_detected(Vec::new(), self.model.text());
                self.links_changed.emit(());
            }
        }
        self.links_detected = false;
    }

    pub fn detection_mode(&self) -> DetectionMode {
        self.detection_mode
    }

    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.detection_mode = mode;
    }

    pub fn detector_types(&self) -> DetectorTypes {
        self.detector_types
    }

    /// Change the kinds of detected data. Links are re-detected next time.
    pub fn set_detector_types(&mut self, types: DetectorTypes) {
        if self.detector_types != types {
            self.detector_types = types;
            self.links_detected = false;
        }
    }

    /// Whether a deferred detection job has not been collected yet.
    pub fn is_detection_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Run detection if auto-detection is on and the current text has not
    /// been scanned yet. Call before rendering.
    pub fn prepare_for_display(&mut self) {
        if self.auto_detect_links && !self.links_detected {
            self.detect_links();
        }
    }

    /// Detect links in the current text now, in the configured mode.
    pub fn detect_links(&mut self) {
        self.links_detected = true;
        let generation = self.model.generation();
        match self.detection_mode {
            DetectionMode::Immediate => {
                let outcome = self
                    .scheduler
                    .detect_now(self.model.text(), self.detector_types, generation);
                self.apply_outcome(outcome);
            }
            DetectionMode::Deferred => {
                self.scheduler
                    .schedule(self.model.snapshot(), self.detector_types, generation);
            }
        }
    }

    /// Offer a finished detection result to the link table.
    ///
    /// Results for an older text are dropped, and so are results of any job
    /// other than the latest one. Entries that do not fit the text are
    /// skipped, so `count` is the number of links actually kept.
    pub fn apply_outcome(&mut self, outcome: DetectionOutcome) -> ApplyOutcome {
        let current_generation = self.model.generation();
        if outcome.generation != current_generation {
            tracing::debug!(
                target: targets::LABEL,
                job_generation = outcome.generation,
                current_generation,
                "stale detection result dropped"
            );
            return ApplyOutcome::Stale {
                job_generation: outcome.generation,
                current_generation,
            };
        }

        if !self.scheduler.is_current(outcome.job) {
            tracing::debug!(
                target: targets::LABEL,
                job = outcome.job,
                "superseded detection result dropped"
            );
            return ApplyOutcome::Superseded { job: outcome.job };
        }

        if self.highlighted_origin() == Some(LinkOrigin::AutoDetected) {
            self.highlighted = None;
        }
        let count = self.links.replace_auto_detected(outcome.entries, self.model.text());
        self.links_changed.emit(());
        ApplyOutcome::Applied { count }
    }

    /// Apply finished deferred detection results, without blocking.
    ///
    /// Returns the applied outcome if a result was applied, otherwise what
    /// happened to the last result collected, if any.
    pub fn process_detection_results(&mut self) -> Option<ApplyOutcome> {
        let mut last = None;
        for outcome in self.scheduler.take_completed() {
            let result = self.apply_outcome(outcome);
            if !matches!(last, Some(ApplyOutcome::Applied { .. })) {
                last = Some(result);
            }
        }
        last
    }

    /// Block until the pending detection job is applied or `timeout` elapses.
    ///
    /// Returns the outcome of the applied job, or `None` on timeout or when
    /// no job was pending.
    pub fn wait_for_detection(&mut self, timeout: Duration) -> Option<ApplyOutcome> {
        let deadline = Instant::now() + timeout;
        while self.scheduler.is_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let outcome = self.scheduler.wait_completed(remaining)?;
            let applied = self.apply_outcome(outcome);
            if matches!(applied, ApplyOutcome::Applied { .. }) {
                return Some(applied);
            }
        }
        self.process_detection_results()
    }

    // Signals

    /// Emitted when a link is activated.
    pub fn link_activated(&self) -> &Signal<LinkActivation> {
        &self.link_activated
    }

    /// Emitted after the text is replaced.
    pub fn text_changed(&self) -> &Signal<()> {
        &self.text_changed
    }

    /// Emitted whenever links or link decoration change and the label
    /// should be redrawn.
    pub fn links_changed(&self) -> &Signal<()> {
        &self.links_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectedKind;
    use crate::link::DetectionResult;
    use horizon_label_core::InlineExecutor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEXT: &str = "Visit http://x.com now";

    fn inline(text: &str, config: &LabelConfig) -> AttributedLabel {
        AttributedLabel::with_config(text, config).with_executor(Arc::new(InlineExecutor))
    }

    fn detecting() -> LabelConfig {
        LabelConfig::default().with_auto_detect_links(true)
    }

    /// Reports a repeated range and a range past the end of any short text.
    #[derive(Debug)]
    struct Sloppy;

    impl LinkDetector for Sloppy {
        fn detect(&self, _text: &str, _types: DetectorTypes) -> Vec<LinkEntry> {
            [(6, 12, "http://x.com/"), (6, 12, "http://dup/"), (18, 40, "http://far/")]
                .into_iter()
                .map(|(start, length, uri)| {
                    LinkEntry::detected(
                        TextRange::new(start, length),
                        uri,
                        DetectionResult {
                            kind: DetectedKind::Link,
                            matched: uri.to_string(),
                        },
                    )
                })
                .collect()
        }
    }

    #[test]
    fn test_lazy_detection_on_prepare() {
        let mut label = inline(TEXT, &detecting());
        assert!(label.links().is_empty());

        label.prepare_for_display();
        let hit = label.hit_test(10).unwrap();
        assert_eq!(hit.range, TextRange::new(6, 12));
        assert!(label.hit_test(0).is_none());
    }

    #[test]
    fn test_no_detection_when_disabled() {
        let mut label = inline(TEXT, &LabelConfig::default());
        label.prepare_for_display();
        assert!(label.links().is_empty());
        assert!(label.hit_test(10).is_none());
    }

    #[test]
    fn test_set_text_drops_links_and_styles() {
        let mut label = inline(TEXT, &detecting());
        label.add_link("app://settings", TextRange::new(0, 5)).unwrap();
        label.set_text_color(Color::RED, TextRange::new(0, 5)).unwrap();
        label.prepare_for_display();
        assert_eq!(label.links().len(), 2);

        label.set_text("Plain text");
        assert!(label.links().is_empty());
        assert!(!label.links().has_interactive_content());
        assert!(label.model().styled_ranges().is_empty());
        assert!(label.hit_test(1).is_none());
    }

    #[test]
    fn test_link_styling_order() {
        let mut label = inline(TEXT, &detecting());
        label.set_links_have_underlines(true);
        label.set_text_color(Color::GREEN, TextRange::new(0, 22)).unwrap();
        label.prepare_for_display();

        let link = label.resolved_attributes(8);
        assert_eq!(link.text_color(), Some(Color::BLUE));
        assert_eq!(link.underline_style(), Some(UnderlineStyle::Single));
        assert_eq!(label.resolved_attributes(2).text_color(), Some(Color::GREEN));

        label.set_attributes_for_links(AttributeSet::new().with(Attribute::TextColor(Color::RED)));
        assert_eq!(label.resolved_attributes(8).text_color(), Some(Color::RED));

        label.set_link_color(None);
        label.set_attributes_for_links(AttributeSet::new());
        assert_eq!(label.resolved_attributes(8).text_color(), Some(Color::GREEN));
    }

    #[test]
    fn test_highlight_decorates_link() {
        let mut label = inline(TEXT, &detecting());
        label.prepare_for_display();

        assert!(!label.set_highlighted_link(0));
        assert!(label.set_highlighted_link(7));
        assert_eq!(label.highlighted_link().map(|l| l.range), Some(TextRange::new(6, 12)));
        assert_eq!(
            label.resolved_attributes(7).background_color(),
            Some(Color::GRAY.with_alpha(128))
        );

        label.clear_highlight();
        assert!(label.highlighted_link().is_none());
        assert_eq!(label.resolved_attributes(7).background_color(), None);
    }

    #[test]
    fn test_attribute_runs_split_at_links() {
        let mut label = inline(TEXT, &detecting());
        label.prepare_for_display();

        let runs = label.attribute_runs();
        let ranges: Vec<TextRange> = runs.iter().map(|r| r.range).collect();
        assert_eq!(
            ranges,
            vec![TextRange::new(0, 6), TextRange::new(6, 12), TextRange::new(18, 4)]
        );
        assert_eq!(runs[1].attributes.text_color(), Some(Color::BLUE));
        assert!(runs[2].attributes.is_empty());
    }

    #[test]
    fn test_activation_emits_signal() {
        let label = {
            let mut label = inline(TEXT, &LabelConfig::default());
            label.add_link("https://example.com", TextRange::new(0, 5)).unwrap();
            label
        };
        let activations = Arc::new(AtomicUsize::new(0));
        let counter = activations.clone();
        label.link_activated().connect(move |activation| {
            assert_eq!(activation.entry.target.as_str(), "https://example.com");
            assert_eq!(activation.point, Point::new(3.0, 4.0));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(label.activate_link_at(2, Point::new(3.0, 4.0)).is_some());
        assert!(label.activate_link_at(8, Point::new(3.0, 4.0)).is_none());
        assert_eq!(activations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabling_auto_detection_drops_detected_links() {
        let mut label = inline(TEXT, &detecting());
        label.prepare_for_display();
        assert_eq!(label.links().auto_detected_links().len(), 1);

        label.set_auto_detect_links(false);
        assert!(label.links().auto_detected_links().is_empty());
    }

    #[test]
    fn test_immediate_outcome_for_old_text_is_stale() {
        let mut label = inline(TEXT, &LabelConfig::default());
        let old_generation = label.model().generation();
        label.set_text("Visit http://y.com now");

        let outcome = label.apply_outcome(DetectionOutcome {
            job: 0,
            generation: old_generation,
            entries: Vec::new(),
        });
        assert!(matches!(outcome, ApplyOutcome::Stale { .. }));
    }

    #[test]
    fn test_detected_entries_outside_text_are_dropped() {
        let mut label = inline(TEXT, &detecting().with_deferred_detection(true))
            .with_detector(Arc::new(Sloppy));
        label.prepare_for_display();

        assert_eq!(label.process_detection_results(), Some(ApplyOutcome::Applied { count: 1 }));
        let detected = label.links().auto_detected_links();
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].target.as_str(), "http://x.com/");

        let runs = label.attribute_runs();
        assert_eq!(runs.last().map(|r| r.range.end()), Some(TEXT.len()));
        assert!(label.hit_test(30).is_none());
    }

    #[test]
    fn test_empty_link_keeps_enclosing_link() {
        let mut label = inline("0123456789ab", &LabelConfig::default());
        label.add_link("a", TextRange::new(0, 10)).unwrap();
        label.add_link("b", TextRange::new(5, 0)).unwrap();

        assert_eq!(label.links().explicit_links().len(), 2);
        assert_eq!(label.hit_test(5).map(|l| l.target.as_str()), Some("a"));
    }

    #[test]
    fn test_blocking_links_changed_batches_redraws() {
        let mut label = inline(TEXT, &LabelConfig::default());
        let redraws = Arc::new(AtomicUsize::new(0));
        let counter = redraws.clone();
        label.links_changed().connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        label.links_changed().set_blocked(true);
        label.add_link("a", TextRange::new(0, 5)).unwrap();
        label.add_link("b", TextRange::new(19, 3)).unwrap();
        label.links_changed().set_blocked(false);
        label.links_changed().emit(());

        assert_eq!(redraws.load(Ordering::SeqCst), 1);
        assert_eq!(label.links().explicit_links().len(), 2);
    }
}
