//! Links attached to ranges of the text.
//!
//! The [`LinkTable`] keeps two independent sets of links:
//!
//! - **Explicit** links, added by the host with [`LinkTable::add_explicit_link`].
//!   A new explicit link replaces every explicit link it overlaps.
//! - **Auto-detected** links, produced by a detection run and swapped in as a
//!   whole with [`LinkTable::replace_auto_detected`].
//!
//! The two sets may overlap each other freely; precedence between them is
//! decided at hit-test time.

use std::collections::HashSet;
use std::fmt;

use horizon_label_core::logging::targets;

use crate::detector::DetectedKind;
use crate::error::Result;
use crate::range::TextRange;

/// Where a link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkOrigin {
    /// Added directly by the host.
    Explicit,
    /// Produced by a detection run.
    AutoDetected,
}

/// Detector-specific details about an auto-detected match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    /// What kind of data was recognised.
    pub kind: DetectedKind,
    /// The matched text, exactly as it appears in the label.
    pub matched: String,
}

/// The destination a link points at, kept as the URI string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkTarget(String);

impl LinkTarget {
    /// Wrap a URI string.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the target as an absolute URL, if it is one.
    pub fn to_url(&self) -> Option<url::Url> {
        url::Url::parse(&self.0).ok()
    }
}

impl From<&str> for LinkTarget {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for LinkTarget {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl From<url::Url> for LinkTarget {
    fn from(url: url::Url) -> Self {
        Self(url.into())
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A link over a range of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// The linked span.
    pub range: TextRange,
    /// Where the link points.
    pub target: LinkTarget,
    /// Who created the link.
    pub origin: LinkOrigin,
    /// Present for auto-detected links.
    pub result: Option<DetectionResult>,
    /// Insertion order within the table; larger is more recent.
    pub(crate) sequence: u64,
}

impl LinkEntry {
    /// Create an explicit link.
    pub fn explicit(range: TextRange, target: impl Into<LinkTarget>) -> Self {
        Self {
            range,
            target: target.into(),
            origin: LinkOrigin::Explicit,
            result: None,
            sequence: 0,
        }
    }

    /// Create an auto-detected link.
    pub fn detected(
        range: TextRange,
        target: impl Into<LinkTarget>,
        result: DetectionResult,
    ) -> Self {
        Self {
            range,
            target: target.into(),
            origin: LinkOrigin::AutoDetected,
            result: Some(result),
            sequence: 0,
        }
    }

    /// Insertion order within the owning table; larger is more recent.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_explicit(&self) -> bool {
        self.origin == LinkOrigin::Explicit
    }
}

/// Explicit and auto-detected links of one text.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    explicit: Vec<LinkEntry>,
    auto_detected: Vec<LinkEntry>,
    next_sequence: u64,
    interactive: bool,
}

impl LinkTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn stamp(&mut self, entry: &mut LinkEntry) {
        self.next_sequence += 1;
        entry.sequence = self.next_sequence;
    }

    /// Add an explicit link over `range`, validated against `text`.
    ///
    /// Every explicit link overlapping `range` is replaced. Enables
    /// interactive content.
    pub fn add_explicit_link(
        &mut self,
        range: TextRange,
        target: impl Into<LinkTarget>,
        text: &str,
    ) -> Result<()> {
        range.validate(text)?;

        let before = self.explicit.len();
        self.explicit.retain(|entry| !entry.range.overlaps(&range));
        let replaced = before - self.explicit.len();

        let mut entry = LinkEntry::explicit(range, target);
        self.stamp(&mut entry);
        tracing::debug!(
            target: targets::LINKS,
            %range,
            target_uri = %entry.target,
            replaced,
            "explicit link added"
        );
        self.explicit.push(entry);
        self.interactive = true;
        Ok(())
    }

    /// Remove every explicit link. Auto-detected links are untouched.
    pub fn remove_all_explicit(&mut self) {
        if !self.explicit.is_empty() {
            tracing::debug!(
                target: targets::LINKS,
                count = self.explicit.len(),
                "explicit links removed"
            );
        }
        self.explicit.clear();
    }

    /// Swap in a complete new set of auto-detected links, returning how many
    /// were kept.
    ///
    /// Entries whose range does not fit `text`, or repeats the range of an
    /// earlier entry, are dropped. The rest are re-stamped so the whole set
    /// is newer than anything already in the table. A non-empty set enables
    /// interactive content.
    pub fn replace_auto_detected(&mut self, entries: Vec<LinkEntry>, text: &str) -> usize {
        let offered = entries.len();
        let mut ranges = HashSet::with_capacity(offered);
        let mut kept = Vec::with_capacity(offered);
        for mut entry in entries {
            if let Err(error) = entry.range.validate(text) {
                tracing::debug!(
                    target: targets::LINKS,
                    range = %entry.range,
                    %error,
                    "detected link does not fit the text, dropped"
                );
                continue;
            }
            if !ranges.insert(entry.range) {
                tracing::debug!(
                    target: targets::LINKS,
                    range = %entry.range,
                    "detected link repeats an earlier range, dropped"
                );
                continue;
            }
            entry.origin = LinkOrigin::AutoDetected;
            self.stamp(&mut entry);
            kept.push(entry);
        }

        tracing::debug!(
            target: targets::LINKS,
            previous = self.auto_detected.len(),
            offered,
            count = kept.len(),
            "auto-detected links replaced"
        );
        if !kept.is_empty() {
            self.interactive = true;
        }
        self.auto_detected = kept;
        self.auto_detected.len()
    }

    /// Drop every link of both origins and disable interactive content.
    pub fn clear(&mut self) {
        self.explicit.clear();
        self.auto_detected.clear();
        self.interactive = false;
    }

    /// Whether link interaction has been enabled by adding any link.
    pub fn has_interactive_content(&self) -> bool {
        self.interactive
    }

    /// All entries of both origins overlapping `range`, in no particular order.
    ///
    /// The iterator is lazy and can be cloned to restart the scan.
    pub fn entries_overlapping(
        &self,
        range: TextRange,
    ) -> impl Iterator<Item = &LinkEntry> + Clone + '_ {
        self.iter().filter(move |entry| entry.range.overlaps(&range))
    }

    /// All entries of both origins.
    pub fn iter(&self) -> impl Iterator<Item = &LinkEntry> + Clone + '_ {
        self.explicit.iter().chain(self.auto_detected.iter())
    }

    pub fn explicit_links(&self) -> &[LinkEntry] {
        &self.explicit
    }

    pub fn auto_detected_links(&self) -> &[LinkEntry] {
        &self.auto_detected
    }

    pub fn len(&self) -> usize {
        self.explicit.len() + self.auto_detected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.auto_detected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LabelError;

    const TEXT: &str = "Visit http://x.com now";

    fn detected(start: usize, length: usize, uri: &str) -> LinkEntry {
        LinkEntry::detected(
            TextRange::new(start, length),
            uri,
            DetectionResult {
                kind: DetectedKind::Link,
                matched: uri.to_string(),
            },
        )
    }

    #[test]
    fn test_explicit_link_replaces_same_range() {
        let mut table = LinkTable::new();
        table.add_explicit_link(TextRange::new(0, 5), "a", TEXT).unwrap();
        table.add_explicit_link(TextRange::new(0, 5), "b", TEXT).unwrap();

        assert_eq!(table.explicit_links().len(), 1);
        assert_eq!(table.explicit_links()[0].target.as_str(), "b");
    }

    #[test]
    fn test_explicit_link_replaces_overlapping() {
        let mut table = LinkTable::new();
        table.add_explicit_link(TextRange::new(0, 5), "a", TEXT).unwrap();
        table.add_explicit_link(TextRange::new(10, 2), "keep", TEXT).unwrap();
        table.add_explicit_link(TextRange::new(3, 4), "c", TEXT).unwrap();

        let targets: Vec<&str> = table.explicit_links().iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["keep", "c"]);
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let mut table = LinkTable::new();
        let err = table
            .add_explicit_link(TextRange::new(20, 5), "a", TEXT)
            .unwrap_err();
        assert!(matches!(err, LabelError::RangeOutOfBounds { .. }));
        assert!(table.is_empty());
        assert!(!table.has_interactive_content());
    }

    #[test]
    fn test_remove_all_explicit_is_idempotent() {
        let mut table = LinkTable::new();
        table.add_explicit_link(TextRange::new(0, 5), "a", TEXT).unwrap();
        table.replace_auto_detected(vec![detected(6, 12, "http://x.com")], TEXT);

        table.remove_all_explicit();
        assert!(table.explicit_links().is_empty());
        assert_eq!(table.auto_detected_links().len(), 1);

        table.remove_all_explicit();
        assert!(table.explicit_links().is_empty());
        assert_eq!(table.auto_detected_links().len(), 1);
    }

    #[test]
    fn test_replace_auto_detected_swaps_whole_set() {
        let mut table = LinkTable::new();
        table.replace_auto_detected(vec![detected(0, 5, "a"), detected(6, 12, "b")], TEXT);
        table.replace_auto_detected(vec![detected(19, 3, "c")], TEXT);

        assert_eq!(table.auto_detected_links().len(), 1);
        assert_eq!(table.auto_detected_links()[0].target.as_str(), "c");
        assert!(table.has_interactive_content());
    }

    #[test]
    fn test_replace_auto_detected_drops_invalid_and_repeated_ranges() {
        let mut table = LinkTable::new();
        let kept = table.replace_auto_detected(
            vec![
                detected(6, 12, "http://x.com"),
                detected(20, 10, "past the end"),
                detected(6, 12, "again"),
                detected(19, 3, "now"),
            ],
            TEXT,
        );

        assert_eq!(kept, 2);
        let targets: Vec<&str> =
            table.auto_detected_links().iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["http://x.com", "now"]);

        assert_eq!(table.replace_auto_detected(vec![detected(0, 40, "a")], TEXT), 0);
        assert!(table.auto_detected_links().is_empty());
    }

    #[test]
    fn test_empty_explicit_link_keeps_enclosing_link() {
        let mut table = LinkTable::new();
        table.add_explicit_link(TextRange::new(0, 10), "a", TEXT).unwrap();
        table.add_explicit_link(TextRange::new(5, 0), "b", TEXT).unwrap();
        assert_eq!(table.explicit_links().len(), 2);

        table.add_explicit_link(TextRange::new(5, 0), "c", TEXT).unwrap();
        let targets: Vec<&str> = table.explicit_links().iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["a", "c"]);
    }

    #[test]
    fn test_entries_overlapping_is_restartable() {
        let mut table = LinkTable::new();
        table.add_explicit_link(TextRange::new(6, 4), "explicit", TEXT).unwrap();
        table.replace_auto_detected(
            vec![detected(6, 12, "http://x.com"), detected(19, 3, "now")],
            TEXT,
        );

        let hits = table.entries_overlapping(TextRange::new(8, 2));
        assert_eq!(hits.clone().count(), 2);
        assert_eq!(hits.count(), 2);
        assert_eq!(table.entries_overlapping(TextRange::full(TEXT)).count(), 3);
        assert_eq!(table.entries_overlapping(TextRange::new(0, 6)).count(), 0);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut table = LinkTable::new();
        table.add_explicit_link(TextRange::new(0, 5), "a", TEXT).unwrap();
        table.replace_auto_detected(vec![detected(6, 12, "http://x.com")], TEXT);

        table.clear();

        assert!(table.is_empty());
        assert!(!table.has_interactive_content());
        assert_eq!(table.entries_overlapping(TextRange::full(TEXT)).count(), 0);
    }

    #[test]
    fn test_sequence_increases() {
        let mut table = LinkTable::new();
        table.add_explicit_link(TextRange::new(0, 5), "a", TEXT).unwrap();
        table.replace_auto_detected(vec![detected(6, 12, "http://x.com")], TEXT);

        assert!(table.auto_detected_links()[0].sequence() > table.explicit_links()[0].sequence());
    }

    #[test]
    fn test_link_target_to_url() {
        assert!(LinkTarget::from("a").to_url().is_none());
        let url = LinkTarget::from("https://example.com/x").to_url().unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }
}
