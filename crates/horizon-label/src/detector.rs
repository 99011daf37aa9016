//! Link detection.
//!
//! A [`LinkDetector`] turns a text snapshot into candidate [`LinkEntry`]s.
//! Detection is a pure function of its input, so it can run either inline
//! ([`DetectionMode::Immediate`]) or as a [`DetectionJob`] on a background
//! executor ([`DetectionMode::Deferred`]).
//!
//! Deferred jobs report back through a channel owned by the
//! [`DetectionScheduler`]. Each job carries the generation of the text it was
//! created for; the owner applies a result only while that generation is
//! still current, so a job superseded by a later edit can never publish stale
//! links. Superseded jobs also have their [`CancellationToken`] cancelled,
//! which lets them skip sending a result at all.

use std::fmt;
use std::ops::BitOr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use horizon_label_core::logging::{span_names, targets};
use horizon_label_core::{CancellationToken, Executor, PerfSpan};
use regex::Regex;
use serde::Deserialize;

use crate::error::{LabelError, Result};
use crate::link::{DetectionResult, LinkEntry, LinkTarget};
use crate::range::TextRange;

/// A bitmask of the kinds of data a detector should look for.
///
/// Deserializes from a list of type names, see [`DetectorTypes::from_names`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct DetectorTypes(u32);

impl DetectorTypes {
    /// Detect nothing.
    pub const NONE: Self = Self(0);
    /// Web and FTP URLs, including bare `www.` hosts.
    pub const LINK: Self = Self(1 << 0);
    /// E-mail addresses, linked as `mailto:`.
    pub const EMAIL: Self = Self(1 << 1);
    /// Phone numbers, linked as `tel:`.
    pub const PHONE_NUMBER: Self = Self(1 << 2);
    /// Every supported kind.
    pub const ALL: Self = Self(Self::LINK.0 | Self::EMAIL.0 | Self::PHONE_NUMBER.0);

    /// Raw bit value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every kind in `other` is requested.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parse a list of type names (`"link"`, `"email"`, `"phone_number"`).
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(Self::NONE, |types, name| {
            let kind = match name.as_ref() {
                "link" | "url" => Self::LINK,
                "email" => Self::EMAIL,
                "phone_number" | "phone" => Self::PHONE_NUMBER,
                "all" => Self::ALL,
                other => return Err(LabelError::UnknownDetectorType(other.to_string())),
            };
            Ok(types | kind)
        })
    }
}

impl Default for DetectorTypes {
    fn default() -> Self {
        Self::LINK
    }
}

impl TryFrom<Vec<String>> for DetectorTypes {
    type Error = LabelError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::from_names(names)
    }
}

impl BitOr for DetectorTypes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The kind of data a detected link was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectedKind {
    Link,
    Email,
    PhoneNumber,
}

impl DetectedKind {
    fn detector_type(self) -> DetectorTypes {
        match self {
            Self::Link => DetectorTypes::LINK,
            Self::Email => DetectorTypes::EMAIL,
            Self::PhoneNumber => DetectorTypes::PHONE_NUMBER,
        }
    }
}

/// Finds links in text.
///
/// Implementations must be deterministic for a given input and must never
/// report two entries over overlapping ranges.
pub trait LinkDetector: Send + Sync + fmt::Debug {
    /// Scan `text` for the requested kinds of data.
    fn detect(&self, text: &str, types: DetectorTypes) -> Vec<LinkEntry>;
}

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:(?:https?|ftp)://|www\.)[^\s<>"]+"#).expect("valid URL pattern")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}\b")
        .expect("valid e-mail pattern")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d[\d\s().-]{5,}\d").expect("valid phone pattern")
});

/// Minimum and maximum digit counts accepted as a phone number.
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

/// Regex-based detector for URLs, e-mail addresses and phone numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDetector;

struct Candidate {
    range: TextRange,
    kind: DetectedKind,
    target: LinkTarget,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self
    }

    fn urls(text: &str, out: &mut Vec<Candidate>) {
        for m in URL_RE.find_iter(text) {
            let matched = trim_trailing_punctuation(m.as_str());
            let uri = if matched.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("www.")) {
                format!("http://{matched}")
            } else {
                matched.to_string()
            };
            let Ok(url) = url::Url::parse(&uri) else {
                tracing::trace!(
                    target: targets::DETECTOR,
                    candidate = matched,
                    "unparseable URL skipped"
                );
                continue;
            };
            if url.host_str().is_none() {
                continue;
            }
            out.push(Candidate {
                range: TextRange::new(m.start(), matched.len()),
                kind: DetectedKind::Link,
                target: url.into(),
            });
        }
    }

    fn emails(text: &str, out: &mut Vec<Candidate>) {
        for m in EMAIL_RE.find_iter(text) {
            out.push(Candidate {
                range: TextRange::new(m.start(), m.len()),
                kind: DetectedKind::Email,
                target: LinkTarget::new(format!("mailto:{}", m.as_str())),
            });
        }
    }

    fn phone_numbers(text: &str, out: &mut Vec<Candidate>) {
        for m in PHONE_RE.find_iter(text) {
            let preceded_by_word = text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
            let followed_by_word = text[m.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
            if preceded_by_word || followed_by_word {
                continue;
            }

            let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
            if !PHONE_DIGITS.contains(&digits.len()) {
                continue;
            }
            let plus = if m.as_str().starts_with('+') { "+" } else { "" };
            out.push(Candidate {
                range: TextRange::new(m.start(), m.len()),
                kind: DetectedKind::PhoneNumber,
                target: LinkTarget::new(format!("tel:{plus}{digits}")),
            });
        }
    }
}

impl LinkDetector for PatternDetector {
    fn detect(&self, text: &str, types: DetectorTypes) -> Vec<LinkEntry> {
        let mut candidates = Vec::new();
        if types.contains(DetectorTypes::LINK) {
            Self::urls(text, &mut candidates);
        }
        if types.contains(DetectorTypes::EMAIL) {
            Self::emails(text, &mut candidates);
        }
        if types.contains(DetectorTypes::PHONE_NUMBER) {
            Self::phone_numbers(text, &mut candidates);
        }

        // Earliest start wins; on a tie the longer match wins.
        candidates.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.length.cmp(&a.range.length))
        });

        let mut covered_until = 0;
        let mut entries = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            debug_assert!(types.contains(candidate.kind.detector_type()));
            if candidate.range.start < covered_until {
                continue;
            }
            covered_until = candidate.range.end();
            let matched = candidate.range.slice(text).unwrap_or_default().to_string();
            entries.push(LinkEntry::detected(
                candidate.range,
                candidate.target,
                DetectionResult {
                    kind: candidate.kind,
                    matched,
                },
            ));
        }
        entries
    }
}

/// Strip sentence punctuation a URL pattern swallows at the end of a match.
///
/// A closing parenthesis is kept while it balances an opening one inside the
/// match, so `https://en.wikipedia.org/wiki/Rust_(language)` survives intact.
fn trim_trailing_punctuation(s: &str) -> &str {
    let mut end = s.len();
    loop {
        let candidate = &s[..end];
        let Some(last) = candidate.chars().next_back() else {
            break;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' => true,
            ')' => candidate.matches('(').count() < candidate.matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    &s[..end]
}

/// How a label runs link detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    /// The caller blocks until detection finishes.
    #[default]
    Immediate,
    /// Detection runs on a background executor; results arrive later.
    Deferred,
}

/// A detection request over an immutable text snapshot.
#[derive(Debug, Clone)]
pub struct DetectionJob {
    /// Scheduler-assigned id, unique per scheduler.
    pub id: u64,
    /// The text as it was when the job was created.
    pub text: Arc<str>,
    /// Requested kinds of data.
    pub types: DetectorTypes,
    /// Text generation the job was created for.
    pub generation: u64,
    /// Cancelled when the job is superseded.
    pub token: CancellationToken,
}

impl DetectionJob {
    /// Run the job, returning `None` if it was cancelled before it finished.
    pub fn run(&self, detector: &dyn LinkDetector) -> Option<DetectionOutcome> {
        if self.token.is_cancelled() {
            tracing::trace!(target: targets::DETECTOR, job = self.id, "job cancelled before start");
            return None;
        }

        let _span = PerfSpan::new(span_names::DETECTION);
        let entries = detector.detect(&self.text, self.types);

        if self.token.is_cancelled() {
            tracing::trace!(
                target: targets::DETECTOR,
                job = self.id,
                "job cancelled, result dropped"
            );
            return None;
        }

        tracing::debug!(
            target: targets::DETECTOR,
            job = self.id,
            generation = self.generation,
            found = entries.len(),
            "detection finished"
        );
        Some(DetectionOutcome {
            job: self.id,
            generation: self.generation,
            entries,
        })
    }
}

/// The result message of a finished detection job.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    /// Id of the job that produced this outcome.
    pub job: u64,
    /// Text generation the job was created for.
    pub generation: u64,
    /// The complete set of detected links.
    pub entries: Vec<LinkEntry>,
}

/// What happened when an outcome was offered to the link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The outcome matched the current text and replaced the detected links.
    Applied { count: usize },
    /// The text changed after the job was created; the outcome was dropped.
    Stale { job_generation: u64, current_generation: u64 },
    /// A later job replaced this one, or detection was switched off; the
    /// outcome was dropped.
    Superseded { job: u64 },
}

#[derive(Debug)]
struct InFlight {
    job: u64,
    generation: u64,
    token: CancellationToken,
}

/// Runs detection jobs and collects their result messages.
///
/// Every run, immediate or deferred, gets a fresh job id. Only the outcome
/// of the most recent job is [current](Self::is_current).
pub struct DetectionScheduler {
    detector: Arc<dyn LinkDetector>,
    executor: Arc<dyn Executor>,
    sender: Sender<DetectionOutcome>,
    receiver: Receiver<DetectionOutcome>,
    in_flight: Option<InFlight>,
    next_job: u64,
    current_job: Option<u64>,
}

impl DetectionScheduler {
    /// Create a scheduler running `detector` on `executor`.
    pub fn new(detector: Arc<dyn LinkDetector>, executor: Arc<dyn Executor>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            detector,
            executor,
            sender,
            receiver,
            in_flight: None,
            next_job: 1,
            current_job: None,
        }
    }

    /// The detector used for both immediate and deferred runs.
    pub fn detector(&self) -> &Arc<dyn LinkDetector> {
        &self.detector
    }

    /// The executor deferred jobs run on.
    pub fn executor(&self) -> Arc<dyn Executor> {
        Arc::clone(&self.executor)
    }

    fn begin_job(&mut self) -> u64 {
        self.cancel_pending();
        let job = self.next_job;
        self.next_job += 1;
        self.current_job = Some(job);
        job
    }

    /// Run detection on the calling thread, superseding any job in flight.
    pub fn detect_now(
        &mut self,
        text: &str,
        types: DetectorTypes,
        generation: u64,
    ) -> DetectionOutcome {
        let job = self.begin_job();
        let _span = PerfSpan::new(span_names::DETECTION);
        DetectionOutcome {
            job,
            generation,
            entries: self.detector.detect(text, types),
        }
    }

    /// Schedule a deferred job, cancelling any job still in flight.
    pub fn schedule(
        &mut self,
        text: Arc<str>,
        types: DetectorTypes,
        generation: u64,
    ) -> CancellationToken {
        let id = self.begin_job();
        let token = CancellationToken::new();
        let job = DetectionJob {
            id,
            text,
            types,
            generation,
            token: token.clone(),
        };
        self.in_flight = Some(InFlight {
            job: id,
            generation,
            token: token.clone(),
        });
        tracing::debug!(target: targets::DETECTOR, job = id, generation, "detection job scheduled");

        let detector = Arc::clone(&self.detector);
        let sender = self.sender.clone();
        self.executor.execute(Box::new(move || {
            if let Some(outcome) = job.run(detector.as_ref()) {
                // The receiver lives as long as the scheduler; a send can
                // only fail after the label itself is gone.
                let _ = sender.send(outcome);
            }
        }));
        token
    }

    /// Cancel the job in flight, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            if in_flight.token.cancel() {
                tracing::debug!(
                    target: targets::DETECTOR,
                    job = in_flight.job,
                    generation = in_flight.generation,
                    "detection job cancelled"
                );
            }
        }
    }

    /// Cancel the job in flight and drop every outcome not yet collected.
    ///
    /// No earlier job is current afterwards, so an outcome that arrives late
    /// is never applied.
    pub fn discard(&mut self) {
        self.cancel_pending();
        self.current_job = None;
        let dropped = self.receiver.try_iter().count();
        if dropped > 0 {
            tracing::debug!(
                target: targets::DETECTOR,
                dropped,
                "queued detection results discarded"
            );
        }
    }

    /// Whether `job` is the most recently started job.
    pub fn is_current(&self, job: u64) -> bool {
        self.current_job == Some(job)
    }

    /// Whether a scheduled job has not yet been collected.
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Collect every result message that has arrived, without blocking.
    pub fn take_completed(&mut self) -> Vec<DetectionOutcome> {
        let outcomes: Vec<DetectionOutcome> = self.receiver.try_iter().collect();
        self.settle(&outcomes);
        outcomes
    }

    /// Block until a result message arrives or `timeout` elapses.
    pub fn wait_completed(&mut self, timeout: Duration) -> Option<DetectionOutcome> {
        let outcome = self.receiver.recv_timeout(timeout).ok()?;
        self.settle(std::slice::from_ref(&outcome));
        Some(outcome)
    }

    fn settle(&mut self, outcomes: &[DetectionOutcome]) {
        if let Some(in_flight) = &self.in_flight {
            if outcomes.iter().any(|o| o.job == in_flight.job) {
                self.in_flight = None;
            }
        }
    }
}

impl fmt::Debug for DetectionScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionScheduler")
            .field("detector", &self.detector)
            .field("synchronous", &self.executor.is_synchronous())
            .field("in_flight", &self.in_flight.as_ref().map(|f| f.job))
            .field("current_job", &self.current_job)
            .field("queued", &self.receiver.len())
            .finish()
    }
}
