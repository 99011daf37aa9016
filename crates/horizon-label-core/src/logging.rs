//! Logging facilities for Horizon Label.
//!
//! This module provides:
//! - Target and span names for filtering `tracing` output by subsystem
//! - [`PerfSpan`], an RAII span for timing expensive operations
//! - `label_*!` macros that log under the core target
//!
//! # Tracing Integration
//!
//! Horizon Label uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_label=debug")
//!         .init();
//! }
//! ```

/// Span names used throughout Horizon Label for tracing.
pub mod span_names {
    /// Link detection pass.
    pub const DETECTION: &str = "horizon_label::detection";
    /// Attribute resolution for rendering.
    pub const ATTRIBUTE_RUNS: &str = "horizon_label::attribute_runs";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_label_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_label_core::signal";
    /// Background executor target.
    pub const EXECUTOR: &str = "horizon_label_core::executor";
    /// Text model target.
    pub const MODEL: &str = "horizon_label::model";
    /// Link table target.
    pub const LINKS: &str = "horizon_label::links";
    /// Link detection target.
    pub const DETECTOR: &str = "horizon_label::detector";
    /// Label facade target.
    pub const LABEL: &str = "horizon_label::label";
    /// Configuration loading target.
    pub const CONFIG: &str = "horizon_label::config";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_label::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// Thin wrappers around the `tracing` macros with consistent target naming.
#[macro_export]
macro_rules! label_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_label_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! label_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_label_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! label_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_label_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! label_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_label_core", $($arg)*)
    };
}
