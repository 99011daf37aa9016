//! Error types for the attributed label.

use std::path::PathBuf;

/// Result type alias for label operations.
pub type Result<T> = std::result::Result<T, LabelError>;

/// Errors that can occur while styling, linking or configuring a label.
///
/// Every error is local and leaves the label unchanged.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    /// A style or link was applied to a span that does not fit the text.
    #[error("range {start}..{start}+{length} is out of bounds for text of length {text_len}")]
    RangeOutOfBounds {
        start: usize,
        length: usize,
        text_len: usize,
    },

    /// A range boundary falls inside a multi-byte character.
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// The configuration could not be parsed.
    #[error("invalid label configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read label configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A color string was not `#RRGGBB` or `#RRGGBBAA`.
    #[error("invalid color '{0}', expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    /// An unknown detector type name appeared in the configuration.
    #[error("unknown detector type '{0}'")]
    UnknownDetectorType(String),

    /// A core runtime error, such as a failure to build the detection pool.
    #[error(transparent)]
    Core(#[from] horizon_label_core::CoreError),
}

impl LabelError {
    /// Create an out-of-bounds error.
    pub fn out_of_bounds(start: usize, length: usize, text_len: usize) -> Self {
        Self::RangeOutOfBounds {
            start,
            length,
            text_len,
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
