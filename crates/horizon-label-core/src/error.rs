//! Error types for Horizon Label core systems.

use thiserror::Error;

/// The main error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Executor-related error.
    #[error("executor error: {0}")]
    ThreadPool(#[from] ThreadPoolError),

    /// Signal-related error.
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Errors raised while building or using a background executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThreadPoolError {
    /// The global executor has already been initialized.
    #[error("global executor has already been initialized")]
    AlreadyInitialized,

    /// The underlying thread pool could not be created.
    #[error("failed to create thread pool: {0}")]
    CreationFailed(String),
}

/// Signal-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("invalid or disconnected connection ID")]
    InvalidConnection,
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
