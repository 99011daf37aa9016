//! Core systems for Horizon Label.
//!
//! This crate provides the runtime pieces the attributed label is built on:
//!
//! - **Signal/Slot System**: Type-safe observer notification
//! - **Executor**: Background job execution with cooperative cancellation
//! - **Logging**: Tracing targets, span names and helper macros
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_label_core::Signal;
//!
//! let links_changed = Signal::<usize>::new();
//!
//! let conn_id = links_changed.connect(|count| {
//!     println!("{} links available", count);
//! });
//!
//! links_changed.emit(3);
//! links_changed.disconnect(conn_id);
//! ```
//!
//! # Executor Example
//!
//! ```no_run
//! use horizon_label_core::{Executor, ExecutorConfig, ThreadPool};
//!
//! let pool = ThreadPool::new(ExecutorConfig::with_threads(2))?;
//! pool.execute(Box::new(|| println!("running in the background")));
//! # Ok::<(), horizon_label_core::CoreError>(())
//! ```

mod error;
pub mod executor;
pub mod logging;
pub mod signal;

pub use error::{CoreError, Result, SignalError, ThreadPoolError};
pub use executor::{CancellationToken, Executor, ExecutorConfig, InlineExecutor, Job, ThreadPool};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
