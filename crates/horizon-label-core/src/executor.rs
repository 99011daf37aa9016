//! Background execution for deferred work.
//!
//! Work that must not block the owner thread (link detection over long text,
//! for instance) is handed to an [`Executor`] as a boxed closure. The closure
//! owns everything it needs and reports back by message, so executors never
//! share mutable state with the caller.
//!
//! Two executors are provided:
//!
//! - [`ThreadPool`]: a rayon work-stealing pool, the default for deferred work
//! - [`InlineExecutor`]: runs the job on the calling thread before returning
//!
//! Cooperative cancellation is expressed with [`CancellationToken`]; a job
//! checks the token and skips its remaining work when it has been cancelled.
//!
//! # Example
//!
//! ```no_run
//! use horizon_label_core::executor::{CancellationToken, Executor, ThreadPool};
//!
//! let pool = ThreadPool::global();
//! let token = CancellationToken::new();
//! let job_token = token.clone();
//!
//! pool.execute(Box::new(move || {
//!     if job_token.is_cancelled() {
//!         return;
//!     }
//!     // Expensive computation...
//! }));
//!
//! // The text changed; the job's result is no longer wanted.
//! token.cancel();
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use rayon::{ThreadPool as RayonThreadPool, ThreadPoolBuilder};

use crate::error::{CoreError, ThreadPoolError};
use crate::logging::targets;

/// Global thread pool instance.
static GLOBAL_POOL: OnceLock<ThreadPool> = OnceLock::new();

/// A unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run jobs, possibly on another thread.
pub trait Executor: Send + Sync {
    /// Run `job`, now or later. Must not block on the job's completion
    /// unless the executor is explicitly synchronous.
    fn execute(&self, job: Job);

    /// Whether `execute` completes the job before returning.
    fn is_synchronous(&self) -> bool {
        false
    }
}

/// A cancellation token for cooperative task cancellation.
///
/// Clones share the same flag. Cancelling never interrupts a running job;
/// the job observes the flag at its own checkpoints.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation. Returns `true` if this call flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }
}

/// Configuration for creating a thread pool.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of worker threads. `None` means use the number of CPU cores.
    pub num_threads: Option<usize>,
    /// Name prefix for worker threads.
    pub thread_name: String,
    /// Stack size for worker threads in bytes.
    pub stack_size: Option<usize>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name: "horizon-label-worker".to_string(),
            stack_size: None,
        }
    }
}

impl ExecutorConfig {
    /// Create a configuration with a fixed thread count.
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
            ..Default::default()
        }
    }

    /// Set the thread name prefix.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A thread pool for executing background jobs.
///
/// Uses rayon's work-stealing scheduler.
pub struct ThreadPool {
    pool: RayonThreadPool,
    active_tasks: Arc<AtomicUsize>,
}

impl ThreadPool {
    /// Get the global thread pool instance.
    ///
    /// Lazily initialized with default settings. A pool that cannot be
    /// created at all is unrecoverable for the process, hence the panic.
    pub fn global() -> &'static ThreadPool {
        GLOBAL_POOL.get_or_init(|| {
            ThreadPool::new(ExecutorConfig::default())
                .expect("Failed to create global thread pool")
        })
    }

    /// Initialize the global thread pool with custom configuration.
    ///
    /// Returns an error if the pool has already been initialized.
    pub fn init_global(config: ExecutorConfig) -> Result<&'static ThreadPool, CoreError> {
        let pool = ThreadPool::new(config)?;
        GLOBAL_POOL
            .set(pool)
            .map_err(|_| ThreadPoolError::AlreadyInitialized)?;
        let pool = GLOBAL_POOL
            .get()
            .ok_or(ThreadPoolError::AlreadyInitialized)?;
        crate::label_info!(threads = pool.num_threads(), "global executor initialized");
        Ok(pool)
    }

    /// Create a new thread pool with the given configuration.
    pub fn new(config: ExecutorConfig) -> Result<Self, CoreError> {
        let thread_name = config.thread_name.clone();
        let mut builder =
            ThreadPoolBuilder::new().thread_name(move |index| format!("{}-{}", thread_name, index));

        if let Some(num_threads) = config.num_threads {
            builder = builder.num_threads(num_threads);
        }

        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let pool = builder
            .build()
            .map_err(|e| ThreadPoolError::CreationFailed(e.to_string()))?;

        tracing::debug!(
            target: targets::EXECUTOR,
            threads = pool.current_num_threads(),
            name = %config.thread_name,
            "thread pool created"
        );

        Ok(Self {
            pool,
            active_tasks: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Get the number of threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Get the number of jobs queued or running.
    pub fn active_tasks(&self) -> usize {
        self.active_tasks.load(Ordering::Acquire)
    }
}

impl Executor for ThreadPool {
    fn execute(&self, job: Job) {
        self.active_tasks.fetch_add(1, Ordering::AcqRel);
        let active_tasks = self.active_tasks.clone();

        self.pool.spawn(move || {
            job();
            active_tasks.fetch_sub(1, Ordering::AcqRel);
        });
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads())
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}

impl<E: Executor + ?Sized> Executor for &'static E {
    fn execute(&self, job: Job) {
        (**self).execute(job);
    }

    fn is_synchronous(&self) -> bool {
        (**self).is_synchronous()
    }
}

/// Runs every job on the calling thread, to completion, before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }

    fn is_synchronous(&self) -> bool {
        true
    }
}

static_assertions::assert_impl_all!(ThreadPool: Send, Sync);
static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
