//! Error types used by the scheduler and by job attempts.
//!
//! This module defines two main error enums:
//!
//! - [`SchedulerError`] — errors raised by the scheduling runtime itself.
//! - [`TaskError`] — errors raised by individual job attempts.
//!
//! Both types provide `as_label()` for logging/metrics, and [`TaskError`]
//! additionally exposes [`TaskError::is_retryable`], which the worker pool
//! consults before spending retry budget on a failed attempt.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the scheduling runtime.
///
/// These represent failures of the scheduler itself, as opposed to
/// failures of the submitted jobs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The ready queue is at capacity; the submission was rejected.
    ///
    /// Recoverable by the caller: retry the submission later or shed load.
    /// The task is not registered when this is returned.
    #[error("ready queue at capacity ({capacity}); submission rejected")]
    QueueFull {
        /// The configured queue capacity that was hit.
        capacity: usize,
    },

    /// Shutdown grace period was exceeded; some tasks were still running
    /// when the worker pool was force-terminated.
    #[error("shutdown grace {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of tasks that had not finished in time.
        stuck: Vec<String>,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpool::SchedulerError;
    ///
    /// let err = SchedulerError::QueueFull { capacity: 8 };
    /// assert_eq!(err.as_label(), "queue_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::QueueFull { .. } => "queue_full",
            SchedulerError::GraceExceeded { .. } => "grace_exceeded",
        }
    }
}

/// # Errors produced by job execution.
///
/// These represent failures of individual attempts. Some errors are
/// retryable (`Fail`, `Timeout`); `Fatal` and `Canceled` are not.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The attempt exceeded its timeout and was abandoned.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The attempt failed but may succeed if retried.
    #[error("execution failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// Non-recoverable failure; no retry regardless of remaining budget.
    #[error("fatal error (no retry): {reason}")]
    Fatal {
        /// The underlying error message.
        reason: String,
    },

    /// The attempt observed a cancellation request and stopped.
    #[error("cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Returns `true` for [`TaskError::Fail`] and [`TaskError::Timeout`],
    /// `false` otherwise.
    ///
    /// # Example
    /// ```
    /// use taskpool::TaskError;
    ///
    /// assert!(TaskError::Fail { reason: "boom".into() }.is_retryable());
    /// assert!(!TaskError::Fatal { reason: "nope".into() }.is_retryable());
    /// assert!(!TaskError::Canceled.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Fail { .. } | TaskError::Timeout { .. })
    }
}
