//! # Per-submission task specification.
//!
//! [`TaskSpec`] bundles the scheduling policy of one submission: priority
//! class, retry budget, and per-attempt timeout.
//!
//! A spec can be created:
//! - **Explicitly** with [`TaskSpec::new`] (full control)
//! - **From config** with [`TaskSpec::with_defaults`] (inherit defaults)

use std::time::Duration;

use crate::{config::SchedulerConfig, tasks::Priority};

/// Scheduling policy for one submission.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use taskpool::{Priority, SchedulerConfig, TaskSpec};
///
/// // Explicit configuration:
/// let spec = TaskSpec::new(Priority::High, 3, Some(Duration::from_secs(5)));
/// assert_eq!(spec.max_retries(), 3);
///
/// // Inherit from config (`timeout = 0s` is treated as `None`):
/// let cfg = SchedulerConfig::default();
/// let spec = TaskSpec::with_defaults(&cfg).with_priority(Priority::Low);
/// assert!(spec.timeout().is_none());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskSpec {
    priority: Priority,
    max_retries: u32,
    timeout: Option<Duration>,
}

impl TaskSpec {
    /// Creates a specification with explicit parameters.
    pub fn new(priority: Priority, max_retries: u32, timeout: Option<Duration>) -> Self {
        Self {
            priority,
            max_retries,
            timeout,
        }
    }

    /// Creates a specification inheriting defaults from the scheduler
    /// config.
    ///
    /// Uses `SchedulerConfig::default_timeout()` so that `0s` in config is
    /// treated as `None`.
    pub fn with_defaults(cfg: &SchedulerConfig) -> Self {
        Self {
            priority: Priority::default(),
            max_retries: cfg.max_retries,
            timeout: cfg.default_timeout(),
        }
    }

    /// Returns the priority class.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the per-attempt timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns a new spec with an updated priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Returns a new spec with an updated retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a new spec with an updated timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
