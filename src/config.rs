//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`], the centralized settings recognized at
//! construction time.
//!
//! Config is used in two ways:
//! 1. **Scheduler creation**: `Scheduler::builder(config).build()`
//! 2. **TaskSpec defaults**: `TaskSpec::with_defaults(&config)`
//!
//! ## Sentinel values
//! - `max_queue_size = 0` → unbounded ready queue (submissions never rejected)
//! - `timeout = 0s` → no default timeout (treated as `None` by `TaskSpec::with_defaults`)
//! - `grace = 0s` → `stop()` waits for in-flight work indefinitely

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Global configuration for the scheduler.
///
/// ## Field semantics
/// - `max_workers`: worker pool size (clamped to a minimum of 1)
/// - `max_queue_size`: ready queue capacity (`0` = unbounded)
/// - `timeout`: default per-attempt timeout (`0s` = no timeout)
/// - `max_retries`: default retry budget applied when a submission omits it
/// - `backoff`: delay policy between a failed attempt and its retry
/// - `grace`: how long `stop()` waits for in-flight attempts (`0s` = forever)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Number of concurrent workers drawing from the ready queue.
    pub max_workers: usize,

    /// Ready queue capacity.
    ///
    /// - `0` = unbounded (submissions are never rejected)
    /// - `n > 0` = at most `n` pending ids; `submit` fails with
    ///   [`SchedulerError::QueueFull`](crate::SchedulerError::QueueFull) beyond that
    pub max_queue_size: usize,

    /// Default per-attempt timeout.
    ///
    /// - `Duration::ZERO` = no timeout (attempt runs until it returns)
    /// - `> 0` = attempts are abandoned at the deadline
    ///
    /// Used by `TaskSpec::with_defaults()`. Can be overridden per task.
    pub timeout: Duration,

    /// Default retry budget for failed or timed-out attempts.
    ///
    /// Used by `TaskSpec::with_defaults()`. Can be overridden per task.
    pub max_retries: u32,

    /// Backoff policy applied between a failed attempt and its retry.
    pub backoff: BackoffPolicy,

    /// Maximum time `stop()` waits for in-flight attempts to finish.
    ///
    /// - `Duration::ZERO` = wait indefinitely
    /// - `> 0` = abort remaining workers at the deadline and report the
    ///   still-running tasks via `SchedulerError::GraceExceeded`
    pub grace: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Subscribers that lag more than `bus_capacity` events behind skip
    /// the oldest items. Minimum value is 1 (enforced by the bus).
    pub bus_capacity: usize,
}

impl SchedulerConfig {
    /// Returns the worker pool size clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.max_workers.max(1)
    }

    /// Returns the ready queue capacity as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` pending ids
    #[inline]
    pub fn queue_capacity(&self) -> Option<usize> {
        if self.max_queue_size == 0 {
            None
        } else {
            Some(self.max_queue_size)
        }
    }

    /// Returns the default per-attempt timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → attempts abandoned after `d`
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the shutdown grace window as an `Option`.
    ///
    /// - `None` → wait indefinitely for in-flight attempts
    /// - `Some(d)` → force termination after `d`
    #[inline]
    pub fn grace_limit(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `max_workers = 4`
    /// - `max_queue_size = 0` (unbounded)
    /// - `timeout = 0s` (no timeout)
    /// - `max_retries = 0` (no retries)
    /// - `backoff = BackoffPolicy::default()` (exponential, 100ms base)
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_workers: 4,
            max_queue_size: 0,
            timeout: Duration::ZERO,
            max_retries: 0,
            backoff: BackoffPolicy::default(),
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_queue_size_means_unbounded() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.queue_capacity(), None);

        let bounded = SchedulerConfig {
            max_queue_size: 16,
            ..Default::default()
        };
        assert_eq!(bounded.queue_capacity(), Some(16));
    }

    #[test]
    fn zero_timeout_means_none() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.default_timeout(), None);

        let with_timeout = SchedulerConfig {
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        assert_eq!(with_timeout.default_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn zero_grace_means_wait_forever() {
        let cfg = SchedulerConfig {
            grace: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(cfg.grace_limit(), None);
    }

    #[test]
    fn workers_clamped_to_one() {
        let cfg = SchedulerConfig {
            max_workers: 0,
            ..Default::default()
        };
        assert_eq!(cfg.workers_clamped(), 1);
    }
}
