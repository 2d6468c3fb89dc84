//! # Runtime events emitted by the scheduler and its workers.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Lifecycle events**: task execution flow (submitted, starting,
//!   completed, failed, timeout, retry, cancel)
//! - **Scheduler events**: pool start/stop and shutdown progress
//! - **Subscriber diagnostics**: overflow and panic reports
//!
//! The [`Event`] struct carries optional metadata such as the task id and
//! name, attempt number, backoff delay, and failure reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::tasks::TaskId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of scheduler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Scheduler events ===
    /// Worker pool spawned; the scheduler is accepting work.
    SchedulerStarted,

    /// `stop()` was called; workers will exit after their current attempt.
    ShutdownRequested,

    /// All workers exited within the configured grace window.
    AllStoppedWithin,

    /// Grace window exceeded; remaining workers were aborted.
    ///
    /// Sets `reason` to the list of still-running task names.
    GraceExceeded,

    // === Task lifecycle events ===
    /// A submission was accepted and enqueued.
    ///
    /// Sets: `id`, `task`.
    TaskSubmitted,

    /// A submission was rejected because the ready queue is at capacity.
    ///
    /// Sets: `task`, `reason`.
    QueueFull,

    /// A worker claimed the task and is starting an attempt.
    ///
    /// Sets: `id`, `task`, `attempt` (1-based).
    TaskStarting,

    /// The task finished successfully.
    ///
    /// Sets: `id`, `task`, `attempt`.
    TaskCompleted,

    /// The task reached a terminal failure (job error or timeout with
    /// retries exhausted).
    ///
    /// Sets: `id`, `task`, `attempt`, `reason`.
    TaskFailed,

    /// An attempt exceeded its configured timeout and was abandoned.
    ///
    /// Sets: `id`, `task`, `timeout_ms`.
    TimeoutHit,

    /// A failed attempt was scheduled for retry.
    ///
    /// Sets: `id`, `task`, `attempt` (the failed one), `delay_ms`, `reason`.
    RetryScheduled,

    /// Cooperative cancellation was requested for a running task.
    ///
    /// Sets: `id`, `task`.
    CancelRequested,

    /// The task was finalized as cancelled.
    ///
    /// Sets: `id`, `task`.
    TaskCancelled,

    // === Subscriber diagnostics ===
    /// A subscriber panicked while processing an event.
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    SubscriberOverflow,
}

/// Scheduler event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task identifier, if applicable.
    pub id: Option<TaskId>,
    /// Task name, if applicable.
    pub task: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before the next attempt, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Attempt timeout, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            id: None,
            task: None,
            attempt: None,
            delay_ms: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Attaches a task identifier.
    #[inline]
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
