//! # Observable task model.
//!
//! Value types returned by the scheduler's inspection APIs: the task
//! identifier, lifecycle status, terminal result, and the point-in-time
//! [`TaskSnapshot`]. All of them serialize, so callers (dashboards, HTTP
//! handlers) can expose them directly.

use std::time::{Duration, SystemTime};

use serde::Serialize;
use uuid::Uuid;

use crate::tasks::Priority;

/// Opaque unique task identifier, assigned at submission.
pub type TaskId = Uuid;

/// Lifecycle status of a task.
///
/// `Pending → Running →` exactly one of `Completed`, `Failed`,
/// `Cancelled`, `TimedOut`. A failed or timed-out attempt with retry
/// budget left returns the task to `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Registered and waiting in the ready queue (or for a retry slot).
    Pending,
    /// Claimed by a worker; an attempt is in flight.
    Running,
    /// Finished successfully.
    Completed,
    /// The job errored and the retry budget is exhausted.
    Failed,
    /// Cancelled before or during execution.
    Cancelled,
    /// The attempt deadline elapsed and the retry budget is exhausted.
    TimedOut,
}

impl TaskStatus {
    /// True for statuses from which no further automatic transition occurs.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }
}

/// Outcome of a task, set exactly once per terminal transition.
///
/// A retry that produces a new terminal outcome overwrites the previous
/// one; callers always observe the latest.
#[derive(Clone, Debug, Serialize)]
pub struct TaskResult {
    /// Whether the task finished successfully.
    pub success: bool,
    /// Payload returned by a successful job, if any.
    pub data: Option<String>,
    /// Captured error message for failed/timed-out/cancelled tasks.
    pub error: Option<String>,
    /// When the terminal transition happened.
    pub finished_at: SystemTime,
}

impl TaskResult {
    pub(crate) fn ok(data: Option<String>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            finished_at: SystemTime::now(),
        }
    }

    pub(crate) fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            finished_at: SystemTime::now(),
        }
    }
}

/// Point-in-time consistent copy of one task's observable fields.
///
/// Produced under the task's lock and detached from it; reading a snapshot
/// never blocks on an in-flight execution.
#[derive(Clone, Debug, Serialize)]
pub struct TaskSnapshot {
    /// Unique identifier assigned at submission.
    pub id: TaskId,
    /// Human-readable job name.
    pub name: String,
    /// Priority class, immutable after submission.
    pub priority: Priority,
    /// Lifecycle status as of the snapshot.
    pub status: TaskStatus,
    /// Failed attempts so far.
    pub retry_count: u32,
    /// Retry budget.
    pub max_retries: u32,
    /// Per-attempt timeout, if configured.
    pub timeout: Option<Duration>,
    /// Submission timestamp.
    pub created_at: SystemTime,
    /// Terminal outcome, if the task has reached one.
    pub result: Option<TaskResult>,
}
