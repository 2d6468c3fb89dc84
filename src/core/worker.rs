//! # Worker: one executor of the pool.
//!
//! Each worker runs the same loop until shutdown:
//!
//! ```text
//! loop {
//!   ├─► pop highest-priority ready id        (suspends when queue empty)
//!   ├─► claim record: Pending → Running      (skip if cancel won the race)
//!   ├─► publish TaskStarting
//!   ├─► run_once() under the task's timeout
//!   └─► finalize:
//!        ├─ Ok            → Completed                   (unless cancel was requested)
//!        ├─ retryable err → retry_count += 1
//!        │     ├─ budget left → Pending, RetryScheduled,
//!        │     │                requeue after backoff on a detached timer
//!        │     └─ exhausted   → Failed / TimedOut
//!        ├─ fatal err     → Failed (budget ignored)
//!        └─ cancel seen   → Cancelled, no retry
//! }
//! ```
//!
//! ## Rules
//! - A worker holds at most one task's job at a time.
//! - The backoff sleep runs on a spawned timer, never inside the worker,
//!   so a retrying task does not occupy a worker slot.
//! - Shutdown cancels the pop-wait only; an in-flight attempt always runs
//!   to its own completion or timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::{queue::ReadyQueue, registry::Registry, registry::TaskHandle, runner, stats::Stats};
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;
use crate::tasks::{TaskId, TaskResult, TaskStatus};

/// One executor of the worker pool.
pub(crate) struct Worker {
    pub(crate) queue: Arc<ReadyQueue>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) stats: Arc<Stats>,
    pub(crate) bus: Bus,
    pub(crate) backoff: BackoffPolicy,
    pub(crate) shutdown: CancellationToken,
}

impl Worker {
    /// Runs until the shutdown token is cancelled and the queue wait ends.
    pub(crate) async fn run(self) {
        while let Some(id) = self.queue.pop(&self.shutdown).await {
            self.process(id).await;
        }
    }

    async fn process(&self, id: TaskId) {
        let Some(handle) = self.registry.get(&id) else {
            // record evicted while the id sat in the queue
            return;
        };
        if !handle.try_claim() {
            // a concurrent cancel finalized the task; nothing to run
            return;
        }

        let attempt = handle.attempt();
        self.bus.publish(
            Event::now(EventKind::TaskStarting)
                .with_id(handle.id)
                .with_task(handle.name.clone())
                .with_attempt(attempt),
        );

        let res = runner::run_once(&handle, &self.bus).await;
        self.finalize(&handle, attempt, res);
    }

    /// Applies the outcome of one attempt to the task record and counters.
    fn finalize(
        &self,
        handle: &Arc<TaskHandle>,
        attempt: u32,
        res: Result<Option<String>, TaskError>,
    ) {
        let mut st = handle.state.lock();

        // A requested cancel always wins, even over a successful attempt:
        // cancel_task() already promised cancellation to its caller.
        if st.cancel_requested || matches!(&res, Err(TaskError::Canceled)) {
            st.status = TaskStatus::Cancelled;
            st.result = Some(TaskResult::err("cancelled"));
            drop(st);
            self.stats.record_cancelled();
            self.bus.publish(
                Event::now(EventKind::TaskCancelled)
                    .with_id(handle.id)
                    .with_task(handle.name.clone()),
            );
            return;
        }

        match res {
            Ok(data) => {
                st.status = TaskStatus::Completed;
                st.result = Some(TaskResult::ok(data));
                drop(st);
                self.stats.record_completed();
                self.bus.publish(
                    Event::now(EventKind::TaskCompleted)
                        .with_id(handle.id)
                        .with_task(handle.name.clone())
                        .with_attempt(attempt),
                );
            }
            Err(err) => {
                st.retry_count += 1;
                if err.is_retryable() && st.retry_count <= handle.max_retries {
                    st.status = TaskStatus::Pending;
                    let delay = self.backoff.next(st.retry_count - 1);
                    drop(st);
                    self.stats.record_retry();
                    self.bus.publish(
                        Event::now(EventKind::RetryScheduled)
                            .with_id(handle.id)
                            .with_task(handle.name.clone())
                            .with_attempt(attempt)
                            .with_delay(delay)
                            .with_reason(err.to_string()),
                    );
                    self.schedule_requeue(handle, delay);
                } else {
                    let timed_out = matches!(err, TaskError::Timeout { .. });
                    st.status = if timed_out {
                        TaskStatus::TimedOut
                    } else {
                        TaskStatus::Failed
                    };
                    st.result = Some(TaskResult::err(err.to_string()));
                    drop(st);
                    if timed_out {
                        self.stats.record_timed_out();
                    } else {
                        self.stats.record_failed();
                    }
                    self.bus.publish(
                        Event::now(EventKind::TaskFailed)
                            .with_id(handle.id)
                            .with_task(handle.name.clone())
                            .with_attempt(attempt)
                            .with_reason(err.to_string()),
                    );
                }
            }
        }
    }

    /// Re-enqueues the task after the backoff delay without holding a
    /// worker slot. A cancel landing during the delay wins: the late push
    /// surfaces an id whose claim fails and is skipped.
    fn schedule_requeue(&self, handle: &Arc<TaskHandle>, delay: Duration) {
        let queue = Arc::clone(&self.queue);
        let priority = handle.priority;
        let id = handle.id;

        if delay.is_zero() {
            queue.requeue(priority, id);
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.requeue(priority, id);
        });
    }
}
