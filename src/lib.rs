//! # taskpool
//!
//! **Taskpool** is an in-process priority task scheduler for Rust.
//!
//! It accepts arbitrary async jobs, executes them concurrently under a
//! bounded worker pool, and enforces per-task priority ordering, timeouts,
//! and retry-with-backoff. Running tasks can be cancelled cooperatively,
//! and the scheduler exposes consistent status and statistics under
//! concurrent access. The crate is designed as a building block for
//! higher-level services (API handlers, script runners, alert dispatchers)
//! that need to hand work off to a supervised pool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  submit(job, TaskSpec)        cancel_task(id)      get_task(id) / get_stats()
//!        │                            │                      │
//!        ▼                            ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (facade)                                               │
//! │  - Registry  (TaskId → TaskHandle, single source of truth)       │
//! │  - ReadyQueue (priority heap of pending task ids)                 │
//! │  - Stats     (monotonic counters + live gauges)                   │
//! │  - Bus       (broadcast lifecycle events)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │ Worker 1 │       │ Worker 2 │  ...  │ Worker N │   (N = max_workers)
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘
//!        │ pop highest-priority id, claim record, run one attempt
//!        │ under the task's timeout, then complete / retry / fail
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                      Bus (broadcast channel)                      │
//! └────────────────────────────────┬──────────────────────────────────┘
//!                                  ▼
//!                          SubscriberSet
//!                       (per-subscriber queues)
//!                        ▼        ▼        ▼
//!                    sub1.on  sub2.on  subN.on
//!                    _event()  _event()  _event()
//! ```
//!
//! ### Task lifecycle
//! ```text
//! submit() ──► Pending ──► Running ──► Completed
//!                 ▲           │   └──► Cancelled   (cooperative)
//!                 │           ├──────► Failed      (retries exhausted)
//!                 │           └──────► TimedOut    (deadline, retries exhausted)
//!                 │           │
//!                 └── retry ──┘  retry_count <= max_retries:
//!                                 back to Pending after a backoff delay,
//!                                 re-sequenced against new submissions
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types                                  |
//! |-----------------|----------------------------------------------------------|--------------------------------------------|
//! | **Jobs**        | Define units of work as trait impls or closures.         | [`Job`], [`JobFn`], [`JobRef`]             |
//! | **Scheduling**  | Priority classes with FIFO order inside each class.      | [`Priority`], [`TaskSpec`]                 |
//! | **Retries**     | Bounded retry budget with exponential backoff + jitter.  | [`BackoffPolicy`], [`JitterPolicy`]        |
//! | **Inspection**  | Point-in-time task snapshots and aggregate counters.     | [`TaskSnapshot`], [`StatsSnapshot`]        |
//! | **Subscribers** | Hook into lifecycle events (logging, metrics, alerts).   | [`Subscribe`], [`Event`], [`EventKind`]    |
//! | **Errors**      | Typed errors for the scheduler and for job attempts.     | [`SchedulerError`], [`TaskError`]          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use taskpool::{JobFn, Priority, Scheduler, SchedulerConfig, TaskSpec, TaskStatus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SchedulerConfig::default();
//!     cfg.max_workers = 2;
//!
//!     let pool = Scheduler::builder(cfg).build();
//!     pool.start().await?;
//!
//!     let job = JobFn::arc("hello", |ctx: CancellationToken| async move {
//!         if ctx.is_cancelled() {
//!             return Err(taskpool::TaskError::Canceled);
//!         }
//!         Ok(Some("done".to_string()))
//!     });
//!
//!     let id = pool.submit(job, TaskSpec::default().with_priority(Priority::High))?;
//!
//!     // Poll until the task reaches a terminal state.
//!     loop {
//!         match pool.get_task_status(id) {
//!             Some(status) if status.is_terminal() => break,
//!             _ => tokio::time::sleep(Duration::from_millis(10)).await,
//!         }
//!     }
//!
//!     assert_eq!(pool.get_task_status(id), Some(TaskStatus::Completed));
//!     pool.stop().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::SchedulerConfig;
pub use core::{Scheduler, SchedulerBuilder, StatsSnapshot};
pub use error::{SchedulerError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{
    Job, JobFn, JobRef, Priority, TaskId, TaskResult, TaskSnapshot, TaskSpec, TaskStatus,
};

// Optional: expose a simple built-in stdout writer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
