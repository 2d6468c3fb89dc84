//! # Run a single attempt of a task with an optional deadline.
//!
//! This helper drives one execution of a task's job, wiring up the
//! cancellation token and the timeout:
//!
//! ```text
//!   TaskHandle
//!       │ run_once()
//!       ▼
//!   child token ──► deadline? ──► job outcome
//!          └── cancel on timeout ──┘
//! ```
//!
//! - If `timeout` is `Some(dur) > 0`, the attempt is wrapped in
//!   [`tokio::time::timeout`]. On expiry the child token is cancelled, the
//!   attempt future is dropped (the scheduler's only hard stop), an
//!   [`EventKind::TimeoutHit`] is published, and [`TaskError::Timeout`] is
//!   returned.
//! - Cancellation requested through the handle's token propagates to the
//!   child token the job observes.

use std::time::Duration;

use tokio::time;

use crate::core::registry::TaskHandle;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};

/// Executes a single attempt of the handle's job.
pub(crate) async fn run_once(handle: &TaskHandle, bus: &Bus) -> Result<Option<String>, TaskError> {
    let child = handle.cancel.child_token();
    let work = handle.job.run(child.clone());

    match handle.timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, work).await {
            Ok(res) => res,
            Err(_elapsed) => {
                child.cancel();
                bus.publish(
                    Event::now(EventKind::TimeoutHit)
                        .with_id(handle.id)
                        .with_task(handle.name.clone())
                        .with_timeout(dur),
                );
                Err(TaskError::Timeout { timeout: dur })
            }
        },
        None => work.await,
    }
}
