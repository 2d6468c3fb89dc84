//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [submitted] task=backup id=6e2c...
//! [starting] task=backup attempt=1
//! [retry] task=backup delay_ms=200 after_attempt=1 err="connection refused"
//! [timeout] task=backup timeout_ms=5000
//! [failed] task=backup err="connection refused"
//! [completed] task=backup
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Intended for development and
/// demonstrations; implement a custom [`Subscribe`] for structured logging
/// or metrics collection.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::SchedulerStarted => println!("[started]"),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace]"),
            EventKind::GraceExceeded => {
                println!("[grace-exceeded] stuck={:?}", e.reason.as_deref())
            }
            EventKind::TaskSubmitted => {
                println!("[submitted] task={task} id={:?}", e.id)
            }
            EventKind::QueueFull => {
                println!("[queue-full] task={task} err={:?}", e.reason.as_deref())
            }
            EventKind::TaskStarting => {
                println!("[starting] task={task} attempt={:?}", e.attempt)
            }
            EventKind::TaskCompleted => println!("[completed] task={task}"),
            EventKind::TaskFailed => {
                println!("[failed] task={task} err={:?}", e.reason.as_deref())
            }
            EventKind::TimeoutHit => {
                println!("[timeout] task={task} timeout_ms={:?}", e.timeout_ms)
            }
            EventKind::RetryScheduled => {
                println!(
                    "[retry] task={task} delay_ms={:?} after_attempt={:?} err={:?}",
                    e.delay_ms,
                    e.attempt,
                    e.reason.as_deref()
                )
            }
            EventKind::CancelRequested => println!("[cancel-requested] task={task}"),
            EventKind::TaskCancelled => println!("[cancelled] task={task}"),
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                println!("[subscriber-issue] task={task} err={:?}", e.reason.as_deref())
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
