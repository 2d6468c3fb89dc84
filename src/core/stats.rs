//! # Aggregate scheduler statistics.
//!
//! Monotonic counters incremented exactly once per terminal transition
//! (retries re-enqueue without touching the terminal counters, and
//! `submitted` counts accepted submissions only), plus live gauges read at
//! snapshot time.
//!
//! The counters live behind one small mutex so a snapshot copies them as a
//! set; independent atomics could tear across counters mid-update.

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Clone, Copy, Default)]
struct Counters {
    submitted: u64,
    completed: u64,
    failed: u64,
    cancelled: u64,
    timed_out: u64,
    retries: u64,
}

/// Counter store shared by the facade and the workers.
#[derive(Default)]
pub(crate) struct Stats {
    counters: Mutex<Counters>,
}

impl Stats {
    pub(crate) fn record_submitted(&self) {
        self.counters.lock().submitted += 1;
    }

    pub(crate) fn record_completed(&self) {
        self.counters.lock().completed += 1;
    }

    pub(crate) fn record_failed(&self) {
        self.counters.lock().failed += 1;
    }

    pub(crate) fn record_cancelled(&self) {
        self.counters.lock().cancelled += 1;
    }

    pub(crate) fn record_timed_out(&self) {
        self.counters.lock().timed_out += 1;
    }

    pub(crate) fn record_retry(&self) {
        self.counters.lock().retries += 1;
    }

    /// Copies the counters and combines them with the live gauges.
    pub(crate) fn snapshot(&self, queue_size: usize, running: usize) -> StatsSnapshot {
        let c = *self.counters.lock();
        StatsSnapshot {
            submitted: c.submitted,
            completed: c.completed,
            failed: c.failed,
            cancelled: c.cancelled,
            timed_out: c.timed_out,
            retries: c.retries,
            queue_size,
            running,
        }
    }
}

/// Point-in-time consistent view of the scheduler's counters.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StatsSnapshot {
    /// Accepted submissions (queue-full rejections are not counted).
    pub submitted: u64,
    /// Tasks that finished successfully.
    pub completed: u64,
    /// Tasks that exhausted their retries on a job error.
    pub failed: u64,
    /// Tasks cancelled before or during execution.
    pub cancelled: u64,
    /// Tasks that exhausted their retries on a timeout.
    pub timed_out: u64,
    /// Retry re-enqueues across all tasks.
    pub retries: u64,
    /// Live ids in the ready queue.
    pub queue_size: usize,
    /// Tasks currently executing.
    pub running: usize,
}

impl StatsSnapshot {
    /// Sum of the terminal counters.
    pub fn finished(&self) -> u64 {
        self.completed + self.failed + self.cancelled + self.timed_out
    }
}
