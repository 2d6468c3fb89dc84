//! # Priority ready queue.
//!
//! Thread-safe ordered queue of task identifiers awaiting a worker,
//! optionally bounded. Ordering is an explicit comparison over
//! `(priority rank, sequence number)`: a strictly higher class wins, ties
//! fall back to enqueue order. Every enqueue assigns a fresh sequence
//! number, so a retried task competes fairly with newer submissions of the
//! same class instead of jumping ahead.
//!
//! ## Structure
//! ```text
//! push/requeue ──► BinaryHeap<Reverse<(rank, seq, id)>>   (min-first)
//!                  HashSet<TaskId>                        (live membership)
//!                          │
//! remove(id) ──────► drop membership, O(1); the heap entry goes stale
//!                          │
//! pop ─────────────► skip stale entries, return the lowest live key
//! ```
//!
//! ## Rules
//! - `push` fails when the queue is at capacity (back-pressure to the caller).
//! - `requeue` bypasses the capacity check: an accepted task's retry is
//!   never dropped by its own re-enqueue.
//! - `pop` suspends on an empty queue and wakes on push or shutdown.
//! - `len()` counts live entries only; stale heap entries are invisible.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::SchedulerError;
use crate::tasks::{Priority, TaskId};

/// Heap key: lexicographic order over (rank, seq, id).
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    rank: u8,
    seq: u64,
    id: TaskId,
}

struct Inner {
    heap: BinaryHeap<Reverse<Entry>>,
    live: HashSet<TaskId>,
}

/// Bounded min-first queue of ready task ids.
pub(crate) struct ReadyQueue {
    inner: Mutex<Inner>,
    notify: Notify,
    capacity: Option<usize>,
    seq: AtomicU64,
}

impl ReadyQueue {
    /// Creates a queue; `capacity = None` means unbounded.
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                live: HashSet::new(),
            }),
            notify: Notify::new(),
            capacity,
            seq: AtomicU64::new(0),
        }
    }

    /// Enqueues a task id, failing when the queue is at capacity.
    pub(crate) fn push(&self, priority: Priority, id: TaskId) -> Result<(), SchedulerError> {
        {
            let mut inner = self.inner.lock();
            if let Some(cap) = self.capacity {
                if inner.live.len() >= cap {
                    return Err(SchedulerError::QueueFull { capacity: cap });
                }
            }
            self.enqueue(&mut inner, priority, id);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Re-enqueues a retried task id, ignoring the capacity bound.
    ///
    /// The bound back-pressures new submissions; a task that was already
    /// accepted must not be lost to its own retry. The transient overshoot
    /// is at most the number of workers.
    pub(crate) fn requeue(&self, priority: Priority, id: TaskId) {
        {
            let mut inner = self.inner.lock();
            self.enqueue(&mut inner, priority, id);
        }
        self.notify.notify_one();
    }

    fn enqueue(&self, inner: &mut Inner, priority: Priority, id: TaskId) {
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        inner.live.insert(id);
        inner.heap.push(Reverse(Entry {
            rank: priority.rank(),
            seq,
            id,
        }));
    }

    /// Removes a pending id from the queue.
    ///
    /// Membership is dropped immediately (the freed slot is visible to the
    /// next `push`); the heap entry goes stale and is skipped on pop, so
    /// ordering of the remaining entries is untouched.
    pub(crate) fn remove(&self, id: &TaskId) -> bool {
        self.inner.lock().live.remove(id)
    }

    /// Number of live entries.
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Dequeues the highest-priority live id, suspending while the queue
    /// is empty. Returns `None` once `shutdown` is cancelled.
    pub(crate) async fn pop(&self, shutdown: &CancellationToken) -> Option<TaskId> {
        loop {
            let notified = self.notify.notified();
            if let Some(id) = self.try_pop() {
                return Some(id);
            }
            tokio::select! {
                _ = notified => {}
                _ = shutdown.cancelled() => return None,
            }
        }
    }

    fn try_pop(&self) -> Option<TaskId> {
        let popped = {
            let mut inner = self.inner.lock();
            loop {
                match inner.heap.pop() {
                    Some(Reverse(entry)) => {
                        if inner.live.remove(&entry.id) {
                            break Some((entry.id, !inner.live.is_empty()));
                        }
                        // stale entry left behind by remove(); skip
                    }
                    None => break None,
                }
            }
        };
        popped.map(|(id, more)| {
            if more {
                // Notify holds a single permit; chain the wakeup so a
                // second waiter is not stranded behind a coalesced push.
                self.notify.notify_one();
            }
            id
        })
    }
}
