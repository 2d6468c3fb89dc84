//! # Task registry: the single source of truth for task records.
//!
//! The registry maps [`TaskId`] to a [`TaskHandle`]: the immutable
//! submission metadata, the job itself, a per-task cancellation token, and
//! the mutable state (status, retry count, result) behind a per-task
//! mutex. The map is a sharded concurrent map, so lookups and mutations of
//! different tasks never contend on a single registry lock.
//!
//! ## Rules
//! - The registry exclusively owns every handle; workers borrow one for
//!   the duration of a single attempt.
//! - All mutation of shared fields goes through the per-task mutex, never
//!   through a private copy.
//! - Records are evicted only by [`Registry::clear_finished`]; there is no
//!   automatic eviction of terminal records.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::tasks::{JobRef, Priority, TaskId, TaskResult, TaskSnapshot, TaskSpec, TaskStatus};

/// Mutable task state guarded by the per-task mutex.
pub(crate) struct TaskState {
    pub(crate) status: TaskStatus,
    pub(crate) retry_count: u32,
    pub(crate) result: Option<TaskResult>,
    pub(crate) cancel_requested: bool,
}

/// One registered task: immutable metadata plus guarded mutable state.
pub(crate) struct TaskHandle {
    pub(crate) id: TaskId,
    pub(crate) name: Arc<str>,
    pub(crate) priority: Priority,
    pub(crate) max_retries: u32,
    pub(crate) timeout: Option<Duration>,
    pub(crate) created_at: SystemTime,
    pub(crate) job: JobRef,
    /// Cancelled by `cancel_task`; attempts run under a child of this token.
    pub(crate) cancel: CancellationToken,
    pub(crate) state: Mutex<TaskState>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, job: JobRef, spec: &TaskSpec) -> Self {
        let name: Arc<str> = Arc::from(job.name());
        Self {
            id,
            name,
            priority: spec.priority(),
            max_retries: spec.max_retries(),
            timeout: spec.timeout(),
            created_at: SystemTime::now(),
            job,
            cancel: CancellationToken::new(),
            state: Mutex::new(TaskState {
                status: TaskStatus::Pending,
                retry_count: 0,
                result: None,
                cancel_requested: false,
            }),
        }
    }

    /// Claims the task for execution: `Pending → Running`.
    ///
    /// Returns `false` if the task is no longer pending, which means a
    /// concurrent cancellation won the race while the id sat in the queue.
    pub(crate) fn try_claim(&self) -> bool {
        let mut st = self.state.lock();
        if st.status == TaskStatus::Pending {
            st.status = TaskStatus::Running;
            true
        } else {
            false
        }
    }

    /// The 1-based number of the attempt about to run.
    pub(crate) fn attempt(&self) -> u32 {
        self.state.lock().retry_count + 1
    }

    /// Copies the observable fields under the task lock.
    pub(crate) fn snapshot(&self) -> TaskSnapshot {
        let st = self.state.lock();
        TaskSnapshot {
            id: self.id,
            name: self.name.to_string(),
            priority: self.priority,
            status: st.status,
            retry_count: st.retry_count,
            max_retries: self.max_retries,
            timeout: self.timeout,
            created_at: self.created_at,
            result: st.result.clone(),
        }
    }

    pub(crate) fn status(&self) -> TaskStatus {
        self.state.lock().status
    }
}

/// Concurrent map of task records.
pub(crate) struct Registry {
    tasks: DashMap<TaskId, Arc<TaskHandle>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    pub(crate) fn insert(&self, handle: Arc<TaskHandle>) {
        self.tasks.insert(handle.id, handle);
    }

    pub(crate) fn get(&self, id: &TaskId) -> Option<Arc<TaskHandle>> {
        self.tasks.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn remove(&self, id: &TaskId) -> Option<Arc<TaskHandle>> {
        self.tasks.remove(id).map(|(_, handle)| handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Number of tasks currently in the `Running` state.
    pub(crate) fn running_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|entry| entry.value().status() == TaskStatus::Running)
            .count()
    }

    /// Sorted names of tasks currently in the `Running` state.
    ///
    /// Used by `stop()` to report tasks that did not finish within grace.
    pub(crate) fn running_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tasks
            .iter()
            .filter(|entry| entry.value().status() == TaskStatus::Running)
            .map(|entry| entry.value().name.to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// Evicts all terminal records; returns how many were removed.
    pub(crate) fn clear_finished(&self) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|_, handle| !handle.state.lock().status.is_terminal());
        before - self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::JobFn;
    use tokio_util::sync::CancellationToken;

    fn handle(name: &'static str) -> Arc<TaskHandle> {
        let job = JobFn::arc(name, |_ctx: CancellationToken| async { Ok(None) });
        Arc::new(TaskHandle::new(TaskId::new_v4(), job, &TaskSpec::default()))
    }

    #[test]
    fn claim_transitions_pending_to_running_once() {
        let h = handle("claim");
        assert!(h.try_claim());
        assert_eq!(h.status(), TaskStatus::Running);
        assert!(!h.try_claim());
    }

    #[test]
    fn snapshot_copies_state() {
        let h = handle("snap");
        let snap = h.snapshot();
        assert_eq!(snap.status, TaskStatus::Pending);
        assert_eq!(snap.retry_count, 0);
        assert_eq!(snap.name, "snap");
        assert!(snap.result.is_none());
    }

    #[test]
    fn clear_finished_keeps_live_tasks() {
        let reg = Registry::new();
        let done = handle("done");
        let live = handle("live");
        reg.insert(Arc::clone(&done));
        reg.insert(Arc::clone(&live));

        done.state.lock().status = TaskStatus::Completed;

        assert_eq!(reg.clear_finished(), 1);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(&live.id).is_some());
        assert!(reg.get(&done.id).is_none());
    }

    #[test]
    fn running_names_are_sorted() {
        let reg = Registry::new();
        for name in ["zeta", "alpha"] {
            let h = handle(name);
            h.try_claim();
            reg.insert(h);
        }
        assert_eq!(reg.running_names(), vec!["alpha", "zeta"]);
        assert_eq!(reg.running_count(), 2);
    }
}
