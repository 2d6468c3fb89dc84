//! # Scheduler: the public facade.
//!
//! The [`Scheduler`] owns the registry, the ready queue, the statistics,
//! and the event bus, and composes them behind the public contract:
//! `start` / `stop` / `submit` / `get_task` / `get_task_status` /
//! `cancel_task` / `get_stats`.
//!
//! ## High-level architecture
//! ```text
//! submit(job, spec):
//!   - register TaskHandle (Pending)
//!   - push id onto ReadyQueue
//!       └─ QueueFull → roll the registration back, return the error
//!
//! start():
//!   - spawn max_workers Worker loops into a JoinSet
//!   - idempotent while running
//!
//! cancel_task(id):
//!   - Pending  → remove from queue, finalize Cancelled      (synchronous)
//!   - Running  → cancel the task's token                    (cooperative)
//!   - terminal/absent → false
//!
//! stop():
//!   - cancel the pool's shutdown token (workers finish their in-flight
//!     attempt, then exit; pending tasks stay Pending)
//!   - drain the JoinSet within cfg.grace
//!       └─ overrun → abort workers, Err(GraceExceeded { stuck })
//! ```
//!
//! ## Rules
//! - The scheduler is constructed by the application's composition root
//!   and passed by reference to collaborators; there is no global
//!   singleton instance.
//! - A misbehaving job never corrupts the scheduler: attempt outcomes are
//!   converted into task state at the worker boundary.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::core::{
    builder::SchedulerBuilder, queue::ReadyQueue, registry::Registry, stats::Stats,
    stats::StatsSnapshot, worker::Worker,
};
use crate::error::SchedulerError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;
use crate::tasks::{JobRef, TaskId, TaskResult, TaskSnapshot, TaskSpec, TaskStatus};

use crate::core::registry::TaskHandle;

/// Live worker pool owned by a running scheduler.
struct PoolHandle {
    shutdown: CancellationToken,
    workers: JoinSet<()>,
}

/// Priority task scheduler with a bounded worker pool.
///
/// See the [crate docs](crate) for the architecture overview and a usage
/// example.
pub struct Scheduler {
    cfg: SchedulerConfig,
    bus: Bus,
    #[allow(dead_code)] // kept alive so subscriber workers outlive the facade
    subs: Arc<SubscriberSet>,
    registry: Arc<Registry>,
    queue: Arc<ReadyQueue>,
    stats: Arc<Stats>,
    running: AtomicBool,
    pool: tokio::sync::Mutex<Option<PoolHandle>>,
}

impl Scheduler {
    /// Returns a builder for constructing a scheduler with subscribers.
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: SchedulerConfig, bus: Bus, subs: Arc<SubscriberSet>) -> Self {
        let queue = Arc::new(ReadyQueue::new(cfg.queue_capacity()));
        Self {
            cfg,
            bus,
            subs,
            registry: Arc::new(Registry::new()),
            queue,
            stats: Arc::new(Stats::default()),
            running: AtomicBool::new(false),
            pool: tokio::sync::Mutex::new(None),
        }
    }

    /// Spawns the worker pool. Idempotent if already running.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut pool = self.pool.lock().await;
        if pool.is_some() {
            return Ok(());
        }

        let shutdown = CancellationToken::new();
        let mut workers = JoinSet::new();
        for _ in 0..self.cfg.workers_clamped() {
            let worker = Worker {
                queue: Arc::clone(&self.queue),
                registry: Arc::clone(&self.registry),
                stats: Arc::clone(&self.stats),
                bus: self.bus.clone(),
                backoff: self.cfg.backoff,
                shutdown: shutdown.clone(),
            };
            workers.spawn(worker.run());
        }

        *pool = Some(PoolHandle { shutdown, workers });
        self.running.store(true, AtomicOrdering::SeqCst);
        self.bus.publish(Event::now(EventKind::SchedulerStarted));
        Ok(())
    }

    /// Signals the workers to finish their in-flight attempts and exit,
    /// then waits for the pool to drain.
    ///
    /// Pending tasks remain `Pending`; they are not cancelled. With a
    /// bounded [`SchedulerConfig::grace`], an overrun aborts the remaining
    /// workers and returns [`SchedulerError::GraceExceeded`] naming the
    /// tasks that were still running. No-op when not running.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let taken = self.pool.lock().await.take();
        let Some(PoolHandle {
            shutdown,
            mut workers,
        }) = taken
        else {
            return Ok(());
        };

        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        shutdown.cancel();
        self.running.store(false, AtomicOrdering::SeqCst);

        match self.cfg.grace_limit() {
            None => {
                while workers.join_next().await.is_some() {}
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Some(grace) => {
                let drained = time::timeout(grace, async {
                    while workers.join_next().await.is_some() {}
                })
                .await;

                match drained {
                    Ok(()) => {
                        self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                        Ok(())
                    }
                    Err(_) => {
                        workers.abort_all();
                        let stuck = self.registry.running_names();
                        self.bus.publish(
                            Event::now(EventKind::GraceExceeded)
                                .with_reason(stuck.join(",")),
                        );
                        Err(SchedulerError::GraceExceeded { grace, stuck })
                    }
                }
            }
        }
    }

    /// True between a successful `start()` and the next `stop()`.
    pub fn is_running(&self) -> bool {
        self.running.load(AtomicOrdering::SeqCst)
    }

    /// Registers a task and enqueues it for execution.
    ///
    /// Non-blocking. The call is transactional: either the task is both
    /// registered and enqueued, or it fails with
    /// [`SchedulerError::QueueFull`] and leaves no trace — the caller can
    /// retry the submission or shed load.
    pub fn submit(&self, job: JobRef, spec: TaskSpec) -> Result<TaskId, SchedulerError> {
        let id = TaskId::new_v4();
        let handle = Arc::new(TaskHandle::new(id, job, &spec));
        let name = handle.name.clone();

        self.registry.insert(Arc::clone(&handle));
        if let Err(err) = self.queue.push(spec.priority(), id) {
            self.registry.remove(&id);
            self.bus.publish(
                Event::now(EventKind::QueueFull)
                    .with_task(name)
                    .with_reason(err.to_string()),
            );
            return Err(err);
        }

        self.stats.record_submitted();
        self.bus.publish(
            Event::now(EventKind::TaskSubmitted)
                .with_id(id)
                .with_task(name),
        );
        Ok(id)
    }

    /// Returns a consistent snapshot of the task, or `None` if the id is
    /// unknown. O(1); never blocks on an in-flight execution.
    pub fn get_task(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.registry.get(&id).map(|handle| handle.snapshot())
    }

    /// Convenience accessor for the task's status alone.
    pub fn get_task_status(&self, id: TaskId) -> Option<TaskStatus> {
        self.registry.get(&id).map(|handle| handle.status())
    }

    /// Requests cancellation of a task.
    ///
    /// - `Pending`: removed from the queue and finalized `Cancelled`
    ///   before any worker can claim it; returns `true`.
    /// - `Running`: cooperative — the task's cancellation token is
    ///   triggered and `true` is returned once the signal is delivered,
    ///   not once execution has stopped.
    /// - Terminal or unknown: returns `false`; counters are not touched.
    pub fn cancel_task(&self, id: TaskId) -> bool {
        let Some(handle) = self.registry.get(&id) else {
            return false;
        };

        let mut st = handle.state.lock();
        match st.status {
            TaskStatus::Pending => {
                st.status = TaskStatus::Cancelled;
                st.result = Some(TaskResult::err("cancelled before execution"));
                drop(st);
                self.queue.remove(&id);
                self.stats.record_cancelled();
                self.bus.publish(
                    Event::now(EventKind::TaskCancelled)
                        .with_id(id)
                        .with_task(handle.name.clone()),
                );
                true
            }
            TaskStatus::Running => {
                st.cancel_requested = true;
                drop(st);
                handle.cancel.cancel();
                self.bus.publish(
                    Event::now(EventKind::CancelRequested)
                        .with_id(id)
                        .with_task(handle.name.clone()),
                );
                true
            }
            _ => false,
        }
    }

    /// Returns a point-in-time consistent view of the aggregate counters
    /// plus the live queue depth and running-task gauge.
    pub fn get_stats(&self) -> StatsSnapshot {
        self.stats
            .snapshot(self.queue.len(), self.registry.running_count())
    }

    /// Evicts terminal task records from the registry; returns how many
    /// were removed. Pending and running tasks are untouched.
    pub fn clear_finished(&self) -> usize {
        self.registry.clear_finished()
    }

    /// Creates a receiver observing subsequent lifecycle events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::policies::{BackoffPolicy, JitterPolicy};
    use crate::tasks::{JobFn, Priority};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tokio_util::sync::CancellationToken;

    fn fast_backoff() -> BackoffPolicy {
        BackoffPolicy {
            base: Duration::from_millis(1),
            cap: Duration::from_millis(10),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    fn pool(cfg: SchedulerConfig) -> Arc<Scheduler> {
        Scheduler::builder(cfg).build()
    }

    fn ok_job(name: &'static str) -> JobRef {
        JobFn::arc(name, |_ctx: CancellationToken| async { Ok(None) })
    }

    async fn wait_terminal(sched: &Scheduler, id: TaskId) -> TaskStatus {
        for _ in 0..500 {
            if let Some(status) = sched.get_task_status(id) {
                if status.is_terminal() {
                    return status;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {id} did not reach a terminal state");
    }

    async fn wait_running(sched: &Scheduler, id: TaskId) {
        for _ in 0..500 {
            if sched.get_task_status(id) == Some(TaskStatus::Running) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {id} never started running");
    }

    #[tokio::test]
    async fn high_priority_completes_before_low() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });

        // Submit before starting so the single worker sees both at once.
        let mut ids = Vec::new();
        for (name, priority) in [("low", Priority::Low), ("high", Priority::High)] {
            let order = Arc::clone(&order);
            let job = JobFn::arc(name, move |_ctx: CancellationToken| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(name);
                    Ok(None)
                }
            });
            ids.push(
                sched
                    .submit(job, TaskSpec::default().with_priority(priority))
                    .unwrap(),
            );
        }

        sched.start().await.unwrap();
        for id in ids {
            wait_terminal(&sched, id).await;
        }
        sched.stop().await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["high", "low"]);
    }

    #[tokio::test]
    async fn queue_full_rejects_then_accepts_after_slot_frees() {
        let sched = pool(SchedulerConfig {
            max_queue_size: 2,
            ..Default::default()
        });

        let a = sched.submit(ok_job("a"), TaskSpec::default()).unwrap();
        sched.submit(ok_job("b"), TaskSpec::default()).unwrap();

        let err = sched
            .submit(ok_job("c"), TaskSpec::default())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::QueueFull { capacity: 2 }));

        // transactional: the rejected task left no registration behind
        assert_eq!(sched.get_stats().submitted, 2);

        // freeing one slot makes the next submission succeed
        assert!(sched.cancel_task(a));
        sched.submit(ok_job("d"), TaskSpec::default()).unwrap();
    }

    #[tokio::test]
    async fn retry_then_success_keeps_count_and_result() {
        let attempts = Arc::new(AtomicU32::new(0));
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            backoff: fast_backoff(),
            ..Default::default()
        });
        sched.start().await.unwrap();

        let job = {
            let attempts = Arc::clone(&attempts);
            JobFn::arc("flaky", move |_ctx: CancellationToken| {
                let attempts = Arc::clone(&attempts);
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if n <= 2 {
                        Err(TaskError::Fail {
                            reason: format!("boom #{n}"),
                        })
                    } else {
                        Ok(Some("recovered".to_string()))
                    }
                }
            })
        };

        let id = sched
            .submit(job, TaskSpec::default().with_max_retries(3))
            .unwrap();
        assert_eq!(wait_terminal(&sched, id).await, TaskStatus::Completed);

        let snap = sched.get_task(id).unwrap();
        assert_eq!(snap.retry_count, 2);
        let result = snap.result.unwrap();
        assert!(result.success);
        assert_eq!(result.data.as_deref(), Some("recovered"));

        sched.stop().await.unwrap();
    }

    #[tokio::test]
    async fn retry_exhaustion_fails_after_all_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            backoff: fast_backoff(),
            ..Default::default()
        });
        sched.start().await.unwrap();

        let job = {
            let attempts = Arc::clone(&attempts);
            JobFn::arc("hopeless", move |_ctx: CancellationToken| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(TaskError::Fail {
                        reason: "always".to_string(),
                    })
                }
            })
        };

        let id = sched
            .submit(job, TaskSpec::default().with_max_retries(2))
            .unwrap();
        assert_eq!(wait_terminal(&sched, id).await, TaskStatus::Failed);

        // 1 initial + 2 retries
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        let result = sched.get_task(id).unwrap().result.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("always"));

        sched.stop().await.unwrap();
    }

    #[tokio::test]
    async fn timeout_transitions_within_bounded_margin() {
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });
        sched.start().await.unwrap();

        let job = JobFn::arc("sleeper", |_ctx: CancellationToken| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(None)
        });

        let started = Instant::now();
        let id = sched
            .submit(
                job,
                TaskSpec::default().with_timeout(Some(Duration::from_millis(100))),
            )
            .unwrap();

        assert_eq!(wait_terminal(&sched, id).await, TaskStatus::TimedOut);
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "timeout was not enforced"
        );
        assert_eq!(sched.get_stats().timed_out, 1);

        sched.stop().await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_pending_task_never_runs() {
        let ran = Arc::new(AtomicBool::new(false));
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });

        let job = {
            let ran = Arc::clone(&ran);
            JobFn::arc("never", move |_ctx: CancellationToken| {
                let ran = Arc::clone(&ran);
                async move {
                    ran.store(true, Ordering::SeqCst);
                    Ok(None)
                }
            })
        };

        // submitted but no worker started yet
        let id = sched.submit(job, TaskSpec::default()).unwrap();
        assert!(sched.cancel_task(id));
        assert_eq!(sched.get_task_status(id), Some(TaskStatus::Cancelled));

        sched.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        sched.stop().await.unwrap();

        assert!(!ran.load(Ordering::SeqCst), "cancelled task was executed");
        assert_eq!(sched.get_stats().cancelled, 1);
    }

    #[tokio::test]
    async fn running_task_cancels_cooperatively() {
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });
        sched.start().await.unwrap();

        let job = JobFn::arc("spinner", |ctx: CancellationToken| async move {
            loop {
                if ctx.is_cancelled() {
                    return Err(TaskError::Canceled);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let id = sched.submit(job, TaskSpec::default()).unwrap();
        wait_running(&sched, id).await;

        assert!(sched.cancel_task(id));
        assert_eq!(wait_terminal(&sched, id).await, TaskStatus::Cancelled);
        assert_eq!(sched.get_stats().cancelled, 1);

        sched.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stats_account_for_every_submission() {
        let sched = pool(SchedulerConfig {
            max_workers: 2,
            backoff: fast_backoff(),
            ..Default::default()
        });

        // two that succeed
        let mut ids = vec![
            sched.submit(ok_job("ok-1"), TaskSpec::default()).unwrap(),
            sched.submit(ok_job("ok-2"), TaskSpec::default()).unwrap(),
        ];
        // one that always fails, no retries
        ids.push(
            sched
                .submit(
                    JobFn::arc("bad", |_ctx: CancellationToken| async {
                        Err(TaskError::Fail {
                            reason: "nope".to_string(),
                        })
                    }),
                    TaskSpec::default(),
                )
                .unwrap(),
        );
        // one that times out
        ids.push(
            sched
                .submit(
                    JobFn::arc("slow", |_ctx: CancellationToken| async {
                        tokio::time::sleep(Duration::from_secs(10)).await;
                        Ok(None)
                    }),
                    TaskSpec::default().with_timeout(Some(Duration::from_millis(50))),
                )
                .unwrap(),
        );
        // two cancelled while pending
        for name in ["drop-1", "drop-2"] {
            let id = sched.submit(ok_job(name), TaskSpec::default()).unwrap();
            assert!(sched.cancel_task(id));
            ids.push(id);
        }

        sched.start().await.unwrap();
        for id in &ids {
            wait_terminal(&sched, *id).await;
        }
        sched.stop().await.unwrap();

        let stats = sched.get_stats();
        assert_eq!(stats.submitted, 6);
        assert_eq!(stats.finished(), 6);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.timed_out, 1);
        assert_eq!(stats.cancelled, 2);
        assert_eq!(stats.queue_size, 0);
        assert_eq!(stats.running, 0);
    }

    #[tokio::test]
    async fn cancel_is_idempotent_on_terminal_and_unknown_tasks() {
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });
        sched.start().await.unwrap();

        let id = sched.submit(ok_job("done"), TaskSpec::default()).unwrap();
        assert_eq!(wait_terminal(&sched, id).await, TaskStatus::Completed);

        let before = sched.get_stats();
        assert!(!sched.cancel_task(id));
        assert!(!sched.cancel_task(TaskId::new_v4()));
        let after = sched.get_stats();

        assert_eq!(before.cancelled, after.cancelled);
        assert_eq!(before.finished(), after.finished());

        sched.stop().await.unwrap();
    }

    #[tokio::test]
    async fn start_is_idempotent_and_stop_waits_for_in_flight() {
        let finished = Arc::new(AtomicBool::new(false));
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });

        sched.start().await.unwrap();
        sched.start().await.unwrap(); // no-op
        assert!(sched.is_running());

        let job = {
            let finished = Arc::clone(&finished);
            JobFn::arc("slowish", move |_ctx: CancellationToken| {
                let finished = Arc::clone(&finished);
                async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    finished.store(true, Ordering::SeqCst);
                    Ok(None)
                }
            })
        };
        let id = sched.submit(job, TaskSpec::default()).unwrap();
        wait_running(&sched, id).await;

        sched.stop().await.unwrap();
        assert!(!sched.is_running());
        assert!(
            finished.load(Ordering::SeqCst),
            "stop() returned before the in-flight attempt finished"
        );
        assert_eq!(sched.get_task_status(id), Some(TaskStatus::Completed));

        sched.stop().await.unwrap(); // no-op
    }

    #[tokio::test]
    async fn stop_leaves_pending_tasks_pending() {
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });

        let id = sched.submit(ok_job("parked"), TaskSpec::default()).unwrap();
        // never started; stop is a no-op and the task stays pending
        sched.stop().await.unwrap();
        assert_eq!(sched.get_task_status(id), Some(TaskStatus::Pending));
    }

    #[tokio::test]
    async fn clear_finished_evicts_only_terminal_records() {
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            ..Default::default()
        });
        sched.start().await.unwrap();

        let done = sched.submit(ok_job("done"), TaskSpec::default()).unwrap();
        wait_terminal(&sched, done).await;
        sched.stop().await.unwrap();

        let parked = sched.submit(ok_job("parked"), TaskSpec::default()).unwrap();

        assert_eq!(sched.clear_finished(), 1);
        assert!(sched.get_task(done).is_none());
        assert_eq!(sched.get_task_status(parked), Some(TaskStatus::Pending));
    }

    #[tokio::test]
    async fn fatal_error_skips_remaining_retries() {
        let attempts = Arc::new(AtomicU32::new(0));
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            backoff: fast_backoff(),
            ..Default::default()
        });
        sched.start().await.unwrap();

        let job = {
            let attempts = Arc::clone(&attempts);
            JobFn::arc("poisoned", move |_ctx: CancellationToken| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(TaskError::Fatal {
                        reason: "bad input".to_string(),
                    })
                }
            })
        };

        let id = sched
            .submit(job, TaskSpec::default().with_max_retries(5))
            .unwrap();
        assert_eq!(wait_terminal(&sched, id).await, TaskStatus::Failed);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        sched.stop().await.unwrap();
    }

    #[tokio::test]
    async fn timed_out_attempt_retries_before_terminal_timeout() {
        let attempts = Arc::new(AtomicU32::new(0));
        let sched = pool(SchedulerConfig {
            max_workers: 1,
            backoff: fast_backoff(),
            ..Default::default()
        });
        sched.start().await.unwrap();

        let job = {
            let attempts = Arc::clone(&attempts);
            JobFn::arc("deadline", move |_ctx: CancellationToken| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(None)
                }
            })
        };

        let id = sched
            .submit(
                job,
                TaskSpec::default()
                    .with_max_retries(1)
                    .with_timeout(Some(Duration::from_millis(50))),
            )
            .unwrap();

        assert_eq!(wait_terminal(&sched, id).await, TaskStatus::TimedOut);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        let stats = sched.get_stats();
        assert_eq!(stats.retries, 1);
        assert_eq!(stats.timed_out, 1);

        sched.stop().await.unwrap();
    }
}
