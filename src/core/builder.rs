//! # Builder for assembling a scheduler.
//!
//! Wires the event bus, the subscriber fan-out, and the scheduler facade
//! together. Subscribers get their worker tasks spawned at `build()` time,
//! so building with subscribers requires a tokio runtime context.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::scheduler::Scheduler;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Scheduler`] with optional subscribers.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets the event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (submissions, attempts,
    /// failures, retries, shutdown) through dedicated workers with bounded
    /// queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Appends a single subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds and returns the scheduler.
    ///
    /// Initializes the event bus, spawns one listener that fans bus events
    /// out to the subscriber set, and assembles the facade. The worker
    /// pool itself is not spawned until [`Scheduler::start`].
    pub fn build(self) -> Arc<Scheduler> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let has_subscribers = !self.subscribers.is_empty();
        let subs = Arc::new(SubscriberSet::new(self.subscribers));

        if has_subscribers {
            let mut rx = bus.subscribe();
            let set = Arc::clone(&subs);
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => set.emit(&ev),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            });
        }

        Arc::new(Scheduler::new_internal(self.cfg, bus, subs))
    }
}
